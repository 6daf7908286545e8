// adminx-acl/src/models/permission_model.rs
use schemars::{gen::SchemaGenerator, schema::Schema, JsonSchema};
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};
use crate::error::PayloadError;

/// The four CRUD-style actions a capability key can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Read, Action::Create, Action::Update, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(Action::Read),
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            other => Err(format!("unknown action '{}', expected read|create|update|delete", other)),
        }
    }
}

/// Tri-state value of a single action flag. `Unspecified` is kept apart from
/// `Denied` all the way from the payload to the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    Unspecified,
}

impl From<Option<bool>> for Permission {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => Permission::Granted,
            Some(false) => Permission::Denied,
            None => Permission::Unspecified,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ActionSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,
}

impl ActionSet {
    pub fn get(&self, action: Action) -> Permission {
        match action {
            Action::Read => self.read.into(),
            Action::Create => self.create.into(),
            Action::Update => self.update.into(),
            Action::Delete => self.delete.into(),
        }
    }

    pub fn set(&mut self, action: Action, flag: Option<bool>) {
        match action {
            Action::Read => self.read = flag,
            Action::Create => self.create = flag,
            Action::Update => self.update = flag,
            Action::Delete => self.delete = flag,
        }
    }

    pub fn with(mut self, action: Action, flag: bool) -> Self {
        self.set(action, Some(flag));
        self
    }
}

/// Granted actions for one module or sub-item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CapabilityEntry {
    #[serde(flatten)]
    pub actions: ActionSet,
    #[serde(
        default,
        rename = "subItems",
        alias = "sub_items",
        skip_serializing_if = "Option::is_none"
    )]
    pub sub_items: Option<CapabilityMap>,
}

impl CapabilityEntry {
    pub fn new(actions: ActionSet) -> Self {
        Self { actions, sub_items: None }
    }

    pub fn with_sub_item(mut self, key: impl Into<String>, entry: CapabilityEntry) -> Self {
        self.sub_items
            .get_or_insert_with(CapabilityMap::new)
            .insert(key, entry);
        self
    }

    pub fn sub_item(&self, key: &str) -> Option<&CapabilityEntry> {
        self.sub_items.as_ref().and_then(|items| items.get(key))
    }
}

/// Capability entries keyed by name, in payload order.
///
/// Lookups are linear; documents hold a few dozen keys at most.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityMap {
    entries: Vec<(String, CapabilityEntry)>,
}

impl CapabilityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&CapabilityEntry> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, entry)| entry)
    }

    /// Inserts or replaces `key`. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, entry: CapabilityEntry) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((key, entry)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CapabilityEntry)> {
        self.entries.iter().map(|(k, entry)| (k.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, CapabilityEntry)> for CapabilityMap {
    fn from_iter<I: IntoIterator<Item = (K, CapabilityEntry)>>(iter: I) -> Self {
        let mut map = CapabilityMap::new();
        for (key, entry) in iter {
            map.insert(key, entry);
        }
        map
    }
}

impl Serialize for CapabilityMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, entry) in &self.entries {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}

struct CapabilityMapVisitor;

impl<'de> Visitor<'de> for CapabilityMapVisitor {
    type Value = CapabilityMap;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object of capability entries keyed by name")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = CapabilityMap::new();
        while let Some((key, entry)) = access.next_entry::<String, CapabilityEntry>()? {
            map.insert(key, entry);
        }
        Ok(map)
    }

    // Some serializers emit `[]` for an empty object.
    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        match seq.next_element::<de::IgnoredAny>()? {
            None => Ok(CapabilityMap::new()),
            Some(_) => Err(de::Error::invalid_type(de::Unexpected::Seq, &self)),
        }
    }
}

impl<'de> Deserialize<'de> for CapabilityMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CapabilityMapVisitor)
    }
}

impl JsonSchema for CapabilityMap {
    fn schema_name() -> String {
        "CapabilityMap".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        <BTreeMap<String, CapabilityEntry>>::json_schema(gen)
    }
}

/// A staff member's granted capabilities, keyed by top-level module name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct PermissionDocument(CapabilityMap);

impl PermissionDocument {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a raw payload. Blank text and `null` mean "nothing loaded yet"
    /// and produce the empty document.
    pub fn parse(raw: &str) -> Result<Self, PayloadError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::empty());
        }
        Self::from_value(serde_json::from_str(trimmed)?)
    }

    /// Key order follows the map order of `value`. Anything but an object or
    /// `null` at the top level is rejected.
    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        match value {
            Value::Null => Ok(Self::empty()),
            Value::Object(_) => Ok(Self::deserialize(value)?),
            Value::Array(_) => Err(PayloadError::NotAnObject("array")),
            Value::String(_) => Err(PayloadError::NotAnObject("string")),
            Value::Number(_) => Err(PayloadError::NotAnObject("number")),
            Value::Bool(_) => Err(PayloadError::NotAnObject("boolean")),
        }
    }

    pub fn parse_or_empty(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|err| Self::recover(err, raw.len()))
    }

    pub fn from_value_or_empty(value: Value) -> Self {
        Self::from_value(value).unwrap_or_else(|err| Self::recover(err, 0))
    }

    fn recover(err: PayloadError, payload_len: usize) -> Self {
        warn!(
            error = %err,
            payload_len,
            "⚠️  Malformed permission payload, falling back to an empty document"
        );
        Self::empty()
    }

    pub fn get(&self, module_key: &str) -> Option<&CapabilityEntry> {
        self.0.get(module_key)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &CapabilityEntry)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Finds `sub_key` under any entry's sub-items. Every top-level entry's
    /// `subItems` is checked in document order before any deeper level is
    /// searched. Returns the owning parent key alongside the matched entry.
    pub fn find_sub_item(&self, sub_key: &str) -> Option<(&str, &CapabilityEntry)> {
        let mut level: Vec<&CapabilityMap> = vec![&self.0];
        while !level.is_empty() {
            let mut next = Vec::new();
            for map in level {
                for (parent, entry) in map.iter() {
                    if let Some(items) = entry.sub_items.as_ref() {
                        if let Some(found) = items.get(sub_key) {
                            return Some((parent, found));
                        }
                        next.push(items);
                    }
                }
            }
            level = next;
        }

        debug!(sub_key, "sub-item not present anywhere in permission document");
        None
    }
}

impl<K: Into<String>> FromIterator<(K, CapabilityEntry)> for PermissionDocument {
    fn from_iter<I: IntoIterator<Item = (K, CapabilityEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serde_test::{assert_tokens, Token};

    #[test]
    fn test_absent_flag_is_not_false() {
        let doc = PermissionDocument::parse(r#"{"Member": {"create": true, "update": false}}"#).unwrap();
        let member = doc.get("Member").unwrap();

        assert_eq!(member.actions.get(Action::Create), Permission::Granted);
        assert_eq!(member.actions.get(Action::Update), Permission::Denied);
        assert_eq!(member.actions.get(Action::Read), Permission::Unspecified);
        assert_eq!(member.actions.get(Action::Delete), Permission::Unspecified);
    }

    #[test]
    fn test_sub_items_parsed_under_either_spelling() {
        let doc = PermissionDocument::parse(
            r#"{
                "Outlets": {"read": true, "subItems": {"OutletList": {"read": false}}},
                "Topup": {"sub_items": {"TopupHistory": {"delete": false}}}
            }"#,
        )
        .unwrap();

        let outlet_list = doc.get("Outlets").unwrap().sub_item("OutletList").unwrap();
        assert_eq!(outlet_list.actions.read, Some(false));

        let history = doc.get("Topup").unwrap().sub_item("TopupHistory").unwrap();
        assert_eq!(history.actions.delete, Some(false));
        assert_eq!(history.actions.read, None);
    }

    #[test]
    fn test_payload_order_is_preserved() {
        let doc = PermissionDocument::parse(r#"{"Tax": {}, "Member": {}, "Category": {}}"#).unwrap();
        let keys: Vec<&str> = doc.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Tax", "Member", "Category"]);
    }

    #[test]
    fn test_duplicate_key_last_wins_in_place() {
        let doc = PermissionDocument::parse(
            r#"{"Member": {"read": true}, "Tax": {}, "Member": {"read": false}}"#,
        )
        .unwrap();
        let keys: Vec<&str> = doc.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Member", "Tax"]);
        assert_eq!(doc.get("Member").unwrap().actions.read, Some(false));
    }

    #[test]
    fn test_blank_and_null_payloads_are_empty() {
        assert!(PermissionDocument::parse("").unwrap().is_empty());
        assert!(PermissionDocument::parse("   ").unwrap().is_empty());
        assert!(PermissionDocument::parse("null").unwrap().is_empty());
        assert!(PermissionDocument::from_value(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_empty_array_sub_items_tolerated() {
        let doc = PermissionDocument::parse(r#"{"Member": {"read": true, "subItems": []}}"#).unwrap();
        let member = doc.get("Member").unwrap();
        assert!(member.sub_items.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        assert!(PermissionDocument::parse("{not json").is_err());
        assert!(PermissionDocument::parse(r#"{"Member": {"read": "yes"}}"#).is_err());
        assert!(matches!(
            PermissionDocument::parse("{not json"),
            Err(PayloadError::Malformed(_))
        ));
    }

    #[test]
    fn test_top_level_must_be_an_object() {
        assert!(matches!(
            PermissionDocument::parse("[1, 2]"),
            Err(PayloadError::NotAnObject("array"))
        ));
        assert!(matches!(
            PermissionDocument::parse("42"),
            Err(PayloadError::NotAnObject("number"))
        ));
        assert!(matches!(
            PermissionDocument::from_value(serde_json::json!(true)),
            Err(PayloadError::NotAnObject("boolean"))
        ));
        let err = PermissionDocument::parse(r#""Member""#).unwrap_err();
        assert_eq!(err.to_string(), "permission payload must be a JSON object, got string");
        assert!(PermissionDocument::parse_or_empty("[1, 2]").is_empty());
    }

    #[test]
    fn test_malformed_payload_falls_back_to_empty() {
        assert!(PermissionDocument::parse_or_empty("{not json").is_empty());
        assert!(PermissionDocument::from_value_or_empty(json!("Member")).is_empty());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let doc = PermissionDocument::from_value(json!({
            "Member": {"label": "Members", "read": true}
        }))
        .unwrap();
        assert_eq!(doc.get("Member").unwrap().actions.read, Some(true));
    }

    #[test]
    fn test_serialize_omits_unspecified_flags() {
        let doc: PermissionDocument = [(
            "Member",
            CapabilityEntry::new(ActionSet::default().with(Action::Update, false)),
        )]
        .into_iter()
        .collect();

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value, json!({"Member": {"update": false}}));
    }

    #[test]
    fn test_find_sub_item_searches_nested_levels() {
        let doc: PermissionDocument = [(
            "Reports",
            CapabilityEntry::default().with_sub_item(
                "Sales",
                CapabilityEntry::default()
                    .with_sub_item("Daily", CapabilityEntry::new(ActionSet::default().with(Action::Read, true))),
            ),
        )]
        .into_iter()
        .collect();

        let (parent, entry) = doc.find_sub_item("Daily").unwrap();
        assert_eq!(parent, "Sales");
        assert_eq!(entry.actions.read, Some(true));
        assert!(doc.find_sub_item("Weekly").is_none());
    }

    #[test]
    fn test_action_parse_and_tokens() {
        assert_eq!("DELETE".parse::<Action>().unwrap(), Action::Delete);
        assert_eq!(" read ".parse::<Action>().unwrap(), Action::Read);
        assert!("approve".parse::<Action>().is_err());

        assert_tokens(
            &Action::Update,
            &[Token::UnitVariant { name: "Action", variant: "update" }],
        );
    }

    #[test]
    fn test_payload_schema_mentions_sub_items() {
        let schema = schemars::schema_for!(PermissionDocument);
        let rendered = serde_json::to_string(&schema).unwrap();
        assert!(rendered.contains("subItems"));
        assert!(rendered.contains("CapabilityEntry"));
    }
}
