// adminx-acl/src/middleware/capability_guard.rs
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use actix_session::SessionExt;
use futures_util::future::LocalBoxFuture;
use std::rc::Rc;
use tracing::{info, warn};
use crate::configs::initializer::{AclConfig, DEFAULT_SESSION_KEY};
use crate::error::AclError;
use crate::models::permission_model::Action;
use crate::session::{SessionSlot, SessionView};
use crate::utils::auth::load_permission_session;

/// Route guard that lets a request through only when the gate allows
/// `action` on the configured capability key.
///
/// The session view is taken, in order, from request extensions, the cookie
/// session, then a `web::Data<SessionSlot>`. The cookie key is the guard's
/// own override, else `session_key` of a `web::Data<AclConfig>`, else
/// [`DEFAULT_SESSION_KEY`]. With none of them the request
/// is evaluated against the empty staff view and answered with 401; a
/// denial for a known session is answered with 403.
#[derive(Debug, Clone)]
pub struct CapabilityGuard {
    pub module_key: String,
    pub sub_key: Option<String>,
    pub action: Action,
    pub session_key: Option<String>,
}

impl CapabilityGuard {
    pub fn new(module_key: &str, action: Action) -> Self {
        Self {
            module_key: module_key.to_string(),
            sub_key: None,
            action,
            session_key: None,
        }
    }

    pub fn read(module_key: &str) -> Self {
        Self::new(module_key, Action::Read)
    }

    pub fn create(module_key: &str) -> Self {
        Self::new(module_key, Action::Create)
    }

    pub fn update(module_key: &str) -> Self {
        Self::new(module_key, Action::Update)
    }

    pub fn delete(module_key: &str) -> Self {
        Self::new(module_key, Action::Delete)
    }

    pub fn sub_item(mut self, sub_key: &str) -> Self {
        self.sub_key = Some(sub_key.to_string());
        self
    }

    pub fn with_session_key(mut self, session_key: &str) -> Self {
        self.session_key = Some(session_key.to_string());
        self
    }

    fn target(&self) -> String {
        match &self.sub_key {
            Some(sub) => format!("{}/{}:{}", self.module_key, sub, self.action),
            None => format!("{}:{}", self.module_key, self.action),
        }
    }

    fn session_key<'a>(&'a self, req: &'a ServiceRequest) -> &'a str {
        self.session_key
            .as_deref()
            .or_else(|| {
                req.app_data::<web::Data<AclConfig>>()
                    .map(|config| config.session_key.as_str())
            })
            .unwrap_or(DEFAULT_SESSION_KEY)
    }

    fn request_view(&self, req: &ServiceRequest) -> Option<SessionView> {
        if let Some(view) = req.extensions().get::<SessionView>() {
            return Some(view.clone());
        }
        if let Some(stored) = load_permission_session(&req.get_session(), self.session_key(req)) {
            return Some(stored.view());
        }
        req.app_data::<web::Data<SessionSlot>>()
            .and_then(|slot| slot.current())
            .map(|stored| stored.view())
    }
}

impl<S, B> Transform<S, ServiceRequest> for CapabilityGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = CapabilityGuardMiddleware<S>;
    type InitError = ();
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let guard = Rc::new(self.clone());
        Box::pin(async move {
            Ok(CapabilityGuardMiddleware {
                service: Rc::new(service),
                guard,
            })
        })
    }
}

pub struct CapabilityGuardMiddleware<S> {
    service: Rc<S>,
    guard: Rc<CapabilityGuard>,
}

impl<S, B> Service<ServiceRequest> for CapabilityGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = Rc::clone(&self.service);
        let guard = Rc::clone(&self.guard);

        Box::pin(async move {
            let uri = req.uri().to_string();
            let loaded = guard.request_view(&req);
            let authenticated = loaded.is_some();
            let view = loaded.unwrap_or_else(SessionView::anonymous);

            let allowed = view.can(&guard.module_key, guard.sub_key.as_deref(), guard.action);
            if allowed {
                info!("✅ Access granted to {} for {} (role: {})", guard.target(), uri, view.role);
                req.extensions_mut().insert(view);
                let res = svc.call(req).await?;
                return Ok(res.map_into_left_body());
            }

            let denial = if authenticated {
                warn!("🚫 Access denied to {} for {} (role: {})", guard.target(), uri, view.role);
                AclError::Forbidden(guard.target())
            } else {
                warn!("🔐 No permission session for {} on {}", uri, guard.target());
                AclError::Unauthorized
            };
            let response = denial.error_response();
            Ok(req.into_response(response).map_into_right_body())
        })
    }
}
