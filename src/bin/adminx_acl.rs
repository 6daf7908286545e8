// adminx-acl/src/bin/adminx_acl.rs

use adminx_acl::{
    configs::initializer::{load_configured_menu, setup_acl_logging, AclConfig},
    configs::menu_config::default_backoffice_menu,
    filter_menu, resolve, Action, Decision, Lookup, MenuNode, MenuNodeDecl, PermissionDocument, Role,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "adminx-acl")]
#[command(about = "Inspect what a back-office role can see and do")]
#[command(version)]
struct Cli {
    /// Menu declarations (JSON); the built-in back-office menu when omitted
    #[arg(long, env = "ADMINX_MENU_PATH", global = true)]
    menu: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Subject {
    /// Permission payload file (JSON); an empty document when omitted
    #[arg(short, long)]
    permissions: Option<PathBuf>,
    /// Role discriminator ("admin" or anything else for staff)
    #[arg(short, long, default_value = "staff")]
    role: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the menu visible to a role and permission document
    Filter {
        #[command(flatten)]
        subject: Subject,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Check one action; exits with status 1 when denied
    Can {
        #[command(flatten)]
        subject: Subject,
        /// Module capability key (e.g. Member, Outlets)
        module: String,
        /// read, create, update or delete
        #[arg(short, long)]
        action: Action,
        /// Sub-item capability key below the module
        #[arg(short, long)]
        sub: Option<String>,
    },
    /// Show the decision behind every action for a module
    Explain {
        #[command(flatten)]
        subject: Subject,
        module: String,
        #[arg(short, long)]
        sub: Option<String>,
    },
    /// Print a JSON Schema for policy or menu authors
    Schema {
        #[arg(value_enum, default_value_t = SchemaTarget::Permissions)]
        target: SchemaTarget,
    },
    /// Print the built-in back-office menu declarations
    Menu,
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaTarget {
    /// The permission payload
    Permissions,
    /// A menu declaration file
    Menu,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AclConfig::from_env();
    if cli.menu.is_some() {
        config.menu_path = cli.menu.clone();
    }
    setup_acl_logging(&config);

    match cli.command {
        Commands::Filter { subject, pretty } => {
            let menu = load_configured_menu(&config)?;
            let (role, document) = load_subject(&subject, false)?;
            let filtered = filter_menu(&menu, &document, role);
            print_json(&filtered, pretty)?;
        }
        Commands::Can { subject, module, action, sub } => {
            let (role, document) = load_subject(&subject, false)?;
            let decision = resolve(role, &document, &module, action, sub.as_deref());
            println!("{}", decision.is_allowed());
            if !decision.is_allowed() {
                std::process::exit(1);
            }
        }
        Commands::Explain { subject, module, sub } => {
            let (role, document) = load_subject(&subject, true)?;
            println!("role: {}  module: {}  sub-item: {}", role, module, sub.as_deref().unwrap_or("-"));
            for action in Action::ALL {
                let decision = resolve(role, &document, &module, action, sub.as_deref());
                println!(
                    "  {:<7} {:<6} {:<13} {}",
                    action.as_str(),
                    if decision.is_allowed() { "allow" } else { "deny" },
                    decision.label(),
                    lookup_note(&decision),
                );
            }
        }
        Commands::Schema { target } => {
            let schema = match target {
                SchemaTarget::Permissions => schemars::schema_for!(PermissionDocument),
                SchemaTarget::Menu => schemars::schema_for!(Vec<MenuNodeDecl>),
            };
            print_json(&schema, true)?;
        }
        Commands::Menu => {
            let menu: Vec<MenuNode> = default_backoffice_menu();
            print_json(&menu, true)?;
        }
    }

    Ok(())
}

/// `strict` surfaces payload errors instead of degrading to an empty document.
fn load_subject(subject: &Subject, strict: bool) -> Result<(Role, PermissionDocument)> {
    let role = Role::from_discriminator(&subject.role);
    let document = match &subject.permissions {
        None => PermissionDocument::empty(),
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read permissions from {}", path.display()))?;
            if strict {
                PermissionDocument::parse(&raw)
                    .with_context(|| format!("Invalid permission payload in {}", path.display()))?
            } else {
                PermissionDocument::parse_or_empty(&raw)
            }
        }
    };
    Ok((role, document))
}

fn lookup_note(decision: &Decision) -> &'static str {
    match decision {
        Decision::Explicit { via: Lookup::SecondaryScan, .. }
        | Decision::Unspecified { via: Lookup::SecondaryScan } => "(found under another module)",
        Decision::Unresolved => "(no matching key in document)",
        _ => "",
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", rendered);
    Ok(())
}
