pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod host;
pub mod html;
pub mod implementors;
pub mod sidebar;
pub mod site;
pub mod tracing;

pub use config::Config;
pub use error::{LoadError, ScriptError, TableError, TableIssue};
pub use host::{PageHost, Script};
pub use implementors::{ImplementorRecord, ImplementorsScript, ImplementorsTable};
pub use sidebar::{SidebarEntry, SidebarItem, SidebarItems, SidebarKind};
pub use site::DocSite;
