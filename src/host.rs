//! The page side of the script handoff.
//!
//! A documentation page exposes two globals to the generated scripts: an
//! optional `register_implementors` callback and a `pending_implementors` slot,
//! plus the `initSidebarItems` function. [`PageHost`] models that surface so
//! loading a script has the same observable effects as in the browser.

use crate::error::ScriptError;
use crate::implementors::{ImplementorsScript, ImplementorsTable};
use crate::sidebar::{self, SidebarItems};
use std::fmt;

/// Callback installed by the page to receive implementors tables.
pub type RegisterImplementors = Box<dyn FnMut(&ImplementorsTable) + Send>;

/// Page globals reachable from the generated scripts.
#[derive(Default)]
pub struct PageHost {
    register_implementors: Option<RegisterImplementors>,
    pending_implementors: Option<ImplementorsTable>,
    sidebar_items: Option<SidebarItems>,
    registrations: usize,
}

impl PageHost {
    /// A page whose scripts have not run yet and that has no callback installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// A page that installed its callback before any script ran.
    pub fn with_register_implementors(
        callback: impl FnMut(&ImplementorsTable) + Send + 'static,
    ) -> Self {
        Self {
            register_implementors: Some(Box::new(callback)),
            ..Self::default()
        }
    }

    /// Installs the callback after the fact.
    ///
    /// A table parked in the pending slot is picked up immediately, which is
    /// what the page's own startup code does once it is ready.
    pub fn set_register_implementors(
        &mut self,
        callback: impl FnMut(&ImplementorsTable) + Send + 'static,
    ) {
        let mut callback: RegisterImplementors = Box::new(callback);
        if let Some(table) = self.pending_implementors.take() {
            tracing::debug!(crates = table.len(), "Draining pending implementors");
            callback(&table);
            self.registrations += 1;
        }
        self.register_implementors = Some(callback);
    }

    pub const fn has_register_implementors(&self) -> bool {
        self.register_implementors.is_some()
    }

    pub const fn pending_implementors(&self) -> Option<&ImplementorsTable> {
        self.pending_implementors.as_ref()
    }

    pub fn take_pending_implementors(&mut self) -> Option<ImplementorsTable> {
        self.pending_implementors.take()
    }

    /// The table most recently passed to `initSidebarItems`.
    pub const fn sidebar_items(&self) -> Option<&SidebarItems> {
        self.sidebar_items.as_ref()
    }

    /// How many times the registration callback has been invoked.
    pub const fn registrations(&self) -> usize {
        self.registrations
    }

    /// `if (window.register_implementors) {...} else {window.pending_implementors = ...}`
    fn register_or_defer(&mut self, table: &ImplementorsTable) {
        match self.register_implementors.as_mut() {
            Some(register) => {
                tracing::debug!(crates = table.len(), "Registering implementors");
                register(table);
                self.registrations += 1;
            }
            None => {
                tracing::debug!(crates = table.len(), "No register callback, deferring implementors");
                self.pending_implementors = Some(table.clone());
            }
        }
    }

    /// The page's `initSidebarItems` function.
    pub fn init_sidebar_items(&mut self, items: SidebarItems) {
        tracing::debug!(items = items.len(), "Initializing sidebar items");
        self.sidebar_items = Some(items);
    }
}

impl fmt::Debug for PageHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageHost")
            .field("register_implementors", &self.register_implementors.is_some())
            .field("pending_implementors", &self.pending_implementors)
            .field("sidebar_items", &self.sidebar_items)
            .field("registrations", &self.registrations)
            .finish()
    }
}

impl ImplementorsScript {
    /// Runs the script against a page.
    ///
    /// With a callback installed it is called exactly once with the whole table
    /// and the pending slot is left alone; otherwise the pending slot receives
    /// the table, replacing whatever it held.
    pub fn load(&self, host: &mut PageHost) {
        host.register_or_defer(&self.table);
    }
}

impl SidebarItems {
    /// Runs `initSidebarItems(...)` against a page.
    pub fn load(&self, host: &mut PageHost) {
        host.init_sidebar_items(self.clone());
    }
}

/// Either of the generated navigation scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    Implementors(ImplementorsScript),
    Sidebar(SidebarItems),
}

impl Script {
    /// Detects the script shape and parses it.
    ///
    /// The leading call decides the shape, since record text in an
    /// implementors script may quote `initSidebarItems(` anywhere.
    pub fn parse(source: &str) -> Result<Self, ScriptError> {
        if source.trim_start().starts_with(sidebar::CALL) {
            SidebarItems::parse(source).map(Self::Sidebar)
        } else if ImplementorsScript::detect(source) {
            ImplementorsScript::parse(source).map(Self::Implementors)
        } else if SidebarItems::detect(source) {
            SidebarItems::parse(source).map(Self::Sidebar)
        } else {
            Err(ScriptError::Unrecognized)
        }
    }

    pub fn load(&self, host: &mut PageHost) {
        match self {
            Self::Implementors(script) => script.load(host),
            Self::Sidebar(items) => items.load(host),
        }
    }

    pub fn render(&self) -> String {
        match self {
            Self::Implementors(script) => script.render(),
            Self::Sidebar(items) => items.render(),
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Implementors(_) => "implementors",
            Self::Sidebar(_) => "sidebar-items",
        }
    }
}
