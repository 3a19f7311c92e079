//! Per-page sidebar item tables (`sidebar-items.js`).

use crate::error::{ScriptError, TableError, TableIssue};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{self, Write as _};
use std::str::FromStr;

pub(crate) const CALL: &str = "initSidebarItems(";

/// Item kind tags used as keys of the sidebar table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SidebarKind {
    #[serde(rename = "constant")]
    Constant,
    #[serde(rename = "enum")]
    Enum,
    #[serde(rename = "mod")]
    Module,
    #[serde(rename = "struct")]
    Struct,
    #[serde(rename = "trait")]
    Trait,
    #[serde(rename = "fn")]
    Function,
    #[serde(rename = "macro")]
    Macro,
    #[serde(rename = "type")]
    TypeAlias,
    #[serde(rename = "static")]
    Static,
    #[serde(rename = "union")]
    Union,
    #[serde(rename = "primitive")]
    Primitive,
    #[serde(rename = "keyword")]
    Keyword,
    #[serde(rename = "attr")]
    Attribute,
    #[serde(rename = "derive")]
    Derive,
    #[serde(rename = "traitalias")]
    TraitAlias,
}

impl SidebarKind {
    pub const ALL: [Self; 15] = [
        Self::Constant,
        Self::Enum,
        Self::Module,
        Self::Struct,
        Self::Trait,
        Self::Function,
        Self::Macro,
        Self::TypeAlias,
        Self::Static,
        Self::Union,
        Self::Primitive,
        Self::Keyword,
        Self::Attribute,
        Self::Derive,
        Self::TraitAlias,
    ];

    /// The tag as written in the script.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Enum => "enum",
            Self::Module => "mod",
            Self::Struct => "struct",
            Self::Trait => "trait",
            Self::Function => "fn",
            Self::Macro => "macro",
            Self::TypeAlias => "type",
            Self::Static => "static",
            Self::Union => "union",
            Self::Primitive => "primitive",
            Self::Keyword => "keyword",
            Self::Attribute => "attr",
            Self::Derive => "derive",
            Self::TraitAlias => "traitalias",
        }
    }
}

impl fmt::Display for SidebarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SidebarKind {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ScriptError::UnknownKind(s.to_string()))
    }
}

/// A name and its one-line summary (possibly empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarEntry {
    pub name: String,
    pub description: String,
}

/// All entries of one kind, in page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarGroup {
    pub kind: SidebarKind,
    pub entries: Vec<SidebarEntry>,
}

/// A flattened view of one entry with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarItem<'a> {
    pub kind: SidebarKind,
    pub name: &'a str,
    pub description: &'a str,
}

/// The item table of one documentation page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarItems {
    groups: Vec<SidebarGroup>,
}

impl SidebarItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entries of one kind, replacing any previous group in place.
    pub fn insert(&mut self, kind: SidebarKind, entries: Vec<SidebarEntry>) {
        match self.groups.iter_mut().find(|g| g.kind == kind) {
            Some(group) => group.entries = entries,
            None => self.groups.push(SidebarGroup { kind, entries }),
        }
    }

    /// Kinds present on the page, in script order.
    pub fn kinds(&self) -> impl Iterator<Item = SidebarKind> + '_ {
        self.groups.iter().map(|g| g.kind)
    }

    pub fn items(&self, kind: SidebarKind) -> &[SidebarEntry] {
        self.groups
            .iter()
            .find(|g| g.kind == kind)
            .map(|g| g.entries.as_slice())
            .unwrap_or_default()
    }

    pub fn groups(&self) -> &[SidebarGroup] {
        &self.groups
    }

    pub fn iter(&self) -> impl Iterator<Item = SidebarItem<'_>> {
        self.groups.iter().flat_map(|group| {
            group.entries.iter().map(move |entry| SidebarItem {
                kind: group.kind,
                name: &entry.name,
                description: &entry.description,
            })
        })
    }

    /// First entry with the given name, of any kind.
    pub fn find(&self, name: &str) -> Option<SidebarItem<'_>> {
        self.iter().find(|item| item.name == name)
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks that names are unique within each kind.
    pub fn validate(&self) -> Result<(), TableError> {
        TableError::check(self.issues())
    }

    pub(crate) fn issues(&self) -> Vec<TableIssue> {
        let mut issues = Vec::new();
        for group in &self.groups {
            let mut seen = ahash::AHashSet::with_capacity(group.entries.len());
            for entry in &group.entries {
                if !seen.insert(entry.name.as_str()) {
                    issues.push(TableIssue::DuplicateName {
                        kind: group.kind.to_string(),
                        name: entry.name.clone(),
                    });
                }
            }
        }
        issues
    }

    /// Whether `source` looks like a sidebar script.
    pub fn detect(source: &str) -> bool {
        source.contains(CALL)
    }

    /// Parses `initSidebarItems({...});`.
    pub fn parse(source: &str) -> Result<Self, ScriptError> {
        let start = source.find(CALL).ok_or(ScriptError::Unrecognized)? + CALL.len();
        let mut stream =
            serde_json::Deserializer::from_str(&source[start..]).into_iter::<RawTable>();
        let raw = match stream.next() {
            Some(Ok(raw)) => raw,
            Some(Err(err)) => return Err(ScriptError::InvalidSidebar(err)),
            None => return Err(ScriptError::Truncated("sidebar table")),
        };
        let rest = source[start + stream.byte_offset()..].trim_start();
        if !rest.starts_with(')') {
            return Err(ScriptError::Truncated("closing parenthesis"));
        }

        let mut items = Self::new();
        for (tag, entries) in raw.0 {
            let kind = tag.parse()?;
            items.insert(kind, entries.into_iter().map(RawEntry::into_entry).collect());
        }
        Ok(items)
    }

    /// Renders the `initSidebarItems(...)` call.
    pub fn render(&self) -> String {
        let mut out = String::from("initSidebarItems({");
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let pairs: Vec<[&str; 2]> = group
                .entries
                .iter()
                .map(|e| [e.name.as_str(), e.description.as_str()])
                .collect();
            // Serializing strings cannot fail.
            let list = serde_json::to_string(&pairs).unwrap_or_default();
            let _ = write!(out, "\"{}\":{}", group.kind, list);
        }
        out.push_str("});");
        out
    }
}

/// Sidebar script argument with key order preserved.
struct RawTable(Vec<(String, Vec<RawEntry>)>);

impl<'de> Deserialize<'de> for RawTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawVisitor;

        impl<'de> Visitor<'de> for RawVisitor {
            type Value = RawTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of item kinds to item lists")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut groups = Vec::new();
                while let Some(entry) = access.next_entry::<String, Vec<RawEntry>>()? {
                    groups.push(entry);
                }
                Ok(RawTable(groups))
            }
        }

        deserializer.deserialize_map(RawVisitor)
    }
}

/// Older rustdoc writes `[name, summary]` pairs, newer versions bare names.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Pair(String, String),
    Name(String),
}

impl RawEntry {
    fn into_entry(self) -> SidebarEntry {
        match self {
            Self::Pair(name, description) => SidebarEntry { name, description },
            Self::Name(name) => SidebarEntry {
                name,
                description: String::new(),
            },
        }
    }
}
