//! The trait implementors table (`implementors/**/trait.*.js`).
//!
//! rustdoc writes one script per trait listing, for every documented crate, the
//! impls of that trait it knows about. The script fills a local `implementors`
//! object and then either hands it to the page's `register_implementors`
//! callback or parks it in `pending_implementors` until the page is ready.

use crate::error::{ScriptError, TableError, TableIssue};
use crate::html::{self, DocLink};
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Write as _};
use std::sync::LazyLock;

/// Matches `implementors["crate_name"] = ` and captures the JSON-quoted key.
static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"implementors\[\s*("(?:[^"\\]|\\.)*")\s*\]\s*=\s*"#).expect("valid regex")
});

const PRELUDE: &str = "var implementors";
const ASSIGNMENT_PREFIX: &str = "implementors[";
const WRAPPER_OPEN: &str = "(function";
const WRAPPER_CLOSE: &str = "})()";

/// One `impl Trait for Type` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementorRecord {
    /// The impl header as an HTML fragment.
    pub text: String,
    /// Auto-trait and blanket impls are marked synthetic by rustdoc.
    #[serde(default)]
    pub synthetic: bool,
    /// Fully qualified paths of the implementing type(s).
    #[serde(default)]
    pub types: Vec<String>,
}

impl ImplementorRecord {
    pub fn new(text: impl Into<String>, synthetic: bool, types: Vec<String>) -> Self {
        Self {
            text: text.into(),
            synthetic,
            types,
        }
    }

    /// The impl header without markup, e.g. `impl<'a> Unpin for EList<'a>`.
    pub fn plain_text(&self) -> String {
        html::plain_text(&self.text)
    }

    /// All hyperlinks in the impl header.
    pub fn links(&self) -> Vec<DocLink> {
        html::links(&self.text)
    }

    /// Link to the implemented trait (the first trait anchor before ` for `).
    pub fn trait_link(&self) -> Option<DocLink> {
        let head = self.text.find(" for ").map_or(self.text.as_str(), |i| &self.text[..i]);
        html::links(head).into_iter().find(|link| link.class == "trait")
    }

    /// Link to the implementing type (the first anchor after ` for `).
    ///
    /// Blanket impls over a bare type parameter have no such anchor.
    pub fn implementing_type(&self) -> Option<DocLink> {
        let at = self.text.find(" for ")?;
        html::links(&self.text[at..]).into_iter().next()
    }

    /// Whether the impl introduces its own generic parameters.
    pub fn is_generic(&self) -> bool {
        self.text.starts_with("impl&lt;") || self.text.starts_with("impl<")
    }
}

/// The records filed under one crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrateImplementors {
    pub crate_name: String,
    pub records: Vec<ImplementorRecord>,
}

/// Crate name to implementor records, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImplementorsTable {
    entries: Vec<CrateImplementors>,
}

impl ImplementorsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the records of a crate.
    ///
    /// Like a JS property assignment, an existing key keeps its position and
    /// has its records replaced; nothing accumulates.
    pub fn insert(&mut self, crate_name: impl Into<String>, records: Vec<ImplementorRecord>) {
        let crate_name = crate_name.into();
        match self.entries.iter_mut().find(|e| e.crate_name == crate_name) {
            Some(entry) => entry.records = records,
            None => self.entries.push(CrateImplementors {
                crate_name,
                records,
            }),
        }
    }

    pub fn get(&self, crate_name: &str) -> Option<&[ImplementorRecord]> {
        self.entries
            .iter()
            .find(|e| e.crate_name == crate_name)
            .map(|e| e.records.as_slice())
    }

    pub fn crates(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.crate_name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CrateImplementors> {
        self.entries.iter()
    }

    /// Number of crates in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of records across all crates.
    pub fn record_count(&self) -> usize {
        self.entries.iter().map(|e| e.records.len()).sum()
    }

    /// Checks that every record names at least one type and that each type
    /// path is rooted in the crate the record is filed under.
    pub fn validate(&self) -> Result<(), TableError> {
        TableError::check(self.issues())
    }

    pub(crate) fn issues(&self) -> Vec<TableIssue> {
        let mut issues = Vec::new();
        for entry in &self.entries {
            let expected = entry.crate_name.replace('-', "_");
            for (index, record) in entry.records.iter().enumerate() {
                if record.types.is_empty() {
                    issues.push(TableIssue::MissingTypes {
                        crate_name: entry.crate_name.clone(),
                        index,
                    });
                }
                for type_path in &record.types {
                    let root = type_path.split("::").next().unwrap_or_default();
                    if root != expected {
                        issues.push(TableIssue::CrateMismatch {
                            crate_name: entry.crate_name.clone(),
                            type_path: type_path.clone(),
                        });
                    }
                }
            }
        }
        issues
    }
}

impl Serialize for ImplementorsTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.crate_name, &entry.records)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ImplementorsTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = ImplementorsTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of crate names to implementor records")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut table = ImplementorsTable::new();
                while let Some((crate_name, records)) =
                    access.next_entry::<String, Vec<ImplementorRecord>>()?
                {
                    table.insert(crate_name, records);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// A parsed `trait.*.js` implementors script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImplementorsScript {
    pub table: ImplementorsTable,
}

impl ImplementorsScript {
    pub const fn new(table: ImplementorsTable) -> Self {
        Self { table }
    }

    /// Whether `source` looks like an implementors script at all.
    pub fn detect(source: &str) -> bool {
        source.contains(PRELUDE) || ASSIGNMENT.is_match(source)
    }

    /// Parses the generated script.
    ///
    /// Each `implementors["k"] = [...]` assignment is applied in order, so a
    /// repeated key ends up with its last value.
    pub fn parse(source: &str) -> Result<Self, ScriptError> {
        if !Self::detect(source) {
            return Err(ScriptError::Unrecognized);
        }

        let mut table = ImplementorsTable::new();
        let mut pos = 0;
        while let Some(caps) = ASSIGNMENT.captures_at(source, pos) {
            let whole = caps.get(0).ok_or(ScriptError::Truncated("assignment"))?;
            let crate_name: String = serde_json::from_str(&caps[1]).map_err(|source| {
                ScriptError::InvalidRecords {
                    crate_name: caps[1].to_string(),
                    source,
                }
            })?;

            let rest = &source[whole.end()..];
            let mut stream =
                serde_json::Deserializer::from_str(rest).into_iter::<Vec<ImplementorRecord>>();
            let records = match stream.next() {
                Some(Ok(records)) => records,
                Some(Err(source)) => {
                    return Err(ScriptError::InvalidRecords { crate_name, source });
                }
                None => return Err(ScriptError::Truncated("record array")),
            };
            pos = whole.end() + stream.byte_offset();

            tracing::trace!(crate_name = %crate_name, records = records.len(), "Parsed implementors entry");
            table.insert(crate_name, records);
        }

        check_tail(source, &source[pos..])?;
        Ok(Self { table })
    }

    /// Renders the script in the shape rustdoc generates.
    pub fn render(&self) -> String {
        let mut out = String::from("(function() {var implementors = {};\n");
        for entry in self.table.iter() {
            // Serializing strings and derived structs cannot fail.
            let key = serde_json::to_string(&entry.crate_name).unwrap_or_default();
            let records = serde_json::to_string(&entry.records).unwrap_or_default();
            let _ = writeln!(out, "implementors[{}] = {};", key, records);
        }
        out.push_str(
            "\n            if (window.register_implementors) {\n                \
             window.register_implementors(implementors);\n            } else {\n                \
             window.pending_implementors = implementors;\n            }\n        })()",
        );
        out
    }
}

/// Rejects a script cut off after its last complete assignment.
///
/// Nothing but the handoff may follow the assignments, and a script wrapped
/// in `(function() {...})()` must still end with its closing call.
fn check_tail(source: &str, tail: &str) -> Result<(), ScriptError> {
    if tail.contains(ASSIGNMENT_PREFIX) {
        return Err(ScriptError::Truncated("implementors assignment"));
    }
    if source.trim_start().starts_with(WRAPPER_OPEN)
        && !tail.trim_end().trim_end_matches(';').ends_with(WRAPPER_CLOSE)
    {
        return Err(ScriptError::Truncated("register_implementors handoff"));
    }
    Ok(())
}
