//! Index over a whole rustdoc output directory.
//!
//! A `target/doc` tree holds one implementors script per documented trait and
//! one sidebar script per module page. [`DocSite`] gathers both so they can be
//! queried by trait, by type and by module.

use crate::error::{LoadError, Result, TableIssue};
use crate::implementors::{ImplementorRecord, ImplementorsScript, ImplementorsTable};
use crate::sidebar::SidebarItems;
use anyhow::Context;
use ignore::WalkBuilder;
use rapidfuzz::distance::jaro_winkler;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

const IMPLEMENTORS_DIR: &str = "implementors";
const SIDEBAR_FILE: &str = "sidebar-items.js";

/// What a discovered script describes, derived from where it lives.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScriptTarget {
    /// `implementors/core/marker/trait.Unpin.js` → `core::marker::Unpin`
    Trait(String),
    /// `rust_eterm/terms/sidebar-items.js` → `rust_eterm::terms`
    Module(String),
}

/// A script found under the documentation root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFile {
    pub target: ScriptTarget,
    /// Path relative to the documentation root.
    pub relative: PathBuf,
}

/// The implementors of one trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitImplementors {
    pub trait_path: String,
    pub source: PathBuf,
    pub table: ImplementorsTable,
}

/// The sidebar of one module page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePage {
    pub module_path: String,
    pub source: PathBuf,
    pub items: SidebarItems,
}

/// A record matched by a type query, with the trait it implements.
#[derive(Debug, Clone, Serialize)]
pub struct ImplementorMatch<'a> {
    pub trait_path: &'a str,
    pub crate_name: &'a str,
    pub record: &'a ImplementorRecord,
}

/// An invariant violation together with the script it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteIssue {
    pub source: PathBuf,
    #[serde(serialize_with = "serialize_display")]
    pub issue: TableIssue,
}

fn serialize_display<S: serde::Serializer>(
    issue: &TableIssue,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(issue)
}

/// A fuzzy match for a path that was not found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub path: String,
    pub kind: &'static str,
    /// Jaro-Winkler similarity of the last path segment (0.0 to 1.0).
    pub score: f64,
}

/// All navigation tables of one documentation tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocSite {
    root: PathBuf,
    traits: Vec<TraitImplementors>,
    pages: Vec<ModulePage>,
}

impl DocSite {
    /// Walks `doc_dir`, reads every navigation script and indexes it.
    ///
    /// Scripts that fail to parse are logged and skipped; only a missing
    /// directory or an unreadable file is an error.
    pub async fn scan(doc_dir: &Path) -> Result<Self> {
        let sources = read_sources(doc_dir).await?;
        Ok(Self::from_sources(doc_dir, &sources))
    }

    /// Builds the index from already-read script sources.
    pub fn from_sources(root: &Path, sources: &[(ScriptFile, String)]) -> Self {
        let mut site = Self {
            root: root.to_path_buf(),
            ..Self::default()
        };

        for (file, source) in sources {
            match &file.target {
                ScriptTarget::Trait(trait_path) => match ImplementorsScript::parse(source) {
                    Ok(script) => site.traits.push(TraitImplementors {
                        trait_path: trait_path.clone(),
                        source: file.relative.clone(),
                        table: script.table,
                    }),
                    Err(e) => tracing::warn!(
                        path = %file.relative.display(),
                        error = %e,
                        "Skipping unparseable implementors script"
                    ),
                },
                ScriptTarget::Module(module_path) => match SidebarItems::parse(source) {
                    Ok(items) => site.pages.push(ModulePage {
                        module_path: module_path.clone(),
                        source: file.relative.clone(),
                        items,
                    }),
                    Err(e) => tracing::warn!(
                        path = %file.relative.display(),
                        error = %e,
                        "Skipping unparseable sidebar script"
                    ),
                },
            }
        }

        site.traits.sort_by(|a, b| a.trait_path.cmp(&b.trait_path));
        site.pages.sort_by(|a, b| a.module_path.cmp(&b.module_path));

        tracing::info!(
            root = %root.display(),
            traits = site.traits.len(),
            pages = site.pages.len(),
            "Indexed documentation site"
        );
        site
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn set_root(&mut self, root: &Path) {
        self.root = root.to_path_buf();
    }

    /// Documented trait paths, sorted.
    pub fn traits(&self) -> impl Iterator<Item = &str> {
        self.traits.iter().map(|t| t.trait_path.as_str())
    }

    /// Module paths that have a sidebar, sorted.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|p| p.module_path.as_str())
    }

    /// Every crate that appears as an implementors key or as a module root.
    pub fn crates(&self) -> BTreeSet<&str> {
        let keyed = self.traits.iter().flat_map(|t| t.table.crates());
        let rooted = self
            .pages
            .iter()
            .filter_map(|p| p.module_path.split("::").next());
        keyed.chain(rooted).collect()
    }

    /// Looks up a trait by full path, or by bare name when that name is unique.
    pub fn implementors_of(&self, query: &str) -> Option<&TraitImplementors> {
        let query = query.trim();
        if let Some(found) = self.traits.iter().find(|t| t.trait_path == query) {
            return Some(found);
        }
        if query.contains("::") {
            return None;
        }
        let mut named = self
            .traits
            .iter()
            .filter(|t| last_segment(&t.trait_path) == query);
        match (named.next(), named.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    /// All implementor records whose type matches `type_query`.
    ///
    /// A qualified query must equal one of the record's type paths or the path
    /// of its implementing-type link; a bare name matches on the last segment.
    pub fn traits_implemented_by(&self, type_query: &str) -> Vec<ImplementorMatch<'_>> {
        let query = type_query.trim();
        let mut matches = Vec::new();
        for implementors in &self.traits {
            for entry in implementors.table.iter() {
                for record in &entry.records {
                    if record_matches_type(record, query) {
                        matches.push(ImplementorMatch {
                            trait_path: &implementors.trait_path,
                            crate_name: &entry.crate_name,
                            record,
                        });
                    }
                }
            }
        }
        matches
    }

    pub fn page(&self, module_path: &str) -> Option<&ModulePage> {
        let module_path = module_path.trim().trim_end_matches("::");
        self.pages.iter().find(|p| p.module_path == module_path)
    }

    pub fn trait_entries(&self) -> &[TraitImplementors] {
        &self.traits
    }

    pub fn pages(&self) -> &[ModulePage] {
        &self.pages
    }

    /// Collects every invariant violation across all scripts.
    pub fn validate(&self) -> Vec<SiteIssue> {
        let trait_issues = self.traits.iter().flat_map(|t| {
            t.table.issues().into_iter().map(|issue| SiteIssue {
                source: t.source.clone(),
                issue,
            })
        });
        let page_issues = self.pages.iter().flat_map(|p| {
            p.items.issues().into_iter().map(|issue| SiteIssue {
                source: p.source.clone(),
                issue,
            })
        });
        trait_issues.chain(page_issues).collect()
    }

    /// Ranks known trait, module and type paths by similarity to `query`.
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        let needle = last_segment(query.trim()).to_lowercase();
        let mut seen = ahash::AHashSet::new();
        let mut candidates: Vec<(String, &'static str)> = Vec::new();

        for t in &self.traits {
            candidates.push((t.trait_path.clone(), "trait"));
            for entry in t.table.iter() {
                for record in &entry.records {
                    candidates.extend(record.types.iter().map(|p| (p.clone(), "type")));
                }
            }
        }
        candidates.extend(self.pages.iter().map(|p| (p.module_path.clone(), "module")));

        let mut suggestions: Vec<Suggestion> = candidates
            .into_iter()
            .filter(|(path, kind)| seen.insert((path.clone(), *kind)))
            .map(|(path, kind)| {
                let score = jaro_winkler::similarity(
                    needle.chars(),
                    last_segment(&path).to_lowercase().chars(),
                );
                Suggestion { path, kind, score }
            })
            .collect();

        suggestions.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.path.cmp(&b.path)));
        suggestions.truncate(limit);
        suggestions
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

fn record_matches_type(record: &ImplementorRecord, query: &str) -> bool {
    if query.contains("::") {
        record.types.iter().any(|t| t == query)
            || record
                .implementing_type()
                .is_some_and(|link| link.path() == query)
    } else {
        record.types.iter().any(|t| last_segment(t) == query)
    }
}

/// Finds every navigation script under `doc_dir`, sorted by relative path.
pub fn discover(doc_dir: &Path) -> Result<Vec<ScriptFile>> {
    if !doc_dir.is_dir() {
        return Err(LoadError::NotFound {
            path: doc_dir.to_path_buf(),
        }
        .into());
    }

    let walker = WalkBuilder::new(doc_dir)
        .hidden(false)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", doc_dir.display()))?;
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(doc_dir) else {
            continue;
        };
        if let Some(target) = classify(relative) {
            files.push(ScriptFile {
                target,
                relative: relative.to_path_buf(),
            });
        }
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    tracing::debug!(root = %doc_dir.display(), scripts = files.len(), "Discovered navigation scripts");
    Ok(files)
}

/// Reads every discovered script.
pub async fn read_sources(doc_dir: &Path) -> Result<Vec<(ScriptFile, String)>> {
    let files = discover(doc_dir)?;
    let mut sources = Vec::with_capacity(files.len());
    for file in files {
        let path = doc_dir.join(&file.relative);
        let source = tokio::fs::read_to_string(&path).await.map_err(|e| LoadError::ParseError {
            path: path.clone(),
            error: e.to_string(),
        })?;
        sources.push((file, source));
    }
    Ok(sources)
}

/// Maps a path relative to the documentation root to what it documents.
pub fn classify(relative: &Path) -> Option<ScriptTarget> {
    let segments: Vec<&str> = relative
        .components()
        .map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect::<Option<_>>()?;
    let (file_name, dirs) = segments.split_last()?;

    if dirs.first() == Some(&IMPLEMENTORS_DIR) {
        let name = file_name.strip_prefix("trait.")?.strip_suffix(".js")?;
        if name.is_empty() || dirs.len() < 2 {
            return None;
        }
        let mut path = dirs[1..].join("::");
        path.push_str("::");
        path.push_str(name);
        return Some(ScriptTarget::Trait(path));
    }

    if *file_name == SIDEBAR_FILE && !dirs.is_empty() {
        return Some(ScriptTarget::Module(dirs.join("::")));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[rstest]
    #[case("implementors/core/marker/trait.Unpin.js", Some(ScriptTarget::Trait("core::marker::Unpin".into())))]
    #[case("implementors/num_traits/trait.Num.js", Some(ScriptTarget::Trait("num_traits::Num".into())))]
    #[case("rust_eterm/terms/sidebar-items.js", Some(ScriptTarget::Module("rust_eterm::terms".into())))]
    #[case("rust_eterm/sidebar-items.js", Some(ScriptTarget::Module("rust_eterm".into())))]
    #[case("sidebar-items.js", None)]
    #[case("implementors/trait.Orphan.js", None)]
    #[case("implementors/core/marker/struct.Foo.js", None)]
    #[case("rust_eterm/terms/struct.EAtom.html", None)]
    fn test_classify(#[case] path: &str, #[case] expected: Option<ScriptTarget>) {
        check!(classify(Path::new(path)) == expected);
    }

    #[rstest]
    #[case("core::marker::Unpin", "Unpin")]
    #[case("Unpin", "Unpin")]
    #[case("", "")]
    fn test_last_segment(#[case] path: &str, #[case] expected: &str) {
        check!(last_segment(path) == expected);
    }

    #[test]
    fn test_record_matches_type() {
        let record = ImplementorRecord::new(
            "impl <a class=\"trait\" href=\"t\" title=\"trait core::marker::Unpin\">Unpin</a> for <a class=\"struct\" href=\"num_bigint/struct.BigUint.html\" title=\"struct num_bigint::BigUint\">BigUint</a>",
            true,
            vec!["num_bigint::biguint::BigUint".into()],
        );
        check!(record_matches_type(&record, "BigUint"));
        check!(record_matches_type(&record, "num_bigint::biguint::BigUint"));
        // Re-exported path from the link title
        check!(record_matches_type(&record, "num_bigint::BigUint"));
        check!(!record_matches_type(&record, "BigInt"));
    }
}
