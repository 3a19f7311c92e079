//! Command execution and output formatting for the CLI.

use crate::cache;
use crate::cli::{Cli, Commands};
use crate::config::{Config, DOC_DIR_ENV};
use crate::error::Result;
use crate::host::Script;
use crate::site::DocSite;
use anyhow::Context;
use serde_json::json;
use std::fmt::Write as _;
use std::path::Path;

const SUGGESTION_LIMIT: usize = 5;

/// Rendered command output and whether the command succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub text: String,
    pub success: bool,
}

impl Output {
    fn ok(text: String) -> Self {
        Self {
            text,
            success: true,
        }
    }

    fn failed(text: String) -> Self {
        Self {
            text,
            success: false,
        }
    }
}

/// Resolves configuration, loads the site when the command needs it and runs
/// the command.
pub async fn execute(cli: &Cli, config: &Config) -> Result<Output> {
    if let Commands::Dump { file } = &cli.command {
        return dump(file, cli.json).await;
    }

    let env = std::env::var(DOC_DIR_ENV).ok();
    let doc_dir = config.doc_dir(cli.doc_dir.as_deref(), env.as_deref());
    let cache_dir = if cli.no_cache {
        None
    } else {
        config.cache_dir()
    };

    let site = match cache_dir {
        Some(cache_dir) => cache::load_or_scan(&doc_dir, &cache_dir).await?,
        None => DocSite::scan(&doc_dir).await?,
    };
    run_query(&site, &cli.command, cli.json)
}

/// Runs a query command against an indexed site.
pub fn run_query(site: &DocSite, command: &Commands, as_json: bool) -> Result<Output> {
    match command {
        Commands::Implementors { trait_path } => Ok(implementors(site, trait_path, as_json)),
        Commands::Traits { type_path } => Ok(traits(site, type_path, as_json)),
        Commands::Page { module_path } => Ok(page(site, module_path, as_json)),
        Commands::Summary => Ok(summary(site, as_json)),
        Commands::Check => Ok(check(site, as_json)),
        Commands::Suggest { query, limit } => Ok(suggest(site, query, *limit, as_json)),
        Commands::Dump { .. } => anyhow::bail!("dump does not operate on a site"),
    }
}

fn implementors(site: &DocSite, query: &str, as_json: bool) -> Output {
    let Some(found) = site.implementors_of(query) else {
        return not_found(site, "trait", query);
    };

    if as_json {
        return Output::ok(to_json(&json!({
            "trait": found.trait_path,
            "source": found.source,
            "implementors": found.table,
        })));
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} crates, {} impls)",
        found.trait_path,
        found.table.len(),
        found.table.record_count()
    );
    for entry in found.table.iter() {
        let _ = writeln!(out, "\n{}", entry.crate_name);
        for record in &entry.records {
            let marker = if record.synthetic { "  [auto]" } else { "" };
            let _ = writeln!(out, "  {}{}", record.plain_text(), marker);
        }
    }
    Output::ok(out)
}

fn traits(site: &DocSite, query: &str, as_json: bool) -> Output {
    let matches = site.traits_implemented_by(query);
    if matches.is_empty() {
        return not_found(site, "type", query);
    }

    if as_json {
        return Output::ok(to_json(&matches));
    }

    let mut out = String::new();
    for m in &matches {
        let types = m.record.types.join(", ");
        let _ = writeln!(out, "{}  ({})", m.trait_path, types);
    }
    Output::ok(out)
}

fn page(site: &DocSite, module_path: &str, as_json: bool) -> Output {
    let Some(page) = site.page(module_path) else {
        return not_found(site, "module", module_path);
    };

    if as_json {
        return Output::ok(to_json(&page.items));
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", page.module_path);
    for group in page.items.groups() {
        let _ = writeln!(out, "\n{}", group.kind);
        for entry in &group.entries {
            if entry.description.is_empty() {
                let _ = writeln!(out, "  {}", entry.name);
            } else {
                let _ = writeln!(out, "  {} - {}", entry.name, entry.description);
            }
        }
    }
    Output::ok(out)
}

fn summary(site: &DocSite, as_json: bool) -> Output {
    let crates: Vec<&str> = site.crates().into_iter().collect();
    let traits: Vec<&str> = site.traits().collect();
    let modules: Vec<&str> = site.modules().collect();

    if as_json {
        return Output::ok(to_json(&json!({
            "root": site.root(),
            "crates": crates,
            "traits": traits,
            "modules": modules,
        })));
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", site.root().display());
    for (title, list) in [("crates", &crates), ("traits", &traits), ("modules", &modules)] {
        let _ = writeln!(out, "\n{} ({})", title, list.len());
        for name in list.iter() {
            let _ = writeln!(out, "  {}", name);
        }
    }
    Output::ok(out)
}

fn check(site: &DocSite, as_json: bool) -> Output {
    let issues = site.validate();
    let text = if as_json {
        to_json(&issues)
    } else if issues.is_empty() {
        format!(
            "ok: {} implementors scripts, {} sidebar scripts\n",
            site.trait_entries().len(),
            site.pages().len()
        )
    } else {
        let mut out = String::new();
        for issue in &issues {
            let _ = writeln!(out, "{}: {}", issue.source.display(), issue.issue);
        }
        out
    };

    Output {
        text,
        success: issues.is_empty(),
    }
}

fn suggest(site: &DocSite, query: &str, limit: usize, as_json: bool) -> Output {
    let suggestions = site.suggest(query, limit);
    if as_json {
        return Output::ok(to_json(&suggestions));
    }
    let mut out = String::new();
    for s in &suggestions {
        let _ = writeln!(out, "{:.3}  {:<6}  {}", s.score, s.kind, s.path);
    }
    Output::ok(out)
}

async fn dump(file: &Path, as_json: bool) -> Result<Output> {
    let source = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let script =
        Script::parse(&source).with_context(|| format!("Failed to parse {}", file.display()))?;

    let text = match (&script, as_json) {
        (Script::Implementors(s), true) => to_json(&s.table),
        (Script::Sidebar(items), true) => to_json(items),
        (_, false) => {
            let mut rendered = script.render();
            rendered.push('\n');
            rendered
        }
    };
    Ok(Output::ok(text))
}

fn not_found(site: &DocSite, what: &str, query: &str) -> Output {
    let mut out = format!("No {} matching '{}'\n", what, query);
    let suggestions = site.suggest(query, SUGGESTION_LIMIT);
    if !suggestions.is_empty() {
        out.push_str("Did you mean:\n");
        for s in suggestions {
            let _ = writeln!(out, "  {} ({})", s.path, s.kind);
        }
    }
    Output::failed(out)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    // Every type printed here serializes to a JSON value without failing.
    let mut text = serde_json::to_string_pretty(value).unwrap_or_default();
    text.push('\n');
    text
}
