//! Helpers for the small HTML fragments rustdoc embeds in its JS tables.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::LazyLock;

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid regex")
});
static ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<a\s+([^>]*)>(.*?)</a>").expect("valid regex"));
static ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([a-zA-Z-]+)\s*=\s*"([^"]*)""#).expect("valid regex"));

/// A hyperlink found inside a display fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocLink {
    /// Item class rustdoc tags the anchor with (`trait`, `struct`, `enum`, ...).
    pub class: String,
    pub href: String,
    /// Title attribute, e.g. `struct num_bigint::BigUint`.
    pub title: String,
    /// Visible link text with markup removed.
    pub label: String,
}

impl DocLink {
    /// The fully qualified path carried by the title attribute.
    ///
    /// `"trait core::marker::Unpin"` becomes `core::marker::Unpin`; a title
    /// without a kind prefix is returned as-is.
    pub fn path(&self) -> &str {
        match self.title.split_once(' ') {
            Some((_, path)) => path.trim(),
            None => self.title.trim(),
        }
    }
}

/// Renders an HTML fragment as a single line of plain text.
pub fn plain_text(fragment: &str) -> String {
    let text = LINE_BREAK.replace_all(fragment, " ");
    let text = TAG.replace_all(&text, "");
    let text = decode_entities(&text);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decodes the character references rustdoc emits.
///
/// Unknown named references are left untouched.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    ENTITY.replace_all(text, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        let decoded = match name {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some(' '),
            _ => numeric_reference(name),
        };
        decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
    })
}

fn numeric_reference(name: &str) -> Option<char> {
    let digits = name.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

/// Collects every anchor in the fragment, in document order.
pub fn links(fragment: &str) -> Vec<DocLink> {
    ANCHOR
        .captures_iter(fragment)
        .map(|caps| {
            let mut link = DocLink {
                class: String::new(),
                href: String::new(),
                title: String::new(),
                label: plain_text(&caps[2]),
            };
            for attr in ATTRIBUTE.captures_iter(&caps[1]) {
                let value = decode_entities(&attr[2]).into_owned();
                match &attr[1] {
                    "class" => link.class = value,
                    "href" => link.href = value,
                    "title" => link.title = value,
                    _ => {}
                }
            }
            link
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    const GENERIC: &str = "impl&lt;A&gt; <a class=\"trait\" href=\"https://doc.rust-lang.org/nightly/core/marker/trait.Unpin.html\" title=\"trait core::marker::Unpin\">Unpin</a> for <a class=\"struct\" href=\"num_integer/struct.ExtendedGcd.html\" title=\"struct num_integer::ExtendedGcd\">ExtendedGcd</a>&lt;A&gt; <span class=\"where fmt-newline\">where<br>&nbsp;&nbsp;&nbsp;&nbsp;A: <a class=\"trait\" href=\"https://doc.rust-lang.org/nightly/core/marker/trait.Unpin.html\" title=\"trait core::marker::Unpin\">Unpin</a>,&nbsp;</span>";

    #[test]
    fn test_plain_text_strips_markup() {
        check!(plain_text(GENERIC) == "impl<A> Unpin for ExtendedGcd<A> where A: Unpin,");
    }

    #[rstest]
    #[case("a &amp; b", "a & b")]
    #[case("&lt;'a&gt;", "<'a>")]
    #[case("&#39;x&#x27;", "'x'")]
    #[case("&unknown;", "&unknown;")]
    #[case("no refs", "no refs")]
    fn test_decode_entities(#[case] input: &str, #[case] expected: &str) {
        check!(decode_entities(input) == expected);
    }

    #[test]
    fn test_links_in_document_order() {
        let found = links(GENERIC);
        check!(found.len() == 3);
        check!(found[0].class == "trait");
        check!(found[0].path() == "core::marker::Unpin");
        check!(found[1].class == "struct");
        check!(found[1].href == "num_integer/struct.ExtendedGcd.html");
        check!(found[1].label == "ExtendedGcd");
        check!(found[1].path() == "num_integer::ExtendedGcd");
    }

    #[test]
    fn test_links_empty_fragment() {
        check!(links("impl Send for Foo").is_empty());
    }
}
