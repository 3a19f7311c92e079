mod common;

use assert2::{check, let_assert};
use common::{TERMS_SIDEBAR, fixture_source};
use docsite_index::{SidebarItems, SidebarKind};
use rstest::rstest;

fn terms_page() -> SidebarItems {
    let source = fixture_source(TERMS_SIDEBAR);
    let_assert!(Ok(items) = SidebarItems::parse(&source));
    items
}

fn names(items: &SidebarItems, kind: SidebarKind) -> Vec<&str> {
    items.items(kind).iter().map(|e| e.name.as_str()).collect()
}

#[test]
fn test_exactly_the_five_kinds() {
    let items = terms_page();
    check!(
        items.kinds().collect::<Vec<_>>()
            == vec![
                SidebarKind::Constant,
                SidebarKind::Enum,
                SidebarKind::Module,
                SidebarKind::Struct,
                SidebarKind::Trait,
            ]
    );
    for kind in items.kinds() {
        check!(!items.items(kind).is_empty());
    }
}

#[test]
fn test_single_constant() {
    let items = terms_page();
    let constants = items.items(SidebarKind::Constant);
    check!(constants.len() == 1);
    check!(constants[0].name == "ETF_VERSION");
    check!(constants[0].description.starts_with("This is the code of the start of a message."));
}

#[rstest]
#[case(SidebarKind::Enum, &["DistHeaderTag", "TermTag"])]
#[case(SidebarKind::Module, &["decode"])]
#[case(SidebarKind::Trait, &["ETerm"])]
#[case(
    SidebarKind::Struct,
    &["EAtom", "EExport", "EList", "EMap", "ENil", "ENonProperList", "EPid", "EPort", "EString", "ETuple"]
)]
fn test_entries_match_script(#[case] kind: SidebarKind, #[case] expected: &[&str]) {
    let items = terms_page();
    check!(names(&items, kind) == expected);
}

#[test]
fn test_empty_descriptions_preserved() {
    let items = terms_page();
    let_assert!(Some(decode) = items.find("decode"));
    check!(decode.kind == SidebarKind::Module);
    check!(decode.description.is_empty());

    let_assert!(Some(map) = items.find("EMap"));
    check!(map.description == "Describes an Erlang Map");
}

#[test]
fn test_names_unique_within_kind() {
    check!(terms_page().validate().is_ok());
}

#[test]
fn test_render_round_trip_matches_source() {
    let source = fixture_source(TERMS_SIDEBAR);
    let items = terms_page();
    check!(items.render() == source.trim_end());
    check!(SidebarItems::parse(&items.render()).unwrap() == items);
}
