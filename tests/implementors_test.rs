mod common;

use assert2::{check, let_assert};
use common::{UNPIN_SCRIPT, fixture_source};
use docsite_index::{ImplementorsScript, ImplementorsTable, TableIssue};
use rstest::rstest;

fn unpin_table() -> ImplementorsTable {
    let source = fixture_source(UNPIN_SCRIPT);
    let_assert!(Ok(script) = ImplementorsScript::parse(&source));
    script.table
}

#[test]
fn test_fixture_crates_in_generator_order() {
    let table = unpin_table();
    check!(
        table.crates().collect::<Vec<_>>()
            == vec!["num_bigint", "num_integer", "num_traits", "rust_eterm"]
    );
    check!(table.record_count() == 22);
}

#[rstest]
#[case("num_bigint", 4)]
#[case("num_integer", 2)]
#[case("num_traits", 2)]
#[case("rust_eterm", 14)]
fn test_fixture_record_counts(#[case] crate_name: &str, #[case] expected: usize) {
    let table = unpin_table();
    check!(table.get(crate_name).map(<[_]>::len) == Some(expected));
}

#[test]
fn test_crate_key_matches_every_type_path() {
    let table = unpin_table();
    for entry in table.iter() {
        for record in &entry.records {
            check!(!record.types.is_empty());
            for path in &record.types {
                check!(path.split("::").next() == Some(entry.crate_name.as_str()));
            }
        }
    }
    check!(table.validate().is_ok());
}

#[test]
fn test_every_record_is_a_synthetic_unpin_impl() {
    let table = unpin_table();
    for entry in table.iter() {
        for record in &entry.records {
            check!(record.synthetic);
            let_assert!(Some(link) = record.trait_link());
            check!(link.path() == "core::marker::Unpin");
        }
    }
}

#[rstest]
#[case("num_integer", 0, "impl<A> Unpin for ExtendedGcd<A> where A: Unpin,")]
#[case("rust_eterm", 5, "impl<'a> Unpin for EList<'a>")]
#[case("num_bigint", 1, "impl Unpin for BigUint")]
fn test_plain_text(#[case] crate_name: &str, #[case] index: usize, #[case] expected: &str) {
    let table = unpin_table();
    let record = &table.get(crate_name).unwrap()[index];
    check!(record.plain_text() == expected);
}

#[test]
fn test_implementing_type_uses_reexported_path() {
    let table = unpin_table();
    let record = &table.get("num_bigint").unwrap()[1];
    check!(record.types == vec!["num_bigint::biguint::BigUint".to_string()]);
    let_assert!(Some(link) = record.implementing_type());
    check!(link.path() == "num_bigint::BigUint");
    check!(link.href == "num_bigint/struct.BigUint.html");
}

#[test]
fn test_render_round_trip_keeps_table() {
    let table = unpin_table();
    let rendered = ImplementorsScript::new(table.clone()).render();
    let_assert!(Ok(reparsed) = ImplementorsScript::parse(&rendered));
    check!(reparsed.table == table);
}

#[test]
fn test_parsing_twice_is_identical() {
    let source = fixture_source(UNPIN_SCRIPT);
    let first = ImplementorsScript::parse(&source).unwrap();
    let second = ImplementorsScript::parse(&source).unwrap();
    check!(first == second);
}

#[test]
fn test_misfiled_record_is_reported() {
    let mut table = unpin_table();
    let mut records = table.get("num_traits").unwrap().to_vec();
    records.push(table.get("num_bigint").unwrap()[0].clone());
    table.insert("num_traits", records);

    let_assert!(Err(err) = table.validate());
    check!(
        err.issues
            == vec![TableIssue::CrateMismatch {
                crate_name: "num_traits".into(),
                type_path: "num_bigint::ParseBigIntError".into(),
            }]
    );
}
