//! Golden-output tests for the generated Java sources.
//!
//! The `@Generated` timestamp and crate version vary between runs and
//! releases; both sides are masked before comparison.

mod support;

use support::*;
use throwgen::discovery::SnapshotSource;

const ORDER_NOT_FOUND: &str = include_str!("golden/OrderNotFound.java");
const ORDERS_IMPL: &str = include_str!("golden/OrdersImpl.java");
const ORDER_LOCKED: &str = include_str!("golden/OrderLocked.java");

#[test]
fn standard_exception_matches_golden() {
    let source = SnapshotSource::from_yaml_str(ORDERS_SNAPSHOT).unwrap();
    let outcome = run_source(&source, Default::default(), Some(header_at(1, 10, 0, 0)));

    let body = outcome.sink.get("billing.OrderNotFound").unwrap();
    assert_text_eq(ORDER_NOT_FOUND, &mask(body));
}

#[test]
fn implementation_matches_golden() {
    let source = SnapshotSource::from_yaml_str(ORDERS_SNAPSHOT).unwrap();
    let outcome = run_source(&source, Default::default(), Some(header_at(1, 10, 0, 0)));

    let body = outcome.sink.get("billing.OrdersImpl").unwrap();
    assert_text_eq(ORDERS_IMPL, &mask(body));
}

#[test]
fn variadic_exception_matches_golden() {
    let outcome = run_declarations(
        vec![interface("billing", "Locks", &["OrderLocked"], true)],
        Default::default(),
    );

    let body = outcome.sink.get("billing.OrderLocked").unwrap();
    // Never carries the header, so nothing to mask.
    assert_text_eq(ORDER_LOCKED, body);
}

#[test]
fn unmasked_header_carries_the_run_timestamp() {
    let source = SnapshotSource::from_yaml_str(ORDERS_SNAPSHOT).unwrap();
    let outcome = run_source(&source, Default::default(), Some(header_at(9, 8, 7, 6)));

    let body = outcome.sink.get("billing.OrdersImpl").unwrap();
    assert!(body.contains(r#"date = "09/06/2026 08:07:06""#));
    assert!(body.contains(&format!("version {};", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn disabled_header_leaves_no_annotation() {
    let source = SnapshotSource::from_yaml_str(ORDERS_SNAPSHOT).unwrap();
    let outcome = run_source(&source, without_header(), None);

    let exception = outcome.sink.get("billing.OrderNotFound").unwrap();
    assert!(!exception.contains("Generated"));

    let expected: String = ORDERS_IMPL
        .lines()
        .filter(|line| !line.starts_with("@javax.annotation.processing.Generated"))
        .map(|line| format!("{line}\n"))
        .collect();
    assert_text_eq(&expected, outcome.sink.get("billing.OrdersImpl").unwrap());
}
