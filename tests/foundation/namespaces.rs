//! Integration tests for namespaces
//!
//! Tests name ordering, snapshots, and structural sharing.

use adder_foundation::Namespace;
use proptest::prelude::*;

// =============================================================================
// Basics
// =============================================================================

#[test]
fn empty_namespace() {
    let ns: Namespace<i64> = Namespace::new();
    assert!(ns.is_empty());
    assert_eq!(ns.len(), 0);
    assert!(ns.get("x").is_none());
}

#[test]
fn insert_get_remove() {
    let mut ns = Namespace::new();
    assert_eq!(ns.insert("x", 1), None);
    assert_eq!(ns.insert("x", 2), Some(1));
    assert_eq!(ns.get("x"), Some(&2));
    assert!(ns.contains("x"));
    assert_eq!(ns.remove("x"), Some(2));
    assert!(!ns.contains("x"));
}

#[test]
fn names_are_in_byte_order() {
    let ns: Namespace<i64> = [("b", 1), ("B", 2), ("a", 3), ("_x", 4)].into_iter().collect();
    assert_eq!(ns.names().collect::<Vec<_>>(), ["B", "_x", "a", "b"]);
}

// =============================================================================
// Snapshots
// =============================================================================

#[test]
fn snapshot_is_isolated() {
    let mut ns: Namespace<i64> = [("x", 1)].into_iter().collect();
    let snapshot = ns.snapshot();
    ns.insert("y", 2);
    ns.insert("x", 10);

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.get("x"), Some(&1));
    assert_eq!(ns.get("x"), Some(&10));
}

#[test]
fn large_snapshot() {
    let mut ns = Namespace::new();
    for i in 0..1000 {
        ns.insert(format!("name{i}"), i);
    }
    let snapshot = ns.snapshot();
    ns.remove("name0");
    assert_eq!(snapshot.len(), 1000);
    assert_eq!(ns.len(), 999);
}

proptest! {
    #[test]
    fn names_sorted_and_unique(keys in prop::collection::vec("[a-zA-Z_][a-zA-Z0-9_]{0,6}", 0..40)) {
        let ns: Namespace<usize> = keys.iter().map(|k| (k.as_str(), 0)).collect();
        let names: Vec<&str> = ns.names().collect();
        prop_assert!(names.windows(2).all(|w| w[0] < w[1]));
        for key in &keys {
            prop_assert!(ns.contains(key));
        }
    }
}
