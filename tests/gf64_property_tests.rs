//! Property-based tests for GF(2^64) field arithmetic
//!
//! These tests use proptest to validate the field laws with randomly
//! generated inputs, across every multiplication strategy, ensuring the
//! strategies are interchangeable bit for bit.

use gf64rs::{FieldOptions, GaloisField64, MultType, NO_INVERSE};
use proptest::prelude::*;

fn shift_field() -> GaloisField64 {
    GaloisField64::new(FieldOptions::new(MultType::Shift)).expect("shift field")
}

/// The cheap-to-construct strategies used for per-case cross checks; the
/// heavyweight table strategies get their own deterministic tests.
fn quick_strategies() -> Vec<(&'static str, GaloisField64)> {
    vec![
        ("shift", shift_field()),
        (
            "bytwo_p",
            GaloisField64::new(FieldOptions::new(MultType::BytwoP)).expect("bytwo_p"),
        ),
        (
            "bytwo_b",
            GaloisField64::new(FieldOptions::new(MultType::BytwoB)).expect("bytwo_b"),
        ),
        (
            "split_4_64",
            GaloisField64::new(FieldOptions::new(MultType::SplitTable).args(4, 64)).expect("split_4_64"),
        ),
        (
            "group_4_8",
            GaloisField64::new(FieldOptions::new(MultType::Group).args(4, 8)).expect("group_4_8"),
        ),
        (
            "group_4_4",
            GaloisField64::new(FieldOptions::new(MultType::Group).args(4, 4)).expect("group_4_4"),
        ),
        ("default", GaloisField64::new(FieldOptions::default()).expect("default")),
    ]
}

proptest! {
    #[test]
    fn prop_multiplication_commutative(a in any::<u64>(), b in any::<u64>()) {
        let gf = shift_field();
        prop_assert_eq!(gf.multiply(a, b), gf.multiply(b, a));
    }

    #[test]
    fn prop_multiplication_associative(a in any::<u64>(), b in any::<u64>(), c in any::<u64>()) {
        let gf = shift_field();
        prop_assert_eq!(gf.multiply(gf.multiply(a, b), c), gf.multiply(a, gf.multiply(b, c)));
    }

    #[test]
    fn prop_multiplication_distributes_over_xor(a in any::<u64>(), b in any::<u64>(), c in any::<u64>()) {
        let gf = shift_field();
        prop_assert_eq!(gf.multiply(a, b ^ c), gf.multiply(a, b) ^ gf.multiply(a, c));
    }

    #[test]
    fn prop_identities(a in any::<u64>()) {
        let gf = shift_field();
        prop_assert_eq!(gf.multiply(a, 1), a);
        prop_assert_eq!(gf.multiply(a, 0), 0);
    }

    #[test]
    fn prop_inverse_multiplies_to_one(a in 1u64..) {
        let gf = shift_field();
        let inv = gf.inverse(a);
        prop_assert!(inv != NO_INVERSE);
        prop_assert_eq!(gf.multiply(a, inv), 1);
    }

    #[test]
    fn prop_divide_is_multiply_by_inverse(a in any::<u64>(), b in 1u64..) {
        let gf = shift_field();
        let q = gf.divide(a, b);
        prop_assert_eq!(gf.multiply(q, b), a);
    }

    #[test]
    fn prop_strategies_agree_on_products(a in any::<u64>(), b in any::<u64>()) {
        let reference = shift_field().multiply(a, b);
        for (name, gf) in quick_strategies() {
            prop_assert_eq!(gf.multiply(a, b), reference, "strategy {}", name);
        }
    }

    #[test]
    fn prop_strategies_agree_on_inverses(a in 1u64..) {
        let reference = shift_field().inverse(a);
        for (name, gf) in quick_strategies() {
            prop_assert_eq!(gf.inverse(a), reference, "strategy {}", name);
        }
    }

    /// Laws hold for a composite field too, even though its element
    /// representation differs from the polynomial-basis strategies.
    #[test]
    fn prop_composite_field_laws(a in any::<u64>(), b in any::<u64>(), c in any::<u64>()) {
        let gf = GaloisField64::with_base_field(
            FieldOptions::new(MultType::Composite).args(2, 0),
            Box::new(gf64rs::ShiftBase32::default()),
        )
        .expect("composite field");

        prop_assert_eq!(gf.multiply(a, b), gf.multiply(b, a));
        prop_assert_eq!(gf.multiply(gf.multiply(a, b), c), gf.multiply(a, gf.multiply(b, c)));
        prop_assert_eq!(gf.multiply(a, b ^ c), gf.multiply(a, b) ^ gf.multiply(a, c));
        prop_assert_eq!(gf.multiply(a, 1), a);
        if a != 0 {
            prop_assert_eq!(gf.multiply(a, gf.inverse(a)), 1);
        }
    }
}
