//! Property-based tests for the feature-vector merge algebra.
//!
//! These verify the laws the extractor relies on: commutativity and
//! associativity (sibling visitation order must never change a result),
//! the zero vector as identity, and non-vector visit values merging as
//! empty contributions.

use clonemap::{FeatureVector, VisitValue, TOKEN_KIND_COUNT};
use proptest::prelude::*;

fn feature_vector() -> impl Strategy<Value = FeatureVector> {
    prop::collection::vec(0u32..100, TOKEN_KIND_COUNT).prop_map(|cells| {
        let cells: [u32; TOKEN_KIND_COUNT] = cells.try_into().expect("fixed length");
        FeatureVector::from(cells)
    })
}

proptest! {
    #[test]
    fn merge_is_commutative(a in feature_vector(), b in feature_vector()) {
        prop_assert_eq!(
            FeatureVector::merge([a.into(), b.into()]),
            FeatureVector::merge([b.into(), a.into()])
        );
    }

    #[test]
    fn merge_is_associative(
        a in feature_vector(),
        b in feature_vector(),
        c in feature_vector(),
    ) {
        let left = FeatureVector::merge([
            FeatureVector::merge([a.into(), b.into()]).into(),
            c.into(),
        ]);
        let right = FeatureVector::merge([
            a.into(),
            FeatureVector::merge([b.into(), c.into()]).into(),
        ]);
        prop_assert_eq!(left, right);
    }

    #[test]
    fn zero_is_the_merge_identity(a in feature_vector()) {
        prop_assert_eq!(
            FeatureVector::merge([a.into(), FeatureVector::zero().into()]),
            a
        );
        prop_assert_eq!(FeatureVector::merge([a.into()]), a);
    }

    #[test]
    fn non_vector_values_merge_as_empty(a in feature_vector(), name in "[a-z_][a-z0-9_]{0,7}") {
        prop_assert_eq!(
            FeatureVector::merge([VisitValue::Name(name), a.into(), VisitValue::Empty]),
            a
        );
    }
}

#[test]
fn merge_of_no_vectors_is_the_zero_vector() {
    assert_eq!(FeatureVector::merge([]), FeatureVector::zero());
    assert!(FeatureVector::merge([VisitValue::Empty]).is_zero());
}
