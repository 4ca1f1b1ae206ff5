//! Structural document equality.
//!
//! Two documents are equal iff they decode to the same key/value structure
//! recursively: arrays are order-significant, document maps are not. Scalar
//! comparison defers to `Bson`'s `PartialEq`, so NaN-bearing fields never
//! compare equal and are surfaced as divergent.

use mongodb::bson::{Bson, Document};

/// Compare two documents field-for-field, ignoring field order.
pub fn documents_equal(a: &Document, b: &Document) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .all(|(key, value)| b.get(key).is_some_and(|other| values_equal(value, other)))
}

/// Compare two BSON values structurally.
pub fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (a, b) {
        (Bson::Document(a), Bson::Document(b)) => documents_equal(a, b),
        (Bson::Array(a), Bson::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_field_order_is_ignored() {
        let a = doc! { "x": 1, "y": "two" };
        let b = doc! { "y": "two", "x": 1 };
        assert!(documents_equal(&a, &b));
    }

    #[test]
    fn test_array_order_is_significant() {
        let a = doc! { "tags": ["a", "b"] };
        let b = doc! { "tags": ["b", "a"] };
        assert!(!documents_equal(&a, &b));
    }

    #[test]
    fn test_nested_documents_compared_recursively() {
        let a = doc! { "meta": { "created": 1, "by": "svc" }, "n": 2 };
        let b = doc! { "n": 2, "meta": { "by": "svc", "created": 1 } };
        assert!(documents_equal(&a, &b));

        let c = doc! { "n": 2, "meta": { "by": "svc", "created": 9 } };
        assert!(!documents_equal(&a, &c));
    }

    #[test]
    fn test_documents_inside_arrays() {
        let a = doc! { "items": [{ "sku": "x", "qty": 1 }] };
        let b = doc! { "items": [{ "qty": 1, "sku": "x" }] };
        assert!(documents_equal(&a, &b));
    }

    #[test]
    fn test_missing_and_extra_fields_differ() {
        let a = doc! { "x": 1 };
        let b = doc! { "x": 1, "y": 2 };
        assert!(!documents_equal(&a, &b));
        assert!(!documents_equal(&b, &a));
    }

    #[test]
    fn test_scalar_type_mismatch_differs() {
        let a = doc! { "x": 1_i32 };
        let b = doc! { "x": "1" };
        assert!(!documents_equal(&a, &b));
    }

    #[test]
    fn test_nan_fields_never_match() {
        let a = doc! { "x": f64::NAN };
        let b = doc! { "x": f64::NAN };
        assert!(!documents_equal(&a, &b));
    }
}
