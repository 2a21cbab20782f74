//! Sibling ordering shared by the converter and the HTML generator.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SiblingKey {
    pub original_order: Option<usize>,
    pub z_index: f64,
    pub y: f64,
}

/// Sort siblings in place.
///
/// When any sibling carries an original order, that order is authoritative
/// (missing entries sort last). Otherwise siblings sort by `(z_index, y)`.
/// Keys that cannot be compared leave the current order untouched.
/// Returns `false` when the sort was skipped.
pub fn sort_siblings<T>(items: &mut [T], key: impl Fn(&T) -> SiblingKey) -> bool {
    if items.len() <= 1 {
        return true;
    }

    if items.iter().any(|item| key(item).original_order.is_some()) {
        items.sort_by_key(|item| key(item).original_order.unwrap_or(usize::MAX));
        return true;
    }

    if items.iter().map(&key).any(|k| k.z_index.is_nan() || k.y.is_nan()) {
        return false;
    }

    items.sort_by(|a, b| {
        let (ka, kb) = (key(a), key(b));
        ka.z_index
            .partial_cmp(&kb.z_index)
            .unwrap_or(Ordering::Equal)
            .then(ka.y.partial_cmp(&kb.y).unwrap_or(Ordering::Equal))
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(order: Option<usize>, z: f64, y: f64) -> SiblingKey {
        SiblingKey {
            original_order: order,
            z_index: z,
            y,
        }
    }

    #[test]
    fn original_order_overrides_position() {
        let mut items = vec![
            ("b", key(Some(1), 0.0, 0.0)),
            ("none", key(None, 0.0, -10.0)),
            ("a", key(Some(0), 5.0, 100.0)),
        ];
        assert!(sort_siblings(&mut items, |item| item.1));
        let names: Vec<&str> = items.iter().map(|item| item.0).collect();
        assert_eq!(names, vec!["a", "b", "none"]);
    }

    #[test]
    fn falls_back_to_z_index_then_y() {
        let mut items = vec![
            ("low", key(None, 0.0, 50.0)),
            ("top", key(None, 1.0, 0.0)),
            ("high", key(None, 0.0, 10.0)),
        ];
        sort_siblings(&mut items, |item| item.1);
        let names: Vec<&str> = items.iter().map(|item| item.0).collect();
        assert_eq!(names, vec!["high", "low", "top"]);
    }

    #[test]
    fn incomparable_keys_keep_insertion_order() {
        let mut items = vec![
            ("first", key(None, f64::NAN, 10.0)),
            ("second", key(None, 0.0, 0.0)),
        ];
        assert!(!sort_siblings(&mut items, |item| item.1));
        assert_eq!(items[0].0, "first");
    }
}
