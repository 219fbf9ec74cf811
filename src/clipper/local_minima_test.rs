use crate::clipper::local_minima::{LocalMinimum, MinimaList};

#[cfg(test)]
mod local_minima_tests {
    use super::*;

    #[test]
    fn test_new() {
        let minima = MinimaList::new();

        assert!(minima.is_empty());
        assert!(!minima.is_pending());
    }

    #[test]
    fn test_sort_descending_by_y() {
        let mut minima = MinimaList::new();

        minima.push(LocalMinimum::new(10, 1, 2));
        minima.push(LocalMinimum::new(30, 3, 4));
        minima.push(LocalMinimum::new(20, 5, 6));
        minima.sort();

        let ys: Vec<i64> = minima.iter().map(|m| m.y).collect();

        assert_eq!(ys, vec![30, 20, 10]);
    }

    #[test]
    fn test_equal_y_keeps_insertion_order() {
        let mut minima = MinimaList::new();

        minima.push(LocalMinimum::new(10, 1, 2));
        minima.push(LocalMinimum::new(10, 3, 4));
        minima.sort();

        assert_eq!(minima.pop(10).map(|m| m.left_bound), Some(1));
        assert_eq!(minima.pop(10).map(|m| m.left_bound), Some(3));
        assert!(minima.pop(10).is_none());
    }

    #[test]
    fn test_pop_only_matches_current_y() {
        let mut minima = MinimaList::new();

        minima.push(LocalMinimum::new(5, 1, 0));
        minima.sort();

        assert!(minima.pop(6).is_none());
        assert!(minima.is_pending());

        let minimum = minima.pop(5).unwrap();

        assert!(minimum.has_left());
        assert!(!minimum.has_right());
        assert!(!minima.is_pending());

        minima.rewind();

        assert!(minima.is_pending());
    }

    #[test]
    fn test_clear() {
        let mut minima = MinimaList::new();

        minima.push(LocalMinimum::new(1, 1, 2));
        minima.clear();

        assert!(minima.is_empty());
        assert!(!minima.is_pending());
    }
}
