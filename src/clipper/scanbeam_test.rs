use crate::clipper::scanbeam::Scanbeam;

#[cfg(test)]
mod scanbeam_tests {
    use super::*;

    #[test]
    fn test_pops_largest_first_and_collapses_duplicates() {
        let mut scanbeam = Scanbeam::new();

        scanbeam.insert(5);
        scanbeam.insert(3);
        scanbeam.insert(7);
        scanbeam.insert(3);
        scanbeam.insert(7);

        assert_eq!(scanbeam.pop(), Some(7));
        assert_eq!(scanbeam.pop(), Some(5));
        assert_eq!(scanbeam.pop(), Some(3));
        assert!(scanbeam.is_empty());
    }

    #[test]
    fn test_pop_empty() {
        let mut scanbeam = Scanbeam::new();

        assert_eq!(scanbeam.pop(), None);
    }

    #[test]
    fn test_clear() {
        let mut scanbeam = Scanbeam::new();

        scanbeam.insert(1);
        scanbeam.insert(2);
        scanbeam.clear();

        assert!(scanbeam.is_empty());
    }

    #[test]
    fn test_negative_positions() {
        let mut scanbeam = Scanbeam::default();

        scanbeam.insert(-10);
        scanbeam.insert(0);
        scanbeam.insert(-5);

        assert_eq!(scanbeam.pop(), Some(0));
        assert_eq!(scanbeam.pop(), Some(-5));
        assert_eq!(scanbeam.pop(), Some(-10));
        assert_eq!(scanbeam.pop(), None);
    }
}
