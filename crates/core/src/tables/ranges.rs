//! Inclusive ranges with optional bounds

/// An inclusive range where either bound may be absent, meaning unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InclusiveRange<T> {
    min: Option<T>,
    max: Option<T>,
}

impl<T: PartialOrd + Copy> InclusiveRange<T> {
    /// Create a range from optional bounds.
    pub const fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    /// A range containing every value.
    pub const fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// Lower bound, if any.
    pub const fn min(&self) -> Option<T> {
        self.min
    }

    /// Upper bound, if any.
    pub const fn max(&self) -> Option<T> {
        self.max
    }

    /// True when neither bound is set.
    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Whether `value` lies inside the range, bounds included.
    pub fn contains(&self, value: T) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }

    /// Whether the two ranges share at least one value.
    pub fn overlaps(&self, other: &Self) -> bool {
        let ends_before = matches!((self.max, other.min), (Some(max), Some(min)) if max < min);
        let starts_after = matches!((self.min, other.max), (Some(min), Some(max)) if min > max);

        !ends_before && !starts_after
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn contains_includes_both_bounds() {
        let range = InclusiveRange::new(Some(10_u32), Some(24));

        assert!(range.contains(10));
        assert!(range.contains(24));
        assert!(!range.contains(9));
        assert!(!range.contains(25));
    }

    #[test]
    fn missing_bounds_are_open() {
        let from = InclusiveRange::new(Some(Decimal::from(32)), None);
        let upto = InclusiveRange::new(None, Some(Decimal::from(6)));

        assert!(from.contains(Decimal::from(1_000)));
        assert!(!from.contains(Decimal::new(3199, 2)));
        assert!(upto.contains(Decimal::ZERO));
        assert!(InclusiveRange::<u32>::unbounded().contains(u32::MAX));
    }

    #[test]
    fn overlaps_detects_shared_values() {
        let low = InclusiveRange::new(Some(0_u32), Some(10));
        let touching = InclusiveRange::new(Some(10_u32), Some(20));
        let disjoint = InclusiveRange::new(Some(11_u32), None);

        assert!(low.overlaps(&touching));
        assert!(!low.overlaps(&disjoint));
        assert!(disjoint.overlaps(&InclusiveRange::unbounded()));
    }
}
