pub const DEFAULT_STARS: usize = 5;

/// State behind the star-rating control: a row of `stars` buttons where the
/// first `value` are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarRating {
    stars: usize,
    value: i64,
}

impl Default for StarRating {
    fn default() -> Self {
        Self::new(DEFAULT_STARS)
    }
}

impl StarRating {
    pub fn new(stars: usize) -> Self {
        Self { stars, value: 0 }
    }

    pub fn stars(&self) -> usize {
        self.stars
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// Used when an existing meal is opened for editing.
    pub fn set_value(&mut self, value: i64) {
        self.value = value;
    }

    /// Tapping star `index` (0-based) rates `index + 1`. Taps outside the
    /// row are ignored and return `false`.
    pub fn tap(&mut self, index: usize) -> bool {
        if index >= self.stars {
            return false;
        }
        self.value = index as i64 + 1;
        true
    }

    pub fn is_filled(&self, index: usize) -> bool {
        (index as i64) < self.value
    }

    pub fn filled(&self) -> Vec<bool> {
        (0..self.stars).map(|i| self.is_filled(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let r = StarRating::default();
        assert_eq!(r.value(), 0);
        assert_eq!(r.filled(), vec![false; 5]);
    }

    #[test]
    fn tap_fills_up_to_tapped_star() {
        let mut r = StarRating::default();
        assert!(r.tap(2));
        assert_eq!(r.value(), 3);
        assert_eq!(r.filled(), vec![true, true, true, false, false]);

        assert!(r.tap(0));
        assert_eq!(r.value(), 1);
    }

    #[test]
    fn tap_outside_row_is_ignored() {
        let mut r = StarRating::new(3);
        r.tap(1);
        assert!(!r.tap(3));
        assert_eq!(r.value(), 2);
    }

    #[test]
    fn value_above_star_count_fills_all() {
        let mut r = StarRating::default();
        r.set_value(9);
        assert!(r.filled().iter().all(|f| *f));
    }
}
