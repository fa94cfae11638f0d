//! Numeric repeat-count prefix.

/// Digits typed ahead of a chord, accumulated as a decimal number.
///
/// Zero means no count was typed. A leading `0` is never accepted, so a bare
/// `0` stays available as an ordinary key binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountPrefix(u32);

impl CountPrefix {
    pub fn value(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether `key` would be taken as the next digit of the count.
    pub fn accepts(self, key: char) -> bool {
        match key.to_digit(10) {
            Some(0) => self.0 > 0,
            Some(_) => true,
            None => false,
        }
    }

    /// Append a digit. Returns `false` and leaves the count alone when the
    /// key is not accepted.
    pub fn push(&mut self, key: char) -> bool {
        if !self.accepts(key) {
            return false;
        }
        let digit = key.to_digit(10).unwrap_or(0);
        self.0 = self.0.saturating_mul(10).saturating_add(digit);
        true
    }

    /// The repeat count to hand to a command: the typed count, or 1.
    pub fn effective(self) -> u32 {
        self.0.max(1)
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_zero_rejected() {
        let mut count = CountPrefix::default();
        assert!(!count.accepts('0'));
        assert!(!count.push('0'));
        assert!(count.is_empty());
    }

    #[test]
    fn test_zero_accepted_after_first_digit() {
        let mut count = CountPrefix::default();
        assert!(count.push('1'));
        assert!(count.push('0'));
        assert_eq!(count.value(), 10);
    }

    #[test]
    fn test_accumulates_decimal() {
        let mut count = CountPrefix::default();
        count.push('2');
        count.push('3');
        assert_eq!(count.value(), 23);
        assert_eq!(count.effective(), 23);
    }

    #[test]
    fn test_effective_defaults_to_one() {
        assert_eq!(CountPrefix::default().effective(), 1);
    }

    #[test]
    fn test_non_digits_rejected() {
        let count = CountPrefix::default();
        assert!(!count.accepts('g'));
        assert!(!count.accepts(' '));
        // Non-ASCII digits are not counts.
        assert!(!count.accepts('٣'));
    }

    #[test]
    fn test_saturates_instead_of_overflowing() {
        let mut count = CountPrefix::default();
        for _ in 0..20 {
            count.push('9');
        }
        assert_eq!(count.value(), u32::MAX);
    }

    #[test]
    fn test_clear() {
        let mut count = CountPrefix::default();
        count.push('7');
        count.clear();
        assert!(count.is_empty());
        assert!(!count.accepts('0'));
    }
}
