/// Catalog number normalization
///
/// Splits a raw identifier such as `abc00123` into a label and a numeric
/// sequence and renders it in the stable `ABC-123` form used for output names.
use regex::Regex;
use std::fmt;

/// A catalog number split into its label and sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedNumber {
    /// Alphabetic prefix (series/brand code), lowercase as parsed
    pub label: Option<String>,
    /// Numeric suffix
    pub sequence: u64,
}

impl FormattedNumber {
    /// Parse a raw identifier.
    ///
    /// The sequence is the trailing digit run and the label is the alphabetic
    /// run immediately before it, optionally joined by one separator.
    /// Anything in front of the label (distributor prefixes like `h_068` or
    /// `1`) is dropped. Returns `None` when the identifier does not end in
    /// digits.
    pub fn parse(raw: &str) -> Option<Self> {
        let re = Regex::new(r"([A-Za-z]*)[-_ ]?(\d+)$").ok()?;
        let captures = re.captures(raw.trim())?;

        let label = captures
            .get(1)
            .map(|m| m.as_str().to_lowercase())
            .filter(|l| !l.is_empty());
        let sequence = captures.get(2)?.as_str().parse::<u64>().ok()?;

        Some(Self { label, sequence })
    }

    /// Whether two identifiers name the same catalog entry, ignoring padding
    /// and case
    pub fn same_entry(&self, other: &FormattedNumber) -> bool {
        self.label == other.label && self.sequence == other.sequence
    }
}

impl fmt::Display for FormattedNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{}-{:03}", label.to_uppercase(), self.sequence),
            None => write!(f, "{:03}", self.sequence),
        }
    }
}

/// Render a raw identifier in label+sequence form.
///
/// Identifiers that cannot be split are returned uppercased and trimmed.
pub fn format_number(raw: &str) -> String {
    match FormattedNumber::parse(raw) {
        Some(number) => number.to_string(),
        None => raw.trim().to_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_and_sequence() {
        let number = FormattedNumber::parse("abc00123").unwrap();
        assert_eq!(number.label.as_deref(), Some("abc"));
        assert_eq!(number.sequence, 123);
        assert_eq!(number.to_string(), "ABC-123");
    }

    #[test]
    fn test_sequence_only() {
        assert_eq!(format_number("00123"), "123");
        assert_eq!(format_number("7"), "007");
    }

    #[test]
    fn test_distributor_prefix_is_dropped() {
        assert_eq!(format_number("h_068abc00123"), "ABC-123");
        assert_eq!(format_number("1ssis00001"), "SSIS-001");
    }

    #[test]
    fn test_long_sequence_keeps_all_digits() {
        assert_eq!(format_number("abc12345"), "ABC-12345");
    }

    #[test]
    fn test_unsplittable_identifier() {
        assert!(FormattedNumber::parse("abc").is_none());
        assert_eq!(format_number(" abc "), "ABC");
    }

    #[test]
    fn test_same_entry_ignores_padding() {
        let a = FormattedNumber::parse("abc-123").unwrap();
        let b = FormattedNumber::parse("ABC00123").unwrap();
        assert!(a.same_entry(&b));
    }
}
