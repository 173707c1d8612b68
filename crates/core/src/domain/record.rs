// Record Domain Model
// Consumer-side transform of a payload into its persisted line

use std::fmt;

/// Number of leading payload characters kept in a record
pub const RECORD_PREFIX_CHARS: usize = 4;

/// Persisted summary of one consumed payload: `<WXYZ, N>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    prefix: String,
    length: usize,
}

impl Record {
    /// Build a record from a payload.
    ///
    /// Keeps the first four characters and the total character count.
    /// A payload shorter than four characters keeps all of it.
    pub fn from_payload(payload: &str) -> Self {
        let mut length = 0;
        let mut prefix_end = 0;
        for (offset, ch) in payload.char_indices() {
            if length < RECORD_PREFIX_CHARS {
                prefix_end = offset + ch.len_utf8();
            }
            length += 1;
        }

        Self {
            prefix: payload[..prefix_end].to_string(),
            length,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Character count of the source payload
    pub fn length(&self) -> usize {
        self.length
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}>", self.prefix, self.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_large_payload() {
        let payload = format!("ABCDEFGH{}", "X".repeat(1_999_992));
        assert_eq!(payload.len(), 2_000_000);

        let record = Record::from_payload(&payload);

        assert_eq!(record.to_string(), "<ABCD, 2000000>");
        assert_eq!(record.prefix(), "ABCD");
        assert_eq!(record.length(), 2_000_000);
    }

    #[test]
    fn test_record_short_payload_keeps_everything() {
        assert_eq!(Record::from_payload("AB").to_string(), "<AB, 2>");
        assert_eq!(Record::from_payload("").to_string(), "<, 0>");
    }

    #[test]
    fn test_record_counts_characters_not_bytes() {
        let record = Record::from_payload("ÄBCDÉ");
        assert_eq!(record.prefix(), "ÄBCD");
        assert_eq!(record.length(), 5);
    }
}
