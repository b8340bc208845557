//! Document identifiers and issue dates.

use chrono::{DateTime, NaiveDate, Utc};

/// Prefix of inbound receipt identifiers.
pub const INBOUND_PREFIX: &str = "WH-INV";
/// Prefix of outbound order identifiers.
pub const OUTBOUND_PREFIX: &str = "ORD";

/// Build an identifier: `PREFIX-YYYYMMDDHHMMSS-XXXXXXXX`.
///
/// The timestamp is UTC to the second; the suffix is 32 random bits from a
/// v4 UUID, so two calls in the same second still differ with overwhelming
/// probability.
pub fn generate_id(prefix: &str, at: DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().as_u128() as u32;
    format!("{}-{}-{:08X}", prefix, at.format("%Y%m%d%H%M%S"), suffix)
}

/// Identity of one rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStamp {
    /// Document or order identifier, also encoded in the header QR code
    pub id: String,
    /// Date printed in the header
    pub issued_on: NaiveDate,
}

impl DocumentStamp {
    /// Fixed stamp.
    pub fn new(id: impl Into<String>, issued_on: NaiveDate) -> Self {
        Self {
            id: id.into(),
            issued_on,
        }
    }

    /// Fresh stamp from the clock.
    pub fn now(prefix: &str) -> Self {
        let at = Utc::now();
        Self::new(generate_id(prefix, at), at.date_naive())
    }

    /// Header date line, `Date: DD/MM/YYYY`.
    pub fn date_line(&self) -> String {
        format!("Date: {}", self.issued_on.format("%d/%m/%Y"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_id_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let id = generate_id(INBOUND_PREFIX, at);
        assert!(id.starts_with("WH-INV-20240309140507-"));
        let suffix = id.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_ids_differ_within_one_second() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let ids: std::collections::HashSet<String> =
            (0..64).map(|_| generate_id(OUTBOUND_PREFIX, at)).collect();
        assert!(ids.len() > 60);
    }

    #[test]
    fn test_date_line() {
        let stamp = DocumentStamp::new("ORD-1", NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(stamp.date_line(), "Date: 05/01/2024");
    }

    #[test]
    fn test_now_uses_prefix() {
        let stamp = DocumentStamp::now(OUTBOUND_PREFIX);
        assert!(stamp.id.starts_with("ORD-"));
    }
}
