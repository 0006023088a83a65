//! Availability states and the persisted status record.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Last observed availability of the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockStatus {
    #[default]
    Unknown,
    InStock,
    OutOfStock,
}

impl StockStatus {
    /// On-disk representation; `Unknown` is stored as `null`.
    pub fn as_wire(&self) -> Option<&'static str> {
        match self {
            StockStatus::Unknown => None,
            StockStatus::InStock => Some("in_stock"),
            StockStatus::OutOfStock => Some("out_of_stock"),
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire().unwrap_or("unknown"))
    }
}

impl Serialize for StockStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StockStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some("unknown") => Ok(StockStatus::Unknown),
            Some("in_stock") => Ok(StockStatus::InStock),
            Some("out_of_stock") => Ok(StockStatus::OutOfStock),
            Some(other) => Err(de::Error::unknown_variant(
                other,
                &["in_stock", "out_of_stock", "unknown"],
            )),
        }
    }
}

/// Durable monitor state, replaced whole on every save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusRecord {
    pub status: StockStatus,
    /// Set once a sold-out email went out for the current sold-out streak.
    pub sold_out_email_sent: bool,
}

impl StatusRecord {
    pub fn new(status: StockStatus, sold_out_email_sent: bool) -> Self {
        Self {
            status,
            sold_out_email_sent,
        }
    }

    /// Whether the flag is only set while out of stock.
    pub fn is_consistent(&self) -> bool {
        !self.sold_out_email_sent || self.status == StockStatus::OutOfStock
    }

    /// Clear a flag that outlived its sold-out streak.
    pub fn normalized(self) -> Self {
        if self.is_consistent() {
            self
        } else {
            Self {
                sold_out_email_sent: false,
                ..self
            }
        }
    }
}

/// Outcome of one probe of the product page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    InStock,
    OutOfStock,
    /// Driver failure or unrecognized page; the last known state holds.
    Indeterminate,
}

impl ProbeResult {
    pub fn is_determinate(&self) -> bool {
        !matches!(self, ProbeResult::Indeterminate)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeResult::InStock => "in_stock",
            ProbeResult::OutOfStock => "out_of_stock",
            ProbeResult::Indeterminate => "unknown",
        }
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which status-change email to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    BackInStock,
    SoldOut,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::BackInStock => f.write_str("back in stock"),
            NotificationKind::SoldOut => f.write_str("sold out"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_wire_format() {
        let record = StatusRecord::new(StockStatus::OutOfStock, true);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"status":"out_of_stock","sold_out_email_sent":true}"#);

        let json = serde_json::to_string(&StatusRecord::default()).unwrap();
        assert_eq!(json, r#"{"status":null,"sold_out_email_sent":false}"#);
    }

    #[test]
    fn test_record_missing_fields_default() {
        let record: StatusRecord = serde_json::from_str(r#"{"status": "in_stock"}"#).unwrap();
        assert_eq!(record, StatusRecord::new(StockStatus::InStock, false));

        let record: StatusRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record, StatusRecord::default());
    }

    #[test]
    fn test_record_rejects_unknown_status() {
        let result = serde_json::from_str::<StatusRecord>(r#"{"status": "maybe"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_normalized_clears_stale_flag() {
        let record = StatusRecord::new(StockStatus::InStock, true).normalized();
        assert!(!record.sold_out_email_sent);

        let record = StatusRecord::new(StockStatus::OutOfStock, true).normalized();
        assert!(record.sold_out_email_sent);
    }

    #[test]
    fn test_probe_result_labels() {
        assert_eq!(ProbeResult::InStock.to_string(), "in_stock");
        assert_eq!(ProbeResult::Indeterminate.to_string(), "unknown");
        assert!(!ProbeResult::Indeterminate.is_determinate());
    }
}
