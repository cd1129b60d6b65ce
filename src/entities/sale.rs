// Sale Entity - one recorded transaction at a location
//
// `location` is a weak reference by NAME. A sale whose name matches no
// Location is kept as-is; it just never shows up in a ranked row.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    /// Stable identity (UUID)
    #[serde(default = "default_uuid")]
    pub id: String,

    /// Date as recorded by the point of sale (kept verbatim)
    pub date: String,

    /// Name of the location this sale happened at
    pub location: String,

    pub amount: f64,

    /// Optional receipt/ticket number
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

fn default_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Sale {
    pub fn new(date: impl Into<String>, location: impl Into<String>, amount: f64) -> Self {
        Sale {
            id: default_uuid(),
            date: date.into(),
            location: location.into(),
            amount,
            reference: None,
        }
    }

    /// Attach a receipt number
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Hash of the sale's content (date, location, amount, reference).
    /// Identical sales share it, so it is NOT an identity on its own.
    pub fn compute_idempotency_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}|{}|{}|{}",
            self.date,
            self.location,
            self.amount,
            self.reference.as_deref().unwrap_or("")
        ));
        format!("{:x}", hasher.finalize())
    }

    /// Stable id for the `occurrence`-th (0-based) sale with this content in
    /// one import file. Re-importing the same file yields the same ids, while
    /// identical rows within it stay distinct sales.
    pub fn import_id(&self, occurrence: usize) -> String {
        let hash = self.compute_idempotency_hash();
        format!("sale-{}-{}", &hash[..32], occurrence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotency_hash_is_stable() {
        let sale = Sale::new("2024-06-01", "Park", 12.5);

        let hash1 = sale.compute_idempotency_hash();
        let hash2 = sale.compute_idempotency_hash();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64, "SHA-256 hash should be 64 hex characters");
    }

    #[test]
    fn test_idempotency_hash_ignores_identity() {
        let a = Sale::new("2024-06-01", "Park", 12.5);
        let b = Sale::new("2024-06-01", "Park", 12.5);

        assert_ne!(a.id, b.id);
        assert_eq!(a.compute_idempotency_hash(), b.compute_idempotency_hash());
    }

    #[test]
    fn test_reference_distinguishes_same_day_sales() {
        let a = Sale::new("2024-06-01", "Park", 12.5).with_reference("R-1");
        let b = Sale::new("2024-06-01", "Park", 12.5).with_reference("R-2");

        assert_ne!(a.compute_idempotency_hash(), b.compute_idempotency_hash());
    }

    #[test]
    fn test_import_id_separates_identical_rows() {
        let a = Sale::new("2024-06-01", "Park", 5.0);
        let b = Sale::new("2024-06-01", "Park", 5.0);

        assert_eq!(a.import_id(0), b.import_id(0));
        assert_ne!(a.import_id(0), a.import_id(1));
        assert!(a.import_id(2).starts_with("sale-"));
    }
}
