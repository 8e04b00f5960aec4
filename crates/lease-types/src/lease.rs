//! Base lease record and its nested value types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Commercial lease structure (who pays operating costs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseType {
    Gross,
    ModifiedGross,
    Net,
    DoubleNet,
    TripleNet,
    AbsoluteNet,
}

/// Permitted property use categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyUseType {
    Office,
    Retail,
    Industrial,
    Warehouse,
    MixedUse,
    Restaurant,
    Medical,
    Other,
}

/// Types of rent escalation provisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationType {
    FixedPercentage,
    Cpi,
    FixedAmount,
    MarketRate,
    None,
}

/// Property address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default = "Address::default_country")]
    pub country: String,
}

impl Address {
    fn default_country() -> String {
        "US".to_string()
    }

    /// Single-line rendering used for cross-document comparison
    pub fn single_line(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.street_address, self.city, self.state, self.zip_code
        )
    }
}

/// Lease party (landlord, tenant, or guarantor)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub legal_name: String,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
}

impl Party {
    pub fn named(legal_name: impl Into<String>) -> Self {
        Self {
            legal_name: legal_name.into(),
            entity_type: None,
            address: None,
            contact_name: None,
            contact_email: None,
        }
    }
}

/// Scheduled rent increase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentEscalation {
    pub escalation_type: EscalationType,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    /// Percentage increase, e.g. 3.0 means 3% (fixed_percentage only)
    #[serde(default)]
    pub percentage: Option<Decimal>,
    /// Fixed monthly increase (fixed_amount only)
    #[serde(default)]
    pub fixed_amount: Option<Decimal>,
    #[serde(default = "RentEscalation::default_frequency")]
    pub frequency_months: u32,
}

impl RentEscalation {
    fn default_frequency() -> u32 {
        12
    }
}

/// Lease renewal option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalOption {
    pub option_number: u32,
    pub term_months: u32,
    pub notice_days: u32,
    #[serde(default)]
    pub rent_determination: Option<String>,
}

/// Early termination right
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminationRight {
    /// Party holding the right ("landlord" or "tenant")
    pub party: String,
    #[serde(default)]
    pub earliest_date: Option<NaiveDate>,
    pub notice_days: u32,
    #[serde(default)]
    pub termination_fee: Option<Decimal>,
    #[serde(default)]
    pub conditions: Option<String>,
}

/// Immutable snapshot of a base lease's extracted terms
///
/// Produced by the external extractor; owned by Document Memory once
/// registered and only ever read by the detection engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseRecord {
    pub document_id: String,
    #[serde(default)]
    pub lease_type: Option<LeaseType>,
    #[serde(default)]
    pub execution_date: Option<NaiveDate>,

    #[serde(default)]
    pub landlord: Option<Party>,
    #[serde(default)]
    pub tenant: Option<Party>,
    #[serde(default)]
    pub guarantors: Vec<Party>,

    #[serde(default)]
    pub property_address: Option<Address>,
    #[serde(default)]
    pub rentable_square_feet: Option<Decimal>,
    #[serde(default)]
    pub usable_square_feet: Option<Decimal>,
    #[serde(default)]
    pub property_use_type: Option<PropertyUseType>,

    #[serde(default)]
    pub commencement_date: Option<NaiveDate>,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub term_months: Option<u32>,

    #[serde(default)]
    pub base_rent_monthly: Option<Decimal>,
    #[serde(default)]
    pub base_rent_annual: Option<Decimal>,
    #[serde(default)]
    pub rent_per_sqft: Option<Decimal>,
    #[serde(default)]
    pub rent_escalations: Vec<RentEscalation>,

    #[serde(default)]
    pub security_deposit: Option<Decimal>,

    #[serde(default)]
    pub renewal_options: Vec<RenewalOption>,
    #[serde(default)]
    pub termination_rights: Vec<TerminationRight>,

    #[serde(default)]
    pub assignment_allowed: Option<bool>,
    #[serde(default)]
    pub subletting_allowed: Option<bool>,

    /// Key clauses by name, keyed deterministically
    #[serde(default)]
    pub extracted_clauses: BTreeMap<String, String>,
}

impl LeaseRecord {
    /// Minimal record with only a document id; every other field empty
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            lease_type: None,
            execution_date: None,
            landlord: None,
            tenant: None,
            guarantors: Vec::new(),
            property_address: None,
            rentable_square_feet: None,
            usable_square_feet: None,
            property_use_type: None,
            commencement_date: None,
            expiration_date: None,
            term_months: None,
            base_rent_monthly: None,
            base_rent_annual: None,
            rent_per_sqft: None,
            rent_escalations: Vec::new(),
            security_deposit: None,
            renewal_options: Vec::new(),
            termination_rights: Vec::new(),
            assignment_allowed: None,
            subletting_allowed: None,
            extracted_clauses: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_address_single_line() {
        let addr = Address {
            street_address: "100 Main St, Suite 400".to_string(),
            city: "Tampa".to_string(),
            state: "FL".to_string(),
            zip_code: "33602".to_string(),
            country: "US".to_string(),
        };
        assert_eq!(addr.single_line(), "100 Main St, Suite 400, Tampa, FL 33602");
    }

    #[test]
    fn test_lease_record_roundtrip() {
        let mut lease = LeaseRecord::new("lease-001");
        lease.base_rent_monthly = Some(dec!(10000));
        lease.tenant = Some(Party::named("Acme Corp LLC"));

        let json = serde_json::to_string(&lease).unwrap();
        let back: LeaseRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, lease);
    }

    #[test]
    fn test_lease_record_deserializes_sparse_input() {
        // Extractor output frequently omits unknown fields entirely
        let lease: LeaseRecord = serde_json::from_str(r#"{"document_id":"lease-002"}"#).unwrap();
        assert_eq!(lease.document_id, "lease-002");
        assert!(lease.base_rent_monthly.is_none());
        assert!(lease.rent_escalations.is_empty());
    }
}
