//! Amendment record and modified-provision tracking

use crate::money;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categories of change an amendment makes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmendmentType {
    RentModification,
    TermExtension,
    TermReduction,
    SpaceExpansion,
    SpaceReduction,
    Assignment,
    SubleaseConsent,
    UseChange,
    Other,
}

/// Typed value of a lease provision before/after amendment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionValue {
    Money(Decimal),
    Number(Decimal),
    Date(NaiveDate),
    Text(String),
}

impl ProvisionValue {
    pub fn as_money(&self) -> Option<Decimal> {
        match self {
            ProvisionValue::Money(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            ProvisionValue::Money(v) | ProvisionValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            ProvisionValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for ProvisionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionValue::Money(v) => write!(f, "{}", money::format_usd(*v)),
            ProvisionValue::Number(v) => write!(f, "{}", v.normalize()),
            ProvisionValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            ProvisionValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One provision changed by an amendment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifiedProvision {
    /// Provision name as stated in the amendment, e.g. "Base Rent"
    pub provision_name: String,
    #[serde(default)]
    pub section_reference: Option<String>,
    /// Value the amendment claims was in force before it
    #[serde(default)]
    pub original_value: Option<ProvisionValue>,
    #[serde(default)]
    pub amended_value: Option<ProvisionValue>,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ModifiedProvision {
    /// Case-insensitive check on the provision name
    pub fn name_contains(&self, needle: &str) -> bool {
        self.provision_name
            .to_lowercase()
            .contains(&needle.to_lowercase())
    }
}

/// Snapshot of one amendment's extracted terms
///
/// `sequence_number` is assigned by Document Memory at registration,
/// not re-derived from dates: chain order reflects execution order,
/// while effective-date ordering is checked as a conflict category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmendmentRecord {
    pub document_id: String,
    /// Registration-assigned chain position, 1-based; zero until registered
    #[serde(default)]
    pub sequence_number: u32,
    #[serde(default)]
    pub amendment_date: Option<NaiveDate>,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,

    #[serde(default)]
    pub original_lease_reference: Option<String>,
    #[serde(default)]
    pub original_lease_date: Option<NaiveDate>,
    #[serde(default)]
    pub property_reference: Option<String>,

    #[serde(default)]
    pub landlord_name: Option<String>,
    #[serde(default)]
    pub tenant_name: Option<String>,

    #[serde(default)]
    pub amendment_types: Vec<AmendmentType>,
    #[serde(default)]
    pub modified_provisions: Vec<ModifiedProvision>,

    #[serde(default)]
    pub new_expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub rentable_square_feet: Option<Decimal>,
    #[serde(default)]
    pub additional_rent: Option<Decimal>,
    #[serde(default)]
    pub rent_credit: Option<Decimal>,

    #[serde(default)]
    pub consideration: Option<String>,
    /// Recitals/background section; scanned for retroactivity language
    #[serde(default)]
    pub recitals: Option<String>,
}

impl AmendmentRecord {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            sequence_number: 0,
            amendment_date: None,
            effective_date: None,
            original_lease_reference: None,
            original_lease_date: None,
            property_reference: None,
            landlord_name: None,
            tenant_name: None,
            amendment_types: Vec::new(),
            modified_provisions: Vec::new(),
            new_expiration_date: None,
            rentable_square_feet: None,
            additional_rent: None,
            rent_credit: None,
            consideration: None,
            recitals: None,
        }
    }

    /// All modifications matching a provision name (case-insensitive)
    pub fn modifications_named(&self, provision_name: &str) -> Vec<&ModifiedProvision> {
        let needle = provision_name.to_lowercase();
        self.modified_provisions
            .iter()
            .filter(|m| m.provision_name.to_lowercase() == needle)
            .collect()
    }

    pub fn has_type(&self, kind: AmendmentType) -> bool {
        self.amendment_types.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_provision_value_display() {
        assert_eq!(
            ProvisionValue::Money(dec!(10000)).to_string(),
            "$10,000.00"
        );
        assert_eq!(ProvisionValue::Number(dec!(5000.0)).to_string(), "5000");
        assert_eq!(
            ProvisionValue::Date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()).to_string(),
            "2025-06-01"
        );
        assert_eq!(
            ProvisionValue::Text("net of electric".to_string()).to_string(),
            "net of electric"
        );
    }

    #[test]
    fn test_modifications_named_is_case_insensitive() {
        let mut amendment = AmendmentRecord::new("amend-001");
        amendment.modified_provisions.push(ModifiedProvision {
            provision_name: "Base Rent".to_string(),
            section_reference: None,
            original_value: Some(ProvisionValue::Money(dec!(10000))),
            amended_value: Some(ProvisionValue::Money(dec!(10500))),
            effective_date: None,
            notes: None,
        });

        assert_eq!(amendment.modifications_named("base rent").len(), 1);
        assert!(amendment.modifications_named("expiration").is_empty());
    }

    #[test]
    fn test_amendment_roundtrip() {
        let mut amendment = AmendmentRecord::new("amend-002");
        amendment.amendment_types.push(AmendmentType::TermExtension);
        amendment.new_expiration_date = NaiveDate::from_ymd_opt(2030, 12, 31);

        let json = serde_json::to_string(&amendment).unwrap();
        let back: AmendmentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amendment);
    }
}
