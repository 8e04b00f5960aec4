//! Field comparators: stateless rule modules over one lease chain
//!
//! Each comparator is a pure function of the chain snapshot producing
//! raw findings. Comparators know nothing about severity or
//! presentation; the assembler turns findings into conflicts. They run
//! in a fixed order because the report builder's duplicate tie-break
//! depends on categories already emitted.

pub mod dates;
pub mod options;
pub mod parties;
pub mod property;
pub mod rent;
pub mod supersession;

use crate::memory::ChainSnapshot;
use crate::EngineConfig;
use lease_types::{ConflictCategory, DocumentReference, LeaseRecord, ProvisionValue};
use rust_decimal::Decimal;

/// How far apart the two sides of a finding are
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Magnitude {
    /// No meaningful distance (categorical contradictions)
    None,
    /// Relative numeric divergence as a fraction (0.025 = 2.5%)
    Relative(Decimal),
    /// Chronological gap in days
    Days(i64),
    /// Whether a later document explicitly superseded the earlier value
    Supersession { explicit: bool },
    /// A required field was absent; the check was skipped
    Insufficient,
}

/// Value a resolution should prefer, from the governing document
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionHint {
    pub recommended_value: String,
    /// True when the governing amendment stated an explicit original value
    pub explicit: bool,
}

/// Raw comparator output, pre-severity and pre-deduplication
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub category: ConflictCategory,
    pub field_name: String,
    pub source_a: DocumentReference,
    pub source_b: DocumentReference,
    pub value_a: Option<String>,
    pub value_b: Option<String>,
    pub explanation: String,
    pub magnitude: Magnitude,
    pub resolution: Option<ResolutionHint>,
}

impl Finding {
    /// Info-grade finding recording a skipped check, so partial
    /// detection never leaves a silent gap
    pub fn insufficient(
        category: ConflictCategory,
        field_name: impl Into<String>,
        source_a: DocumentReference,
        source_b: DocumentReference,
        what: &str,
    ) -> Self {
        Self {
            category,
            field_name: field_name.into(),
            source_a,
            source_b,
            value_a: None,
            value_b: None,
            explanation: format!("Insufficient data to evaluate {}", what),
            magnitude: Magnitude::Insufficient,
            resolution: None,
        }
    }
}

/// Run every comparator over the snapshot in the fixed pipeline order
pub fn run_all(snapshot: &ChainSnapshot, config: &EngineConfig) -> Vec<Finding> {
    let mut findings = Vec::new();
    findings.extend(dates::check_dates(snapshot));
    findings.extend(rent::check_rent(snapshot, config));
    findings.extend(parties::check_parties(snapshot));
    findings.extend(property::check_property(snapshot));
    findings.extend(options::check_options(snapshot));
    findings.extend(supersession::check_supersession(snapshot, config));
    findings
}

// Provision-name classification shared by the comparators. Names come
// from extraction and are free-form; matching is substring-based.

pub(crate) fn is_rent_provision(name: &str) -> bool {
    let lower = name.to_lowercase();
    // Whole-word match, so "rentable square feet" is not a rent provision
    lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| word == "rent")
        && !lower.contains("credit")
}

pub(crate) fn is_annual_rent_provision(name: &str) -> bool {
    is_rent_provision(name) && name.to_lowercase().contains("annual")
}

pub(crate) fn is_expiration_provision(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("expiration") || lower.contains("term")
}

pub(crate) fn is_space_provision(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("square") || lower.contains("premises") || lower.contains("space")
}

pub(crate) fn is_assignment_provision(name: &str) -> bool {
    name.to_lowercase().contains("assign")
}

/// The base lease's value for a named provision, if it states one.
/// Known structured fields are checked first, then the extracted
/// clause map.
pub(crate) fn lease_value_for(lease: &LeaseRecord, provision_name: &str) -> Option<ProvisionValue> {
    let lower = provision_name.to_lowercase();

    // Square footage before rent: "rentable square feet" is an area,
    // not a rent amount
    if lower.contains("square") && !is_rent_provision(&lower) {
        return lease.rentable_square_feet.map(ProvisionValue::Number);
    }
    if is_rent_provision(&lower) {
        if lower.contains("annual") {
            return lease.base_rent_annual.map(ProvisionValue::Money);
        }
        if lower.contains("sqft") || lower.contains("square foot") || lower.contains("psf") {
            return lease.rent_per_sqft.map(ProvisionValue::Money);
        }
        return lease.base_rent_monthly.map(ProvisionValue::Money);
    }
    if lower.contains("expiration") {
        return lease.expiration_date.map(ProvisionValue::Date);
    }
    if lower.contains("commencement") {
        return lease.commencement_date.map(ProvisionValue::Date);
    }
    if lower.contains("deposit") {
        return lease.security_deposit.map(ProvisionValue::Money);
    }

    lease
        .extracted_clauses
        .iter()
        .find(|(name, _)| name.to_lowercase() == lower)
        .map(|(_, text)| ProvisionValue::Text(text.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rent_provision_classification() {
        assert!(is_rent_provision("Base Rent"));
        assert!(is_rent_provision("Annual Base Rent"));
        assert!(is_rent_provision("rent_per_sqft"));
        assert!(!is_rent_provision("Rent Credit"));
        assert!(!is_rent_provision("Security Deposit"));
        // "rent" inside a longer word is not a rent provision
        assert!(!is_rent_provision("Rentable Square Feet"));
        assert!(!is_rent_provision("Current Premises"));
        assert!(is_annual_rent_provision("Annual Base Rent"));
        assert!(!is_annual_rent_provision("Base Rent"));
    }

    #[test]
    fn test_lease_value_lookup() {
        let mut lease = LeaseRecord::new("lease-001");
        lease.base_rent_monthly = Some(dec!(10000));
        lease.rent_per_sqft = Some(dec!(24));
        lease.expiration_date = NaiveDate::from_ymd_opt(2030, 12, 31);
        lease.rentable_square_feet = Some(dec!(5000));
        lease
            .extracted_clauses
            .insert("Parking".to_string(), "20 reserved spaces".to_string());

        assert_eq!(
            lease_value_for(&lease, "Base Rent"),
            Some(ProvisionValue::Money(dec!(10000)))
        );
        assert_eq!(
            lease_value_for(&lease, "Expiration Date"),
            Some(ProvisionValue::Date(
                NaiveDate::from_ymd_opt(2030, 12, 31).unwrap()
            ))
        );
        assert_eq!(
            lease_value_for(&lease, "Rentable Square Feet"),
            Some(ProvisionValue::Number(dec!(5000)))
        );
        assert_eq!(
            lease_value_for(&lease, "Rent Per Square Foot"),
            Some(ProvisionValue::Money(dec!(24)))
        );
        assert_eq!(
            lease_value_for(&lease, "parking"),
            Some(ProvisionValue::Text("20 reserved spaces".to_string()))
        );
        assert_eq!(lease_value_for(&lease, "Signage"), None);
    }
}
