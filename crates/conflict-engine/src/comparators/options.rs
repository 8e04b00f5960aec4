//! Option/clause comparator: renewal and termination terms, and
//! ambiguous supersession of base-lease provisions

use super::{lease_value_for, Finding, Magnitude, ResolutionHint};
use crate::memory::ChainSnapshot;
use lazy_static::lazy_static;
use lease_types::{ConflictCategory, DocumentReference, ModifiedProvision};
use regex::Regex;
use rust_decimal::Decimal;

lazy_static! {
    static ref OPTION_NUMBER: Regex = Regex::new(r"(\d+)").unwrap();
}

fn is_renewal_provision(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("renewal") || lower.contains("option")
}

fn is_termination_provision(name: &str) -> bool {
    name.to_lowercase().contains("termination")
}

fn is_notice_provision(name: &str) -> bool {
    name.to_lowercase().contains("notice")
}

pub fn check_options(snapshot: &ChainSnapshot) -> Vec<Finding> {
    let mut findings = Vec::new();
    let lease = &snapshot.lease;
    let lease_ref = DocumentReference::lease(&lease.document_id);

    for amendment in &snapshot.amendments {
        let amend_ref = DocumentReference::amendment(&amendment.document_id);

        for provision in &amendment.modified_provisions {
            findings.extend(check_notice_days(
                snapshot,
                provision,
                &lease_ref,
                &amend_ref,
            ));

            // Ambiguous supersession: the amendment rewrites a
            // provision the lease states, without saying what it was
            if provision.original_value.is_none() {
                if let Some(lease_value) = lease_value_for(lease, &provision.provision_name) {
                    findings.push(Finding {
                        category: ConflictCategory::SupersededTerms,
                        field_name: provision.provision_name.clone(),
                        source_a: lease_ref.clone(),
                        source_b: amend_ref.clone(),
                        value_a: Some(lease_value.to_string()),
                        value_b: provision.amended_value.as_ref().map(|v| v.to_string()),
                        explanation: format!(
                            "Amendment {} modifies {:?} without stating the value it \
                             supersedes; the base lease states {}",
                            amendment.document_id,
                            provision.provision_name,
                            lease_value
                        ),
                        magnitude: Magnitude::None,
                        resolution: provision.amended_value.as_ref().map(|v| ResolutionHint {
                            recommended_value: v.to_string(),
                            explicit: false,
                        }),
                    });
                }
            }
        }
    }

    findings
}

/// Differing notice periods for what the documents call the same
/// renewal or termination right
fn check_notice_days(
    snapshot: &ChainSnapshot,
    provision: &ModifiedProvision,
    lease_ref: &DocumentReference,
    amend_ref: &DocumentReference,
) -> Vec<Finding> {
    let name = provision.provision_name.as_str();
    if !is_notice_provision(name) || !(is_renewal_provision(name) || is_termination_provision(name))
    {
        return Vec::new();
    }
    let Some(stated) = provision.original_value.as_ref().and_then(|v| v.as_number()) else {
        return Vec::new();
    };

    let lease = &snapshot.lease;
    let lease_notice: Option<u32> = if is_renewal_provision(name) {
        let wanted = OPTION_NUMBER
            .captures(name)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok());
        match wanted {
            Some(number) => lease
                .renewal_options
                .iter()
                .find(|o| o.option_number == number)
                .map(|o| o.notice_days),
            None => lease.renewal_options.first().map(|o| o.notice_days),
        }
    } else {
        lease.termination_rights.first().map(|r| r.notice_days)
    };

    let Some(expected) = lease_notice else {
        return Vec::new();
    };
    if stated == Decimal::from(expected) {
        return Vec::new();
    }

    vec![Finding {
        category: ConflictCategory::OptionConflict,
        field_name: provision.provision_name.clone(),
        source_a: lease_ref.clone(),
        source_b: amend_ref.clone(),
        value_a: Some(format!("{} days", expected)),
        value_b: Some(format!("{} days", stated.normalize())),
        explanation: format!(
            "{:?} states a {}-day notice period but the base lease requires {} days \
             for the same right",
            provision.provision_name,
            stated.normalize(),
            expected
        ),
        magnitude: Magnitude::None,
        resolution: None,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use lease_types::{
        AmendmentRecord, LeaseRecord, ProvisionValue, RenewalOption, TerminationRight,
    };
    use rust_decimal_macros::dec;

    fn lease_with_options() -> LeaseRecord {
        let mut lease = LeaseRecord::new("lease-001");
        lease.renewal_options.push(RenewalOption {
            option_number: 1,
            term_months: 60,
            notice_days: 180,
            rent_determination: Some("fair market".to_string()),
        });
        lease.termination_rights.push(TerminationRight {
            party: "tenant".to_string(),
            earliest_date: None,
            notice_days: 270,
            termination_fee: None,
            conditions: None,
        });
        lease.base_rent_monthly = Some(dec!(10000));
        lease
    }

    fn provision(name: &str, original: Option<ProvisionValue>, amended: Option<ProvisionValue>) -> ModifiedProvision {
        ModifiedProvision {
            provision_name: name.to_string(),
            section_reference: None,
            original_value: original,
            amended_value: amended,
            effective_date: None,
            notes: None,
        }
    }

    #[test]
    fn test_consistent_renewal_notice_is_quiet() {
        let mut amendment = AmendmentRecord::new("amend-001");
        amendment.modified_provisions.push(provision(
            "Renewal Option 1 Notice",
            Some(ProvisionValue::Number(dec!(180))),
            Some(ProvisionValue::Number(dec!(120))),
        ));
        let snapshot = ChainSnapshot {
            lease: lease_with_options(),
            amendments: vec![amendment],
        };
        assert!(check_options(&snapshot).is_empty());
    }

    #[test]
    fn test_differing_renewal_notice_flags() {
        let mut amendment = AmendmentRecord::new("amend-001");
        amendment.modified_provisions.push(provision(
            "Renewal Option 1 Notice",
            Some(ProvisionValue::Number(dec!(90))),
            Some(ProvisionValue::Number(dec!(120))),
        ));
        let snapshot = ChainSnapshot {
            lease: lease_with_options(),
            amendments: vec![amendment],
        };
        let findings = check_options(&snapshot);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, ConflictCategory::OptionConflict);
        assert_eq!(findings[0].value_a.as_deref(), Some("180 days"));
        assert_eq!(findings[0].value_b.as_deref(), Some("90 days"));
    }

    #[test]
    fn test_termination_notice_mismatch() {
        let mut amendment = AmendmentRecord::new("amend-001");
        amendment.modified_provisions.push(provision(
            "Early Termination Notice",
            Some(ProvisionValue::Number(dec!(180))),
            None,
        ));
        let snapshot = ChainSnapshot {
            lease: lease_with_options(),
            amendments: vec![amendment],
        };
        let findings = check_options(&snapshot);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].value_a.as_deref(), Some("270 days"));
    }

    #[test]
    fn test_missing_original_value_is_ambiguous_supersession() {
        let mut amendment = AmendmentRecord::new("amend-001");
        amendment.modified_provisions.push(provision(
            "Base Rent",
            None,
            Some(ProvisionValue::Money(dec!(10500))),
        ));
        let snapshot = ChainSnapshot {
            lease: lease_with_options(),
            amendments: vec![amendment],
        };
        let findings = check_options(&snapshot);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, ConflictCategory::SupersededTerms);
        assert_eq!(findings[0].value_a.as_deref(), Some("$10,000.00"));
        let hint = findings[0].resolution.as_ref().unwrap();
        assert_eq!(hint.recommended_value, "$10,500.00");
        assert!(!hint.explicit);
    }

    #[test]
    fn test_missing_original_without_lease_value_is_quiet() {
        let mut amendment = AmendmentRecord::new("amend-001");
        amendment.modified_provisions.push(provision(
            "Signage Rights",
            None,
            Some(ProvisionValue::Text("rooftop sign permitted".to_string())),
        ));
        let snapshot = ChainSnapshot {
            lease: lease_with_options(),
            amendments: vec![amendment],
        };
        assert!(check_options(&snapshot).is_empty());
    }
}
