//! Property comparator: square footage and premises identity
//!
//! A square-footage or address change between the base lease and an
//! amendment is a conflict unless the amendment documents a space
//! expansion/reduction.

use super::{is_space_provision, Finding, Magnitude};
use crate::memory::ChainSnapshot;
use crate::comparators::parties::normalize_name;
use lease_types::money::relative_divergence;
use lease_types::{AmendmentRecord, AmendmentType, ConflictCategory, DocumentReference};

fn documents_space_change(amendment: &AmendmentRecord) -> bool {
    amendment.has_type(AmendmentType::SpaceExpansion)
        || amendment.has_type(AmendmentType::SpaceReduction)
        || amendment
            .modified_provisions
            .iter()
            .any(|p| is_space_provision(&p.provision_name))
}

pub fn check_property(snapshot: &ChainSnapshot) -> Vec<Finding> {
    let mut findings = Vec::new();
    let lease = &snapshot.lease;
    let lease_ref = DocumentReference::lease(&lease.document_id);

    let mut current_sf = lease
        .rentable_square_feet
        .map(|sf| (sf, lease_ref.clone()));
    let lease_address = lease
        .property_address
        .as_ref()
        .map(|a| (a.single_line(), normalize_name(&a.single_line())));

    for amendment in &snapshot.amendments {
        let amend_ref = DocumentReference::amendment(&amendment.document_id);
        let explained = documents_space_change(amendment);

        if let Some(stated_sf) = amendment.rentable_square_feet {
            match current_sf.clone() {
                Some((known_sf, known_ref)) if known_sf != stated_sf => {
                    if explained {
                        current_sf = Some((stated_sf, amend_ref.clone()));
                    } else {
                        findings.push(Finding {
                            category: ConflictCategory::PropertyConflict,
                            field_name: "rentable_square_feet".to_string(),
                            source_a: known_ref,
                            source_b: amend_ref.clone(),
                            value_a: Some(known_sf.normalize().to_string()),
                            value_b: Some(stated_sf.normalize().to_string()),
                            explanation: format!(
                                "Amendment {} implies {} rentable square feet but the chain \
                                 says {}, with no space expansion or reduction provision",
                                amendment.document_id,
                                stated_sf.normalize(),
                                known_sf.normalize()
                            ),
                            magnitude: relative_divergence(stated_sf, known_sf)
                                .map(Magnitude::Relative)
                                .unwrap_or(Magnitude::None),
                            resolution: None,
                        });
                    }
                }
                Some(_) => {}
                None => current_sf = Some((stated_sf, amend_ref.clone())),
            }
        } else if explained {
            // Space change with a provision-stated new area
            if let Some(new_sf) = amendment
                .modified_provisions
                .iter()
                .filter(|p| is_space_provision(&p.provision_name))
                .filter_map(|p| p.amended_value.as_ref().and_then(|v| v.as_number()))
                .next()
            {
                current_sf = Some((new_sf, amend_ref.clone()));
            }
        }

        if let (Some((display, normalized)), Some(reference)) =
            (lease_address.as_ref(), amendment.property_reference.as_ref())
        {
            let stated = normalize_name(reference);
            let matches = normalized.contains(&stated) || stated.contains(normalized.as_str());
            if !stated.is_empty() && !matches && !explained {
                findings.push(Finding {
                    category: ConflictCategory::PropertyConflict,
                    field_name: "property_address".to_string(),
                    source_a: lease_ref.clone(),
                    source_b: amend_ref.clone(),
                    value_a: Some(display.clone()),
                    value_b: Some(reference.clone()),
                    explanation: format!(
                        "Amendment {} references premises {:?} which does not match the \
                         leased premises {:?}",
                        amendment.document_id, reference, display
                    ),
                    magnitude: Magnitude::None,
                    resolution: None,
                });
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use lease_types::{Address, LeaseRecord, ModifiedProvision, ProvisionValue};
    use rust_decimal_macros::dec;

    fn base_lease() -> LeaseRecord {
        let mut lease = LeaseRecord::new("lease-001");
        lease.rentable_square_feet = Some(dec!(5000));
        lease.property_address = Some(Address {
            street_address: "100 Main St, Suite 400".to_string(),
            city: "Tampa".to_string(),
            state: "FL".to_string(),
            zip_code: "33602".to_string(),
            country: "US".to_string(),
        });
        lease
    }

    #[test]
    fn test_unexplained_square_footage_change() {
        let mut amendment = AmendmentRecord::new("amend-001");
        amendment.rentable_square_feet = Some(dec!(6000));

        let snapshot = ChainSnapshot {
            lease: base_lease(),
            amendments: vec![amendment],
        };
        let findings = check_property(&snapshot);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, ConflictCategory::PropertyConflict);
        assert_eq!(findings[0].field_name, "rentable_square_feet");
        assert_eq!(findings[0].value_a.as_deref(), Some("5000"));
        assert_eq!(findings[0].value_b.as_deref(), Some("6000"));
    }

    #[test]
    fn test_expansion_provision_explains_change() {
        let mut amendment = AmendmentRecord::new("amend-001");
        amendment.rentable_square_feet = Some(dec!(6000));
        amendment.amendment_types.push(AmendmentType::SpaceExpansion);
        amendment.modified_provisions.push(ModifiedProvision {
            provision_name: "Rentable Square Feet".to_string(),
            section_reference: None,
            original_value: Some(ProvisionValue::Number(dec!(5000))),
            amended_value: Some(ProvisionValue::Number(dec!(6000))),
            effective_date: None,
            notes: None,
        });

        // Later restatement of the expanded area is measured against
        // the post-expansion baseline
        let mut later = AmendmentRecord::new("amend-002");
        later.rentable_square_feet = Some(dec!(6000));

        let snapshot = ChainSnapshot {
            lease: base_lease(),
            amendments: vec![amendment, later],
        };
        assert!(check_property(&snapshot).is_empty());
    }

    #[test]
    fn test_matching_property_reference_is_quiet() {
        let mut amendment = AmendmentRecord::new("amend-001");
        amendment.property_reference = Some("100 Main St, Suite 400, Tampa, FL 33602".to_string());
        let snapshot = ChainSnapshot {
            lease: base_lease(),
            amendments: vec![amendment],
        };
        assert!(check_property(&snapshot).is_empty());
    }

    #[test]
    fn test_mismatched_property_reference_flags() {
        let mut amendment = AmendmentRecord::new("amend-001");
        amendment.property_reference = Some("250 Harbor Blvd, Clearwater, FL".to_string());
        let snapshot = ChainSnapshot {
            lease: base_lease(),
            amendments: vec![amendment],
        };
        let findings = check_property(&snapshot);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].field_name, "property_address");
    }
}
