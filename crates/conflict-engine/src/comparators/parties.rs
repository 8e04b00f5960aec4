//! Party comparator: landlord/tenant identity across the chain
//!
//! Legal names are compared after normalization so restatements that
//! differ only in case, punctuation or spacing do not flag. A real
//! name change is a conflict unless the amendment documents an
//! assignment.

use super::{is_assignment_provision, Finding, Magnitude};
use crate::memory::ChainSnapshot;
use lazy_static::lazy_static;
use lease_types::{AmendmentRecord, ConflictCategory, DocumentReference};
use regex::Regex;

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Lowercase, strip punctuation, collapse whitespace
pub(crate) fn normalize_name(name: &str) -> String {
    NON_ALNUM
        .replace_all(&name.to_lowercase(), " ")
        .trim()
        .to_string()
}

fn documents_assignment(amendment: &AmendmentRecord) -> bool {
    amendment.has_type(lease_types::AmendmentType::Assignment)
        || amendment
            .modified_provisions
            .iter()
            .any(|p| is_assignment_provision(&p.provision_name))
}

pub fn check_parties(snapshot: &ChainSnapshot) -> Vec<Finding> {
    let mut findings = Vec::new();
    let lease = &snapshot.lease;
    let lease_ref = DocumentReference::lease(&lease.document_id);

    // Current-name tracking: an explained change moves the baseline
    let mut landlord = lease
        .landlord
        .as_ref()
        .map(|p| (p.legal_name.clone(), lease_ref.clone()));
    let mut tenant = lease
        .tenant
        .as_ref()
        .map(|p| (p.legal_name.clone(), lease_ref.clone()));

    for amendment in &snapshot.amendments {
        let amend_ref = DocumentReference::amendment(&amendment.document_id);
        let explained = documents_assignment(amendment);

        for (role, current, stated) in [
            ("landlord", &mut landlord, amendment.landlord_name.as_ref()),
            ("tenant", &mut tenant, amendment.tenant_name.as_ref()),
        ] {
            let Some(stated) = stated.cloned() else {
                continue;
            };
            match current.clone() {
                Some((known, known_ref)) if normalize_name(&known) != normalize_name(&stated) => {
                    if explained {
                        *current = Some((stated, amend_ref.clone()));
                    } else {
                        findings.push(Finding {
                            category: ConflictCategory::PartyConflict,
                            field_name: role.to_string(),
                            source_a: known_ref,
                            source_b: amend_ref.clone(),
                            value_a: Some(known.clone()),
                            value_b: Some(stated.clone()),
                            explanation: format!(
                                "Amendment {} names a different {} ({:?} vs {:?}) without an \
                                 assignment provision explaining the change",
                                amendment.document_id, role, known, stated
                            ),
                            magnitude: Magnitude::None,
                            resolution: None,
                        });
                    }
                }
                Some(_) => {}
                None => *current = Some((stated, amend_ref.clone())),
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use lease_types::{LeaseRecord, ModifiedProvision, Party, ProvisionValue};

    fn base_lease() -> LeaseRecord {
        let mut lease = LeaseRecord::new("lease-001");
        lease.landlord = Some(Party::named("Harbor Point Properties, L.L.C."));
        lease.tenant = Some(Party::named("Acme Corp LLC"));
        lease
    }

    fn amendment_with_tenant(id: &str, tenant: &str) -> AmendmentRecord {
        let mut amendment = AmendmentRecord::new(id);
        amendment.tenant_name = Some(tenant.to_string());
        amendment
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Acme Corp, L.L.C."), "acme corp l l c");
        assert_eq!(normalize_name("  ACME   CORP LLC "), "acme corp llc");
    }

    #[test]
    fn test_stylistic_restatement_does_not_flag() {
        let snapshot = ChainSnapshot {
            lease: base_lease(),
            amendments: vec![amendment_with_tenant("amend-001", "ACME CORP, LLC")],
        };
        assert!(check_parties(&snapshot).is_empty());
    }

    #[test]
    fn test_unexplained_tenant_change_flags() {
        let snapshot = ChainSnapshot {
            lease: base_lease(),
            amendments: vec![amendment_with_tenant("amend-001", "Bolt Industries Inc")],
        };
        let findings = check_parties(&snapshot);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, ConflictCategory::PartyConflict);
        assert_eq!(findings[0].field_name, "tenant");
        assert_eq!(findings[0].value_a.as_deref(), Some("Acme Corp LLC"));
    }

    #[test]
    fn test_assignment_explains_the_change() {
        let mut amendment = amendment_with_tenant("amend-001", "Bolt Industries Inc");
        amendment.modified_provisions.push(ModifiedProvision {
            provision_name: "Assignment of Lease".to_string(),
            section_reference: None,
            original_value: Some(ProvisionValue::Text("Acme Corp LLC".to_string())),
            amended_value: Some(ProvisionValue::Text("Bolt Industries Inc".to_string())),
            effective_date: None,
            notes: None,
        });
        // A later amendment naming the assignee compares against the
        // post-assignment baseline, not the original lease
        let follow_up = amendment_with_tenant("amend-002", "Bolt Industries, Inc.");

        let snapshot = ChainSnapshot {
            lease: base_lease(),
            amendments: vec![amendment, follow_up],
        };
        assert!(check_parties(&snapshot).is_empty());
    }

    #[test]
    fn test_assignment_type_alone_explains() {
        let mut amendment = amendment_with_tenant("amend-001", "Bolt Industries Inc");
        amendment
            .amendment_types
            .push(lease_types::AmendmentType::Assignment);
        let snapshot = ChainSnapshot {
            lease: base_lease(),
            amendments: vec![amendment],
        };
        assert!(check_parties(&snapshot).is_empty());
    }
}
