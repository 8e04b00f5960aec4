//! Supersession/calculation validator: every explicit original_value
//! must match what the chain actually says came before it

use super::{lease_value_for, Finding, Magnitude, ResolutionHint};
use crate::comparators::parties::normalize_name;
use crate::memory::ChainSnapshot;
use crate::EngineConfig;
use lease_types::money::{relative_divergence, within_tolerance};
use lease_types::{ConflictCategory, DocumentReference, ProvisionValue};
use rust_decimal::Decimal;

pub fn check_supersession(snapshot: &ChainSnapshot, config: &EngineConfig) -> Vec<Finding> {
    let mut findings = Vec::new();
    let lease = &snapshot.lease;

    for (idx, amendment) in snapshot.amendments.iter().enumerate() {
        let amend_ref = DocumentReference::amendment(&amendment.document_id);

        for provision in &amendment.modified_provisions {
            let Some(stated) = provision.original_value.as_ref() else {
                continue;
            };

            // Actual prior value: nearest earlier amendment of the same
            // provision, else the base lease's stated value
            let prior = snapshot.amendments[..idx]
                .iter()
                .rev()
                .flat_map(|earlier| {
                    earlier
                        .modifications_named(&provision.provision_name)
                        .into_iter()
                        .filter_map(|m| m.amended_value.clone())
                        .map(|value| (value, DocumentReference::amendment(&earlier.document_id)))
                        .collect::<Vec<_>>()
                })
                .next()
                .or_else(|| {
                    lease_value_for(lease, &provision.provision_name)
                        .map(|value| (value, DocumentReference::lease(&lease.document_id)))
                });

            let Some((prior_value, prior_ref)) = prior else {
                // The chain never stated this provision; nothing to verify
                continue;
            };

            if let Some(divergence) = value_mismatch(&prior_value, stated, config.rent_tolerance) {
                findings.push(Finding {
                    category: ConflictCategory::MissingReference,
                    field_name: provision.provision_name.clone(),
                    source_a: prior_ref,
                    source_b: amend_ref.clone(),
                    value_a: Some(prior_value.to_string()),
                    value_b: Some(stated.to_string()),
                    explanation: format!(
                        "Amendment {} says {:?} was previously {} but the chain says {}",
                        amendment.document_id,
                        provision.provision_name,
                        stated,
                        prior_value
                    ),
                    magnitude: divergence.map(Magnitude::Relative).unwrap_or(Magnitude::None),
                    resolution: provision.amended_value.as_ref().map(|v| ResolutionHint {
                        recommended_value: v.to_string(),
                        explicit: true,
                    }),
                });
            }
        }
    }

    findings
}

/// Some(divergence) when the values disagree: money under the relative
/// tolerance, everything else exactly (text up to case/whitespace)
fn value_mismatch(
    prior: &ProvisionValue,
    stated: &ProvisionValue,
    tolerance: Decimal,
) -> Option<Option<Decimal>> {
    match (prior, stated) {
        (ProvisionValue::Money(a), ProvisionValue::Money(b)) => {
            if within_tolerance(*b, *a, tolerance) {
                None
            } else {
                Some(relative_divergence(*b, *a))
            }
        }
        (ProvisionValue::Number(a), ProvisionValue::Number(b)) => {
            (a != b).then(|| relative_divergence(*b, *a))
        }
        (ProvisionValue::Date(a), ProvisionValue::Date(b)) => (a != b).then_some(None),
        (ProvisionValue::Text(a), ProvisionValue::Text(b)) => {
            (normalize_name(a) != normalize_name(b)).then_some(None)
        }
        // Cross-type claims always disagree
        _ => Some(None),
    }
}
