//! Date comparator: term ordering, effective-date plausibility and
//! contradicting expiration changes across the chain

use super::{is_expiration_provision, Finding, Magnitude, ResolutionHint};
use crate::memory::ChainSnapshot;
use lazy_static::lazy_static;
use lease_types::{AmendmentRecord, ConflictCategory, DocumentReference};
use regex::Regex;

lazy_static! {
    /// Language that makes an out-of-order effective date intentional
    static ref RETROACTIVE_PATTERN: Regex =
        Regex::new(r"(?i)\b(retroactive(?:ly)?|nunc\s+pro\s+tunc|relates?\s+back)\b").unwrap();
}

pub fn check_dates(snapshot: &ChainSnapshot) -> Vec<Finding> {
    let mut findings = Vec::new();
    let lease = &snapshot.lease;
    let lease_ref = DocumentReference::lease(&lease.document_id);

    // Base lease term must run forward
    match (lease.commencement_date, lease.expiration_date) {
        (Some(commencement), Some(expiration)) if commencement > expiration => {
            findings.push(Finding {
                category: ConflictCategory::TermConflict,
                field_name: "lease_term".to_string(),
                source_a: lease_ref.clone(),
                source_b: lease_ref.clone(),
                value_a: Some(commencement.format("%Y-%m-%d").to_string()),
                value_b: Some(expiration.format("%Y-%m-%d").to_string()),
                explanation: format!(
                    "Lease commencement date {} falls after its expiration date {}",
                    commencement, expiration
                ),
                magnitude: Magnitude::None,
                resolution: None,
            });
        }
        (Some(_), Some(_)) => {}
        (Some(_), None) | (None, Some(_)) => {
            findings.push(Finding::insufficient(
                ConflictCategory::TermConflict,
                "lease_term",
                lease_ref.clone(),
                lease_ref.clone(),
                "lease term ordering (one of commencement/expiration is missing)",
            ));
        }
        (None, None) => {}
    }

    // Effective dates must be plausible against the lease term and
    // against lower-sequence amendments. The governing expiration moves
    // forward as amendments restate it.
    let mut current_expiration = lease.expiration_date;
    for (idx, amendment) in snapshot.amendments.iter().enumerate() {
        let amend_ref = DocumentReference::amendment(&amendment.document_id);

        let Some(effective) = amendment.effective_date else {
            // Only worth recording once the chain has something to order against
            if snapshot.amendments.len() > 1 || lease.commencement_date.is_some() {
                findings.push(Finding::insufficient(
                    ConflictCategory::DateSequence,
                    "effective_date",
                    lease_ref.clone(),
                    amend_ref,
                    &format!(
                        "effective-date ordering of amendment {}",
                        amendment.document_id
                    ),
                ));
            }
            continue;
        };

        if let Some(commencement) = lease.commencement_date {
            if effective < commencement && !states_retroactive_effect(amendment) {
                let gap = (commencement - effective).num_days();
                findings.push(Finding {
                    category: ConflictCategory::DateSequence,
                    field_name: "effective_date".to_string(),
                    source_a: lease_ref.clone(),
                    source_b: amend_ref.clone(),
                    value_a: Some(commencement.format("%Y-%m-%d").to_string()),
                    value_b: Some(effective.format("%Y-%m-%d").to_string()),
                    explanation: format!(
                        "Amendment {} takes effect {} days before the lease commences, \
                         with no stated retroactive effect",
                        amendment.document_id, gap
                    ),
                    magnitude: Magnitude::Days(gap),
                    resolution: None,
                });
            }
        }

        // An amendment effective after the term ends is only plausible
        // when it is the document extending the term
        if let Some(expiration) = current_expiration {
            let extends_term = amendment.new_expiration_date.is_some()
                || amendment
                    .modified_provisions
                    .iter()
                    .any(|p| is_expiration_provision(&p.provision_name));
            if effective > expiration && !extends_term {
                let gap = (effective - expiration).num_days();
                findings.push(Finding {
                    category: ConflictCategory::DateSequence,
                    field_name: "effective_date".to_string(),
                    source_a: lease_ref.clone(),
                    source_b: amend_ref.clone(),
                    value_a: Some(expiration.format("%Y-%m-%d").to_string()),
                    value_b: Some(effective.format("%Y-%m-%d").to_string()),
                    explanation: format!(
                        "Amendment {} takes effect {} days after the lease term ends, \
                         without extending the term",
                        amendment.document_id, gap
                    ),
                    magnitude: Magnitude::Days(gap),
                    resolution: None,
                });
            }
        }
        if let Some(new_expiration) = amendment.new_expiration_date {
            current_expiration = Some(new_expiration);
        }

        // Later-registered amendments should not jump backwards in time
        // unless they say so
        let prior_latest = snapshot.amendments[..idx]
            .iter()
            .filter_map(|prior| prior.effective_date.map(|d| (prior, d)))
            .max_by_key(|(_, d)| *d);
        if let Some((prior, prior_date)) = prior_latest {
            if effective < prior_date && !states_retroactive_effect(amendment) {
                let gap = (prior_date - effective).num_days();
                findings.push(Finding {
                    category: ConflictCategory::DateSequence,
                    field_name: "effective_date".to_string(),
                    source_a: DocumentReference::amendment(&prior.document_id),
                    source_b: amend_ref.clone(),
                    value_a: Some(prior_date.format("%Y-%m-%d").to_string()),
                    value_b: Some(effective.format("%Y-%m-%d").to_string()),
                    explanation: format!(
                        "Amendment {} (sequence {}) is effective {} days before \
                         earlier-registered amendment {}, with no stated retroactive effect",
                        amendment.document_id, amendment.sequence_number, gap, prior.document_id
                    ),
                    magnitude: Magnitude::Days(gap),
                    resolution: None,
                });
            }
        }
    }

    findings.extend(check_expiration_contradictions(snapshot));
    findings
}

/// Contradicting new expiration dates across amendments. The
/// last-registered value governs; each earlier contradicting value is
/// still reported, graded by whether the governing amendment
/// explicitly superseded it.
fn check_expiration_contradictions(snapshot: &ChainSnapshot) -> Vec<Finding> {
    let mut findings = Vec::new();

    let dated: Vec<(&AmendmentRecord, chrono::NaiveDate)> = snapshot
        .amendments
        .iter()
        .filter_map(|a| a.new_expiration_date.map(|d| (a, d)))
        .collect();
    let Some((governing, governing_date)) = dated.last().copied() else {
        return findings;
    };

    for (earlier, earlier_date) in &dated[..dated.len() - 1] {
        if *earlier_date == governing_date {
            continue;
        }
        let explicit = governing.modified_provisions.iter().any(|p| {
            is_expiration_provision(&p.provision_name)
                && p.original_value.as_ref().and_then(|v| v.as_date()) == Some(*earlier_date)
        });
        findings.push(Finding {
            category: ConflictCategory::TermConflict,
            field_name: "new_expiration_date".to_string(),
            source_a: DocumentReference::amendment(&earlier.document_id),
            source_b: DocumentReference::amendment(&governing.document_id),
            value_a: Some(earlier_date.format("%Y-%m-%d").to_string()),
            value_b: Some(governing_date.format("%Y-%m-%d").to_string()),
            explanation: format!(
                "Amendments {} and {} state different expiration dates; the later \
                 registration {} supersedes the earlier value",
                earlier.document_id,
                governing.document_id,
                if explicit {
                    "explicitly"
                } else {
                    "without restating it"
                }
            ),
            magnitude: Magnitude::Supersession { explicit },
            resolution: Some(ResolutionHint {
                recommended_value: governing_date.format("%Y-%m-%d").to_string(),
                explicit,
            }),
        });
    }

    findings
}

fn states_retroactive_effect(amendment: &AmendmentRecord) -> bool {
    if let Some(recitals) = &amendment.recitals {
        if RETROACTIVE_PATTERN.is_match(recitals) {
            return true;
        }
    }
    amendment
        .modified_provisions
        .iter()
        .filter_map(|p| p.notes.as_deref())
        .any(|notes| RETROACTIVE_PATTERN.is_match(notes))
}
