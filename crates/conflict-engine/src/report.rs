//! Report assembly: deduplication and deterministic ordering
//!
//! Comparators run independently and can flag the same underlying
//! discrepancy from different angles (a rent replay and a prior-value
//! check both looking at the same amendment field, for instance). The
//! report keeps one conflict per (field, document pair), preferring
//! the more specific category.

use crate::assembler;
use crate::comparators::{self, Finding};
use crate::memory::ChainSnapshot;
use crate::EngineConfig;
use chrono::Utc;
use lease_types::{ConflictCategory, ConflictReport};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// Specificity ranking used when two comparators flag the same field on
/// the same document pair. Arithmetic categories carry the computation
/// that proves the discrepancy, so they outrank the broader domain
/// categories.
fn specificity(category: ConflictCategory) -> u8 {
    match category {
        ConflictCategory::CalculationError => 5,
        ConflictCategory::MissingReference => 4,
        ConflictCategory::SupersededTerms => 3,
        ConflictCategory::TermConflict
        | ConflictCategory::RentConflict
        | ConflictCategory::PartyConflict
        | ConflictCategory::PropertyConflict
        | ConflictCategory::OptionConflict
        | ConflictCategory::ClauseConflict
        | ConflictCategory::DateSequence => 2,
        ConflictCategory::Other => 1,
    }
}

fn dedup_key(finding: &Finding) -> (String, String, String) {
    (
        finding.field_name.to_lowercase(),
        finding.source_a.document_id.clone(),
        finding.source_b.document_id.clone(),
    )
}

/// Collapse findings that describe the same discrepancy. First finding
/// wins within a specificity tier, so comparator order stays the final
/// tie-break and repeated runs produce the same survivor.
pub(crate) fn dedup(findings: Vec<Finding>) -> Vec<Finding> {
    let mut kept: Vec<Finding> = Vec::with_capacity(findings.len());
    let mut index: HashMap<(String, String, String), usize> = HashMap::new();

    for finding in findings {
        let key = dedup_key(&finding);
        match index.get(&key) {
            None => {
                index.insert(key, kept.len());
                kept.push(finding);
            }
            Some(&at) => {
                if specificity(finding.category) > specificity(kept[at].category) {
                    debug!(
                        field = %finding.field_name,
                        kept = ?finding.category,
                        dropped = ?kept[at].category,
                        "replacing duplicate finding with more specific category"
                    );
                    kept[at] = finding;
                }
            }
        }
    }

    kept
}

/// Run the full comparator pipeline over a snapshot and assemble the
/// final report. All conflicts in one report share a single detection
/// timestamp.
pub(crate) fn build_report(snapshot: &ChainSnapshot, config: &EngineConfig) -> ConflictReport {
    let detected_at = Utc::now();
    let findings = dedup(comparators::run_all(snapshot, config));

    let conflicts = findings
        .into_iter()
        .map(|finding| assembler::assemble(finding, detected_at))
        .collect();

    ConflictReport {
        report_id: Uuid::new_v4().to_string(),
        generated_at: detected_at,
        base_lease_id: snapshot.lease.document_id.clone(),
        amendment_ids: snapshot.amendment_ids(),
        conflicts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparators::Magnitude;
    use lease_types::DocumentReference;
    use rust_decimal_macros::dec;

    fn finding(category: ConflictCategory, field: &str, a: &str, b: &str) -> Finding {
        Finding {
            category,
            field_name: field.to_string(),
            source_a: DocumentReference::lease(a),
            source_b: DocumentReference::amendment(b),
            value_a: None,
            value_b: None,
            explanation: format!("{field} discrepancy"),
            magnitude: Magnitude::Relative(dec!(0.025)),
            resolution: None,
        }
    }

    #[test]
    fn test_more_specific_category_wins() {
        let findings = vec![
            finding(ConflictCategory::RentConflict, "Base Rent", "l1", "a1"),
            finding(ConflictCategory::MissingReference, "Base Rent", "l1", "a1"),
        ];
        let kept = dedup(findings);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].category, ConflictCategory::MissingReference);
    }

    #[test]
    fn test_first_wins_within_tier() {
        let mut first = finding(ConflictCategory::RentConflict, "Base Rent", "l1", "a1");
        first.explanation = "first".to_string();
        let mut second = finding(ConflictCategory::DateSequence, "Base Rent", "l1", "a1");
        second.explanation = "second".to_string();

        let kept = dedup(vec![first, second]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].explanation, "first");
    }

    #[test]
    fn test_distinct_document_pairs_both_survive() {
        let findings = vec![
            finding(ConflictCategory::RentConflict, "Base Rent", "l1", "a1"),
            finding(ConflictCategory::RentConflict, "Base Rent", "l1", "a2"),
        ];
        assert_eq!(dedup(findings).len(), 2);
    }

    #[test]
    fn test_field_key_is_case_insensitive() {
        let findings = vec![
            finding(ConflictCategory::RentConflict, "Base Rent", "l1", "a1"),
            finding(ConflictCategory::SupersededTerms, "base rent", "l1", "a1"),
        ];
        let kept = dedup(findings);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].category, ConflictCategory::SupersededTerms);
    }
}
