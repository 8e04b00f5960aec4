//! Conflict assembler: fixed severity lookup and conflict construction
//!
//! Severity is a pure function of the finding's category and magnitude
//! band. Nothing here depends on call order, wall-clock state, or any
//! source of randomness, so repeated runs over the same chain classify
//! identically.

use crate::comparators::{Finding, Magnitude, ResolutionHint};
use chrono::{DateTime, Utc};
use lease_types::{Conflict, ConflictCategory, ConflictEvidence, Severity, SuggestedResolution};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Divergence band edges for financial categories
fn critical_band() -> Decimal {
    Decimal::new(10, 2) // 10%
}

fn high_band() -> Decimal {
    Decimal::new(2, 2) // 2%
}

/// The fixed severity table
pub fn classify(category: ConflictCategory, magnitude: Magnitude) -> Severity {
    if matches!(magnitude, Magnitude::Insufficient) {
        return Severity::Info;
    }

    match category {
        ConflictCategory::TermConflict => match magnitude {
            // An earlier expiration value explicitly superseded later is
            // informational; silently dropped values need review
            Magnitude::Supersession { explicit: true } => Severity::Info,
            Magnitude::Supersession { explicit: false } => Severity::Medium,
            _ => Severity::Critical,
        },
        ConflictCategory::RentConflict
        | ConflictCategory::CalculationError
        | ConflictCategory::MissingReference => match magnitude {
            Magnitude::Relative(divergence) if divergence > critical_band() => Severity::Critical,
            Magnitude::Relative(divergence) if divergence >= high_band() => Severity::High,
            _ => Severity::Medium,
        },
        ConflictCategory::PartyConflict | ConflictCategory::PropertyConflict => Severity::High,
        ConflictCategory::SupersededTerms => Severity::Medium,
        ConflictCategory::OptionConflict | ConflictCategory::ClauseConflict => Severity::Low,
        ConflictCategory::DateSequence => match magnitude {
            Magnitude::Days(gap) if gap <= 7 => Severity::Info,
            Magnitude::Days(gap) if gap <= 30 => Severity::Low,
            Magnitude::Days(gap) if gap <= 180 => Severity::Medium,
            Magnitude::Days(_) => Severity::High,
            _ => Severity::Low,
        },
        ConflictCategory::Other => Severity::Info,
    }
}

/// Precedence policy: the highest-sequence amendment's value governs,
/// with confidence scaled by how explicit its language was. At most
/// one resolution per conflict.
pub fn suggest_resolution(hint: &ResolutionHint) -> SuggestedResolution {
    let (resolution_type, confidence) = if hint.explicit {
        ("auto", 0.9)
    } else {
        ("review", 0.5)
    };
    SuggestedResolution {
        resolution_type: resolution_type.to_string(),
        recommended_value: Some(hint.recommended_value.clone()),
        rationale: "Most recently registered amendment governs the provision".to_string(),
        confidence,
    }
}

/// Turn one raw finding into a fully-formed conflict record
pub fn assemble(finding: Finding, detected_at: DateTime<Utc>) -> Conflict {
    let severity = classify(finding.category, finding.magnitude);
    let suggested_resolutions = finding
        .resolution
        .as_ref()
        .map(suggest_resolution)
        .into_iter()
        .collect();

    Conflict {
        conflict_id: Uuid::new_v4().to_string(),
        category: finding.category,
        severity,
        field_name: finding.field_name,
        description: finding.explanation.clone(),
        evidence: ConflictEvidence {
            source_a: finding.source_a,
            source_b: finding.source_b,
            value_a: finding.value_a,
            value_b: finding.value_b,
            explanation: finding.explanation,
        },
        suggested_resolutions,
        is_resolved: false,
        detected_at,
    }
}
