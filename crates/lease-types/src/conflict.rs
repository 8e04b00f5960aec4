//! Conflict records and the per-analysis report aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Severity levels, ordered least to most severe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational note, not a true conflict
    Info,
    /// Minor inconsistency
    Low,
    /// Notable discrepancy requiring review
    Medium,
    /// Significant conflict affecting key terms
    High,
    /// Fundamental contradiction requiring immediate attention
    Critical,
}

/// Categories of conflicts between lease documents
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ConflictCategory {
    /// Contradicting lease term dates
    TermConflict,
    /// Contradicting rent amounts
    RentConflict,
    /// Mismatched party information
    PartyConflict,
    /// Inconsistent property details
    PropertyConflict,
    /// Contradicting options or rights
    OptionConflict,
    /// Contradicting contractual clauses
    ClauseConflict,
    /// Amendment effective dates out of chain order
    DateSequence,
    /// Mathematical inconsistency within or across documents
    CalculationError,
    /// Amendment cites a prior value the chain contradicts
    MissingReference,
    /// Supersession without a stated prior value
    SupersededTerms,
    Other,
}

/// Document kind a reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Lease,
    Amendment,
}

/// Citation pointer into the lease/amendment chain, never used for mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReference {
    pub document_id: String,
    pub document_type: DocumentType,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
}

impl DocumentReference {
    pub fn lease(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            document_type: DocumentType::Lease,
            section: None,
            excerpt: None,
        }
    }

    pub fn amendment(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            document_type: DocumentType::Amendment,
            section: None,
            excerpt: None,
        }
    }
}

/// The two document references and divergent values behind a conflict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictEvidence {
    pub source_a: DocumentReference,
    pub source_b: DocumentReference,
    #[serde(default)]
    pub value_a: Option<String>,
    #[serde(default)]
    pub value_b: Option<String>,
    pub explanation: String,
}

/// Suggested way to resolve a conflict; never applied by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedResolution {
    /// "auto" when the chain makes the answer explicit, "review" otherwise
    pub resolution_type: String,
    #[serde(default)]
    pub recommended_value: Option<String>,
    pub rationale: String,
    pub confidence: f64,
}

/// One detected contradiction; a value object created once per finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub conflict_id: String,
    pub category: ConflictCategory,
    pub severity: Severity,

    pub field_name: String,
    pub description: String,

    pub evidence: ConflictEvidence,
    #[serde(default)]
    pub suggested_resolutions: Vec<SuggestedResolution>,

    /// Mutable only by an external resolution workflow
    #[serde(default)]
    pub is_resolved: bool,

    pub detected_at: DateTime<Utc>,
}

/// Aggregate of one detection run over a base lease and its chain
///
/// A report is a pure snapshot: re-running detection yields a new
/// report rather than mutating an old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub report_id: String,
    pub generated_at: DateTime<Utc>,

    pub base_lease_id: String,
    pub amendment_ids: Vec<String>,

    pub conflicts: Vec<Conflict>,
}

impl ConflictReport {
    pub fn new(base_lease_id: impl Into<String>, amendment_ids: Vec<String>) -> Self {
        Self {
            report_id: Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            base_lease_id: base_lease_id.into(),
            amendment_ids,
            conflicts: Vec::new(),
        }
    }

    pub fn total_conflicts(&self) -> usize {
        self.conflicts.len()
    }

    pub fn critical_conflicts(&self) -> Vec<&Conflict> {
        self.conflicts_by_severity(Severity::Critical)
    }

    pub fn unresolved_conflicts(&self) -> Vec<&Conflict> {
        self.conflicts.iter().filter(|c| !c.is_resolved).collect()
    }

    pub fn conflicts_by_severity(&self, severity: Severity) -> Vec<&Conflict> {
        self.conflicts
            .iter()
            .filter(|c| c.severity == severity)
            .collect()
    }

    pub fn conflicts_by_category(&self, category: ConflictCategory) -> Vec<&Conflict> {
        self.conflicts
            .iter()
            .filter(|c| c.category == category)
            .collect()
    }

    /// Read-side projection: counts by severity and category plus the
    /// unresolved tally. Pure; never mutates the report.
    pub fn summary(&self) -> ReportSummary {
        let mut by_severity = BTreeMap::new();
        let mut by_category = BTreeMap::new();
        for conflict in &self.conflicts {
            *by_severity.entry(conflict.severity).or_insert(0usize) += 1;
            *by_category.entry(conflict.category).or_insert(0usize) += 1;
        }
        ReportSummary {
            total: self.conflicts.len(),
            by_severity,
            by_category,
            unresolved: self.unresolved_conflicts().len(),
        }
    }
}

/// Serializable summary projection of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_category: BTreeMap<ConflictCategory, usize>,
    pub unresolved: usize,
}
