//! Shared data model for lease document analysis
//!
//! These types are the contract between the external extractor (which
//! produces validated lease/amendment records) and the conflict
//! detection engine (which only reads them).

pub mod amendment;
pub mod conflict;
pub mod lease;
pub mod money;

pub use amendment::{AmendmentRecord, AmendmentType, ModifiedProvision, ProvisionValue};
pub use conflict::{
    Conflict, ConflictCategory, ConflictEvidence, ConflictReport, DocumentReference, DocumentType,
    ReportSummary, Severity, SuggestedResolution,
};
pub use lease::{
    Address, EscalationType, LeaseRecord, LeaseType, Party, PropertyUseType, RenewalOption,
    RentEscalation, TerminationRight,
};
