//! Cross-document conflict detection for commercial lease chains
//!
//! Documents are registered into a [`DocumentMemory`] arena (a base
//! lease plus its amendments in registration order), then
//! [`ConflictEngine::detect_conflicts`] replays the chain through a
//! fixed comparator pipeline and returns a severity-classified
//! [`ConflictReport`]. Detection is read-only over a snapshot of the
//! chain, so the same registered documents always produce the same set
//! of conflicts.

pub mod assembler;
pub mod comparators;
pub mod error;
pub mod memory;
mod report;

pub use error::EngineError;
pub use memory::{ChainSnapshot, DocumentMemory};

use lease_types::{AmendmentRecord, ConflictReport, LeaseRecord};
use rust_decimal::Decimal;
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Tunable thresholds for the comparator pipeline
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum relative divergence treated as a rounding artifact
    /// rather than a conflict. Inclusive: a stated amount exactly at
    /// the tolerance passes.
    pub rent_tolerance: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // 0.5%
            rent_tolerance: Decimal::new(5, 3),
        }
    }
}

/// Thread-safe conflict detection engine over a document memory
pub struct ConflictEngine {
    memory: Mutex<DocumentMemory>,
    config: EngineConfig,
}

impl ConflictEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            memory: Mutex::new(DocumentMemory::new()),
            config,
        }
    }

    fn memory(&self) -> std::sync::MutexGuard<'_, DocumentMemory> {
        self.memory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a base lease. Re-registering the same document id
    /// overwrites the stored record and preserves its amendment chain.
    pub fn add_lease(&self, lease: LeaseRecord) -> Result<(), EngineError> {
        let document_id = lease.document_id.clone();
        self.memory().add_lease(lease)?;
        info!(%document_id, "registered base lease");
        Ok(())
    }

    /// Register an amendment against its base lease. The assigned
    /// sequence number (1-based position in the chain) is returned.
    pub fn add_amendment(
        &self,
        amendment: AmendmentRecord,
        base_lease_id: &str,
    ) -> Result<u32, EngineError> {
        let document_id = amendment.document_id.clone();
        let sequence = self.memory().add_amendment(amendment, base_lease_id)?;
        info!(%document_id, %base_lease_id, sequence, "registered amendment");
        Ok(sequence)
    }

    /// Run the full comparator pipeline over one lease chain. The
    /// memory lock is held only while snapshotting; comparison happens
    /// on the cloned chain.
    pub fn detect_conflicts(&self, base_lease_id: &str) -> Result<ConflictReport, EngineError> {
        let snapshot = self.memory().snapshot(base_lease_id)?;
        let conflict_report = report::build_report(&snapshot, &self.config);
        info!(
            %base_lease_id,
            amendments = snapshot.amendments.len(),
            conflicts = conflict_report.total_conflicts(),
            "conflict detection complete"
        );
        Ok(conflict_report)
    }

    /// Fetch the stored chain for a lease without running detection
    pub fn get_chain(&self, base_lease_id: &str) -> (Option<LeaseRecord>, Vec<AmendmentRecord>) {
        self.memory().get_chain(base_lease_id)
    }

    pub fn is_empty(&self) -> bool {
        self.memory().is_empty()
    }

    /// Drop all registered documents
    pub fn clear(&self) {
        self.memory().clear();
    }
}

impl Default for ConflictEngine {
    fn default() -> Self {
        Self::new()
    }
}
