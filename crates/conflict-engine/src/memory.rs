//! Document Memory: the authoritative lease -> amendments registry
//!
//! Documents are stored in an arena keyed by stable string ids, with
//! the chain held as an ordered id list per base lease. Relationships
//! are never embedded object references, so detection can clone a
//! consistent snapshot and compute outside any lock.

use crate::error::EngineError;
use lease_types::{AmendmentRecord, LeaseRecord};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

/// Consistent copy of one lease chain taken at detection time
#[derive(Debug, Clone)]
pub struct ChainSnapshot {
    pub lease: LeaseRecord,
    /// Amendments in registration order (sequence_number ascending)
    pub amendments: Vec<AmendmentRecord>,
}

impl ChainSnapshot {
    pub fn amendment_ids(&self) -> Vec<String> {
        self.amendments
            .iter()
            .map(|a| a.document_id.clone())
            .collect()
    }
}

/// In-memory registry of base leases and their amendment chains
#[derive(Debug, Default)]
pub struct DocumentMemory {
    leases: HashMap<String, LeaseRecord>,
    amendments: HashMap<String, AmendmentRecord>,
    /// lease_id -> amendment ids in registration order
    chains: HashMap<String, Vec<String>>,
}

impl DocumentMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a base lease. Re-registration overwrites the prior
    /// snapshot without touching already-linked amendments.
    pub fn add_lease(&mut self, lease: LeaseRecord) -> Result<(), EngineError> {
        validate_lease(&lease)?;
        debug!(lease_id = %lease.document_id, "registering base lease");
        self.chains.entry(lease.document_id.clone()).or_default();
        self.leases.insert(lease.document_id.clone(), lease);
        Ok(())
    }

    /// Register an amendment and append it to its base lease's chain.
    /// The assigned sequence number (1-based, contiguous) is returned.
    pub fn add_amendment(
        &mut self,
        mut amendment: AmendmentRecord,
        base_lease_id: &str,
    ) -> Result<u32, EngineError> {
        validate_amendment(&amendment)?;
        let chain = self
            .chains
            .get_mut(base_lease_id)
            .ok_or_else(|| EngineError::UnknownBaseLease {
                amendment_id: amendment.document_id.clone(),
                base_lease_id: base_lease_id.to_string(),
            })?;

        let sequence = chain.len() as u32 + 1;
        amendment.sequence_number = sequence;
        debug!(
            amendment_id = %amendment.document_id,
            base_lease_id,
            sequence,
            "registering amendment"
        );
        chain.push(amendment.document_id.clone());
        self.amendments
            .insert(amendment.document_id.clone(), amendment);
        Ok(sequence)
    }

    /// The lease and its amendments in registration order, cloned so
    /// callers never observe a half-updated chain.
    pub fn get_chain(&self, lease_id: &str) -> (Option<LeaseRecord>, Vec<AmendmentRecord>) {
        let lease = self.leases.get(lease_id).cloned();
        let amendments = self
            .chains
            .get(lease_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.amendments.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        (lease, amendments)
    }

    pub fn snapshot(&self, lease_id: &str) -> Result<ChainSnapshot, EngineError> {
        let (lease, amendments) = self.get_chain(lease_id);
        let lease = lease.ok_or_else(|| EngineError::NotFound(lease_id.to_string()))?;
        Ok(ChainSnapshot { lease, amendments })
    }

    pub fn is_empty(&self) -> bool {
        self.leases.is_empty() && self.amendments.is_empty()
    }

    /// Reset all state between independent analysis runs
    pub fn clear(&mut self) {
        debug!("clearing document memory");
        self.leases.clear();
        self.amendments.clear();
        self.chains.clear();
    }
}

fn non_negative(value: Option<Decimal>, field: &str) -> Result<(), EngineError> {
    match value {
        Some(v) if v.is_sign_negative() => Err(EngineError::Validation(format!(
            "{} must not be negative",
            field
        ))),
        _ => Ok(()),
    }
}

fn validate_lease(lease: &LeaseRecord) -> Result<(), EngineError> {
    if lease.document_id.trim().is_empty() {
        return Err(EngineError::Validation(
            "lease document_id must not be empty".to_string(),
        ));
    }
    non_negative(lease.base_rent_monthly, "base_rent_monthly")?;
    non_negative(lease.base_rent_annual, "base_rent_annual")?;
    non_negative(lease.rent_per_sqft, "rent_per_sqft")?;
    non_negative(lease.rentable_square_feet, "rentable_square_feet")?;
    non_negative(lease.usable_square_feet, "usable_square_feet")?;
    non_negative(lease.security_deposit, "security_deposit")?;
    Ok(())
}

fn validate_amendment(amendment: &AmendmentRecord) -> Result<(), EngineError> {
    if amendment.document_id.trim().is_empty() {
        return Err(EngineError::Validation(
            "amendment document_id must not be empty".to_string(),
        ));
    }
    non_negative(amendment.additional_rent, "additional_rent")?;
    non_negative(amendment.rent_credit, "rent_credit")?;
    non_negative(amendment.rentable_square_feet, "rentable_square_feet")?;
    for provision in &amendment.modified_provisions {
        if provision.provision_name.trim().is_empty() {
            return Err(EngineError::Validation(
                "modified provision name must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_add_lease_and_snapshot() {
        let mut memory = DocumentMemory::new();
        memory.add_lease(LeaseRecord::new("lease-001")).unwrap();

        let snapshot = memory.snapshot("lease-001").unwrap();
        assert_eq!(snapshot.lease.document_id, "lease-001");
        assert!(snapshot.amendments.is_empty());
    }

    #[test]
    fn test_amendment_sequence_numbers_are_contiguous() {
        let mut memory = DocumentMemory::new();
        memory.add_lease(LeaseRecord::new("lease-001")).unwrap();

        for i in 1..=3 {
            let seq = memory
                .add_amendment(AmendmentRecord::new(format!("amend-{i}")), "lease-001")
                .unwrap();
            assert_eq!(seq, i);
        }

        let snapshot = memory.snapshot("lease-001").unwrap();
        let sequences: Vec<u32> = snapshot
            .amendments
            .iter()
            .map(|a| a.sequence_number)
            .collect();
        assert_eq!(sequences, vec![1, 2, 3]);
    }

    #[test]
    fn test_orphan_amendment_is_rejected() {
        let mut memory = DocumentMemory::new();
        let err = memory
            .add_amendment(AmendmentRecord::new("amend-001"), "lease-missing")
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownBaseLease { .. }));
    }

    #[test]
    fn test_reregistration_keeps_amendment_links() {
        let mut memory = DocumentMemory::new();
        memory.add_lease(LeaseRecord::new("lease-001")).unwrap();
        memory
            .add_amendment(AmendmentRecord::new("amend-001"), "lease-001")
            .unwrap();

        // Overwrite the lease snapshot with a richer extraction
        let mut updated = LeaseRecord::new("lease-001");
        updated.base_rent_monthly = Some(dec!(10000));
        memory.add_lease(updated).unwrap();

        let snapshot = memory.snapshot("lease-001").unwrap();
        assert_eq!(snapshot.lease.base_rent_monthly, Some(dec!(10000)));
        assert_eq!(snapshot.amendments.len(), 1);
    }

    #[test]
    fn test_unknown_chain_returns_none_and_empty() {
        let memory = DocumentMemory::new();
        let (lease, amendments) = memory.get_chain("nope");
        assert!(lease.is_none());
        assert!(amendments.is_empty());
    }

    #[test]
    fn test_validation_rejects_bad_input() {
        let mut memory = DocumentMemory::new();
        assert!(matches!(
            memory.add_lease(LeaseRecord::new("  ")),
            Err(EngineError::Validation(_))
        ));

        let mut negative = LeaseRecord::new("lease-001");
        negative.base_rent_monthly = Some(dec!(-5));
        assert!(matches!(
            memory.add_lease(negative),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_clear_resets_state() {
        let mut memory = DocumentMemory::new();
        memory.add_lease(LeaseRecord::new("lease-001")).unwrap();
        memory
            .add_amendment(AmendmentRecord::new("amend-001"), "lease-001")
            .unwrap();
        assert!(!memory.is_empty());

        memory.clear();
        assert!(memory.is_empty());
        assert!(memory.get_chain("lease-001").0.is_none());
    }
}
