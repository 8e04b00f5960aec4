//! Rent comparator: chain-wise rent recomputation and in-document
//! calculation checks
//!
//! Expected rent is recomputed by replaying, in sequence order, every
//! rent-related modification and every recomputable escalation
//! effective on or before the query date. Stated values are then
//! compared against the recomputation under a relative tolerance.

use super::{is_annual_rent_provision, is_rent_provision, Finding, Magnitude, ResolutionHint};
use crate::memory::ChainSnapshot;
use crate::EngineConfig;
use chrono::NaiveDate;
use lease_types::money::{format_usd, relative_divergence, within_tolerance};
use lease_types::{
    AmendmentRecord, ConflictCategory, DocumentReference, EscalationType, RentEscalation,
};
use rust_decimal::Decimal;

pub fn check_rent(snapshot: &ChainSnapshot, config: &EngineConfig) -> Vec<Finding> {
    let mut findings = Vec::new();
    let lease = &snapshot.lease;
    let lease_ref = DocumentReference::lease(&lease.document_id);

    findings.extend(check_lease_internal(snapshot, config));

    // Replay the chain: expected monthly rent plus the document that
    // most recently established it
    let mut expected = lease.base_rent_monthly;
    let mut expected_source = lease_ref.clone();

    let last_query = snapshot
        .amendments
        .iter()
        .filter_map(|a| a.effective_date)
        .max();
    let occurrences = escalation_occurrences(lease.rent_escalations.as_slice(), last_query);
    let mut next_occurrence = 0usize;

    // Undated escalations cannot be replayed against any query date
    if !snapshot.amendments.is_empty()
        && lease
            .rent_escalations
            .iter()
            .any(|e| e.escalation_type != EscalationType::None && e.effective_date.is_none())
    {
        findings.push(Finding::insufficient(
            ConflictCategory::RentConflict,
            "rent_escalation",
            lease_ref.clone(),
            lease_ref.clone(),
            "a rent escalation with no stated effective date",
        ));
    }

    for amendment in &snapshot.amendments {
        let amend_ref = DocumentReference::amendment(&amendment.document_id);

        // Bring the expectation forward through escalations due by the
        // amendment's effective date
        if let Some(query_date) = amendment.effective_date {
            while next_occurrence < occurrences.len() && occurrences[next_occurrence].0 <= query_date
            {
                let (_, escalation) = occurrences[next_occurrence];
                match apply_escalation(expected, escalation) {
                    Ok(escalated) => expected = escalated,
                    Err(reason) => findings.push(Finding::insufficient(
                        ConflictCategory::RentConflict,
                        "rent_escalation",
                        lease_ref.clone(),
                        amend_ref.clone(),
                        reason,
                    )),
                }
                next_occurrence += 1;
            }
        }

        for provision in &amendment.modified_provisions {
            if !is_rent_provision(&provision.provision_name)
                || is_annual_rent_provision(&provision.provision_name)
            {
                continue;
            }

            // The amendment's claim about the rent in force before it
            let stated_original = provision.original_value.as_ref().and_then(|v| v.as_money());
            if let (Some(stated), Some(expected_rent)) = (stated_original, expected) {
                if !within_tolerance(stated, expected_rent, config.rent_tolerance) {
                    let divergence =
                        relative_divergence(stated, expected_rent).unwrap_or(Decimal::ONE);
                    findings.push(Finding {
                        category: ConflictCategory::RentConflict,
                        field_name: provision.provision_name.clone(),
                        source_a: expected_source.clone(),
                        source_b: amend_ref.clone(),
                        value_a: Some(format_usd(expected_rent)),
                        value_b: Some(format_usd(stated)),
                        explanation: format!(
                            "Amendment {} states prior rent of {} but the chain puts rent at {} \
                             at that point",
                            amendment.document_id,
                            format_usd(stated),
                            format_usd(expected_rent)
                        ),
                        magnitude: Magnitude::Relative(divergence),
                        resolution: suggest_latest_rent(amendment, provision.provision_name.as_str()),
                    });
                }
            }

            if let Some(new_rent) = provision.amended_value.as_ref().and_then(|v| v.as_money()) {
                expected = Some(new_rent);
                expected_source = amend_ref.clone();
            }
        }

        findings.extend(check_amendment_internal(amendment, config));
    }

    findings
}

/// `annual ~= monthly x 12` and `annual ~= psf x RSF` inside the base lease
fn check_lease_internal(snapshot: &ChainSnapshot, config: &EngineConfig) -> Vec<Finding> {
    let mut findings = Vec::new();
    let lease = &snapshot.lease;
    let lease_ref = DocumentReference::lease(&lease.document_id);

    if let (Some(monthly), Some(annual)) = (lease.base_rent_monthly, lease.base_rent_annual) {
        let derived = monthly * Decimal::from(12);
        if !within_tolerance(annual, derived, config.rent_tolerance) {
            let divergence = relative_divergence(annual, derived).unwrap_or(Decimal::ONE);
            findings.push(Finding {
                category: ConflictCategory::CalculationError,
                field_name: "base_rent_annual".to_string(),
                source_a: lease_ref.clone(),
                source_b: lease_ref.clone(),
                value_a: Some(format_usd(derived)),
                value_b: Some(format_usd(annual)),
                explanation: format!(
                    "Stated annual rent {} does not equal monthly rent {} x 12 ({})",
                    format_usd(annual),
                    format_usd(monthly),
                    format_usd(derived)
                ),
                magnitude: Magnitude::Relative(divergence),
                resolution: None,
            });
        }
    }

    if let (Some(psf), Some(rsf), Some(annual)) = (
        lease.rent_per_sqft,
        lease.rentable_square_feet,
        lease.base_rent_annual,
    ) {
        let derived = psf * rsf;
        if !within_tolerance(annual, derived, config.rent_tolerance) {
            let divergence = relative_divergence(annual, derived).unwrap_or(Decimal::ONE);
            findings.push(Finding {
                category: ConflictCategory::CalculationError,
                field_name: "rent_per_sqft".to_string(),
                source_a: lease_ref.clone(),
                source_b: lease_ref,
                value_a: Some(format_usd(derived)),
                value_b: Some(format_usd(annual)),
                explanation: format!(
                    "Stated annual rent {} does not equal {}/SF x {} SF ({})",
                    format_usd(annual),
                    format_usd(psf),
                    rsf.normalize(),
                    format_usd(derived)
                ),
                magnitude: Magnitude::Relative(divergence),
                resolution: None,
            });
        }
    }

    findings
}

/// Monthly vs annual consistency of rent figures amended together
fn check_amendment_internal(amendment: &AmendmentRecord, config: &EngineConfig) -> Vec<Finding> {
    let monthly_new = amendment
        .modified_provisions
        .iter()
        .filter(|p| {
            is_rent_provision(&p.provision_name) && !is_annual_rent_provision(&p.provision_name)
        })
        .filter_map(|p| p.amended_value.as_ref().and_then(|v| v.as_money()))
        .next();
    let annual_new = amendment
        .modified_provisions
        .iter()
        .filter(|p| is_annual_rent_provision(&p.provision_name))
        .filter_map(|p| p.amended_value.as_ref().and_then(|v| v.as_money()))
        .next();

    let (Some(monthly), Some(annual)) = (monthly_new, annual_new) else {
        return Vec::new();
    };
    let derived = monthly * Decimal::from(12);
    if within_tolerance(annual, derived, config.rent_tolerance) {
        return Vec::new();
    }

    let amend_ref = DocumentReference::amendment(&amendment.document_id);
    let divergence = relative_divergence(annual, derived).unwrap_or(Decimal::ONE);
    vec![Finding {
        category: ConflictCategory::CalculationError,
        field_name: "base_rent_annual".to_string(),
        source_a: amend_ref.clone(),
        source_b: amend_ref,
        value_a: Some(format_usd(derived)),
        value_b: Some(format_usd(annual)),
        explanation: format!(
            "Amendment {} amends monthly rent to {} but annual rent to {}, which is not 12x",
            amendment.document_id,
            format_usd(monthly),
            format_usd(annual)
        ),
        magnitude: Magnitude::Relative(divergence),
        resolution: None,
    }]
}

/// Expand each dated escalation into its occurrences (one per
/// `frequency_months`) up to the last query date, sorted ascending
fn escalation_occurrences<'a>(
    escalations: &'a [RentEscalation],
    through: Option<NaiveDate>,
) -> Vec<(NaiveDate, &'a RentEscalation)> {
    let Some(through) = through else {
        return Vec::new();
    };
    let mut occurrences = Vec::new();
    for escalation in escalations {
        if escalation.escalation_type == EscalationType::None {
            continue;
        }
        let Some(first) = escalation.effective_date else {
            continue;
        };
        let step = chrono::Months::new(escalation.frequency_months.max(1));
        let mut due = first;
        while due <= through {
            occurrences.push((due, escalation));
            match due.checked_add_months(step) {
                Some(next) => due = next,
                None => break,
            }
        }
    }
    occurrences.sort_by_key(|(date, _)| *date);
    occurrences
}

/// Fixed escalations are recomputable; CPI and market-rate are not
fn apply_escalation(
    current: Option<Decimal>,
    escalation: &RentEscalation,
) -> Result<Option<Decimal>, &'static str> {
    let Some(current) = current else {
        return Ok(None);
    };
    match escalation.escalation_type {
        EscalationType::FixedPercentage => match escalation.percentage {
            Some(pct) => Ok(Some(current + current * pct / Decimal::from(100))),
            None => Err("a fixed-percentage escalation with no stated percentage"),
        },
        EscalationType::FixedAmount => match escalation.fixed_amount {
            Some(amount) => Ok(Some(current + amount)),
            None => Err("a fixed-amount escalation with no stated amount"),
        },
        EscalationType::Cpi => Err("a CPI-indexed escalation (index value unavailable)"),
        EscalationType::MarketRate => Err("a market-rate escalation (market value unavailable)"),
        EscalationType::None => Ok(Some(current)),
    }
}

// Resolution always prefers the governing (this) amendment's new value.
fn suggest_latest_rent(amendment: &AmendmentRecord, provision_name: &str) -> Option<ResolutionHint> {
    let provision = amendment
        .modifications_named(provision_name)
        .into_iter()
        .next()?;
    let new_value = provision.amended_value.as_ref()?.as_money()?;
    Some(ResolutionHint {
        recommended_value: format_usd(new_value),
        explicit: provision.original_value.is_some(),
    })
}
