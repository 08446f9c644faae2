//! Submission checks for the `draft -> pending_review` transition
//!
//! The service runs these in a fixed order around the consent check:
//!
//! 1. [`check_title`]
//! 2. consent (needs I/O, lives in the service)
//! 3. [`check_schema`]
//! 4. [`check_tracts`]
//!
//! The first failure is reported; nothing is retried or partially accepted.

use rust_decimal::Decimal;

use crate::details::FieldValue;
use crate::draft::ListingPayload;
use crate::error::ValidationError;
use crate::property::{FieldRule, PricingField, PropertyField, PropertySchema};

pub fn check_title(payload: &ListingPayload) -> Result<(), ValidationError> {
    if payload.title.trim().is_empty() {
        return Err(ValidationError::missing_title("title"));
    }
    if payload.description.trim().is_empty() {
        return Err(ValidationError::missing_title("description"));
    }
    Ok(())
}

/// Every required field is present and every value rule holds
///
/// In multi-tract mode the tracts carry acreage and pricing, so sale price
/// and acreage are left to [`check_tracts`].
pub fn check_schema(payload: &ListingPayload, schema: &PropertySchema) -> Result<(), ValidationError> {
    let derived = |field: PropertyField| payload.is_multi_tract() && field == PropertyField::Acreage;

    for field in &schema.required {
        if derived(*field) {
            continue;
        }
        if payload.details.value_of(*field).is_none() {
            return Err(ValidationError::schema_violation(field.key()));
        }
    }

    for field in &schema.pricing_required {
        if *field == PricingField::SalePrice && payload.is_multi_tract() {
            continue;
        }
        if !payload.pricing.is_present(*field) {
            return Err(ValidationError::schema_violation(field.key()));
        }
        if let Some(amount) = payload.pricing.amount(*field) {
            if !amount.is_positive() {
                return Err(ValidationError::schema_violation(field.key()));
            }
        }
    }

    for rule in &schema.rules {
        if derived(rule.field()) {
            continue;
        }
        let value = payload.details.value_of(rule.field());
        let holds = match (rule, value) {
            (_, None) => true,
            (FieldRule::AtLeast { minimum, .. }, Some(FieldValue::Count(n))) => n >= *minimum,
            (FieldRule::AtLeast { .. }, Some(_)) => false,
            (FieldRule::Positive { .. }, Some(v)) => v
                .as_decimal()
                .map(|d| d > Decimal::ZERO)
                .unwrap_or(false),
        };
        if !holds {
            return Err(ValidationError::schema_violation(rule.field().key()));
        }
    }

    Ok(())
}

/// Each tract has positive acreage and exactly one pricing option, and the
/// tract total is representable
pub fn check_tracts(payload: &ListingPayload) -> Result<(), ValidationError> {
    let Some(tracts) = &payload.tracts else {
        return Ok(());
    };
    if tracts.is_empty() {
        return Err(ValidationError::invalid_tract("tracts"));
    }
    for (index, tract) in tracts.iter().enumerate() {
        if let Some(defect) = tract.defect() {
            return Err(ValidationError::invalid_tract(format!("tracts[{index}].{defect}")));
        }
    }
    if payload.total_acreage.is_none() {
        return Err(ValidationError::invalid_tract("tracts"));
    }
    Ok(())
}

/// Runs the content checks without the consent step
pub fn check_payload(payload: &ListingPayload, schema: &PropertySchema) -> Result<(), ValidationError> {
    check_title(payload)?;
    check_schema(payload, schema)?;
    check_tracts(payload)
}
