//! Tract aggregation for multi-parcel land and ranch listings
//!
//! A [`TractSet`] never drops below one tract, and its total acreage is
//! always recomputed from the tracts rather than entered.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, MoneyError};

use crate::draft::parse_decimal;

/// How a tract is priced
///
/// A numeric price and "call for pricing" are exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum TractPricing {
    #[default]
    Unpriced,
    Priced(Money),
    CallForPricing,
}

impl TractPricing {
    pub fn price(&self) -> Option<Money> {
        match self {
            TractPricing::Priced(m) => Some(*m),
            _ => None,
        }
    }

    pub fn is_call_for_pricing(&self) -> bool {
        matches!(self, TractPricing::CallForPricing)
    }
}

/// One parcel within a multi-tract listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tract {
    pub name: String,
    pub acreage: Option<Decimal>,
    pub zoning: Option<String>,
    pub intended_use: Option<String>,
    pub pricing: TractPricing,
}

impl Tract {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            acreage: None,
            zoning: None,
            intended_use: None,
            pricing: TractPricing::Unpriced,
        }
    }

    /// The first problem that would block submission, if any
    pub fn defect(&self) -> Option<&'static str> {
        match self.acreage {
            Some(acreage) if acreage > Decimal::ZERO => {}
            _ => return Some("acreage"),
        }
        match self.pricing {
            TractPricing::Unpriced => Some("pricing"),
            TractPricing::Priced(price) if !price.is_positive() => Some("pricing"),
            _ => None,
        }
    }
}

/// Sums tract acreage, counting missing values as zero
///
/// `None` when the sum does not fit in a `Decimal`.
pub fn recompute_total(tracts: &[Tract]) -> Option<Decimal> {
    tracts.iter().try_fold(Decimal::ZERO, |total, tract| {
        total.checked_add(tract.acreage.unwrap_or(Decimal::ZERO))
    })
}

fn default_name(position: usize) -> String {
    format!("Tract {position}")
}

/// The tracts of a listing while multi-tract mode is on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TractSet {
    tracts: Vec<Tract>,
}

impl Default for TractSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TractSet {
    /// Starts with a single unpriced `Tract 1`
    pub fn new() -> Self {
        Self {
            tracts: vec![Tract::new(default_name(1))],
        }
    }

    /// Wraps existing tracts; an empty list yields the default single tract
    pub fn from_tracts(tracts: Vec<Tract>) -> Self {
        if tracts.is_empty() {
            Self::new()
        } else {
            Self { tracts }
        }
    }

    pub fn tracts(&self) -> &[Tract] {
        &self.tracts
    }

    pub fn len(&self) -> usize {
        self.tracts.len()
    }

    /// Always false; kept for symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.tracts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tract> {
        self.tracts.get(index)
    }

    /// Appends a tract named `Tract N`
    pub fn add_tract(&mut self) -> &Tract {
        let name = default_name(self.tracts.len() + 1);
        let position = self.tracts.len();
        self.tracts.push(Tract::new(name));
        &self.tracts[position]
    }

    /// Removes a tract; does nothing for the last tract or a bad index
    pub fn remove_tract(&mut self, index: usize) -> bool {
        if self.tracts.len() <= 1 || index >= self.tracts.len() {
            return false;
        }
        self.tracts.remove(index);
        true
    }

    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> bool {
        self.with_tract(index, |tract| tract.name = name.into())
    }

    /// Sets acreage from raw text; unparsable text clears it
    pub fn set_acreage(&mut self, index: usize, text: &str) -> bool {
        let acreage = parse_decimal(text);
        self.with_tract(index, |tract| tract.acreage = acreage)
    }

    pub fn set_zoning(&mut self, index: usize, zoning: Option<String>) -> bool {
        self.with_tract(index, |tract| tract.zoning = zoning)
    }

    pub fn set_intended_use(&mut self, index: usize, intended_use: Option<String>) -> bool {
        self.with_tract(index, |tract| tract.intended_use = intended_use)
    }

    /// Sets a numeric price, clearing any call-for-pricing flag
    pub fn set_price(&mut self, index: usize, price: Money) -> bool {
        self.with_tract(index, |tract| tract.pricing = TractPricing::Priced(price))
    }

    /// Flags call-for-pricing, clearing any numeric price
    pub fn set_call_for_pricing(&mut self, index: usize) -> bool {
        self.with_tract(index, |tract| tract.pricing = TractPricing::CallForPricing)
    }

    pub fn clear_pricing(&mut self, index: usize) -> bool {
        self.with_tract(index, |tract| tract.pricing = TractPricing::Unpriced)
    }

    pub fn total_acreage(&self) -> Option<Decimal> {
        recompute_total(&self.tracts)
    }

    /// Sum of the numerically priced tracts
    pub fn priced_total(&self, currency: Currency) -> Result<Money, MoneyError> {
        let prices: Vec<Money> = self.tracts.iter().filter_map(|t| t.pricing.price()).collect();
        Money::sum(&prices, currency)
    }

    pub fn into_tracts(self) -> Vec<Tract> {
        self.tracts
    }

    fn with_tract(&mut self, index: usize, update: impl FnOnce(&mut Tract)) -> bool {
        match self.tracts.get_mut(index) {
            Some(tract) => {
                update(tract);
                true
            }
            None => false,
        }
    }
}
