//! Listing draft builder
//!
//! A [`ListingForm`] holds everything the broker has typed, as text, in one
//! value. [`build`] projects it through a resolved schema into a
//! [`ListingPayload`]: only the fields of the chosen type and mode survive,
//! and numeric text that is empty or unparsable becomes `None`, never zero.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use core_kernel::{Currency, Money};

use crate::details::{
    ApartmentDetails, CondoDetails, HouseDetails, LandDetails, MultiFamilyDetails, OtherDetails,
    PropertyDetails, RanchDetails, TownhomeDetails,
};
use crate::error::ListingError;
use crate::property::{self, ListingMode, PricingField, PropertySchema, PropertyType};
use crate::tract::{recompute_total, Tract, TractPricing};

fn clean_numeric(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != '$' && *c != ',')
        .collect()
}

/// Parses a decimal, tolerating `$`, thousands separators and whitespace
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let cleaned = clean_numeric(text);
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Parses a whole, non-negative count
pub fn parse_count(text: &str) -> Option<u32> {
    let cleaned = clean_numeric(text);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<u32>().ok()
}

pub fn parse_money(text: &str, currency: Currency) -> Option<Money> {
    parse_decimal(text).map(|amount| Money::new(amount, currency))
}

/// Accepts `YYYY-MM-DD` or `MM/DD/YYYY`
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%m/%d/%Y"))
        .ok()
}

fn parse_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Raw input for one tract
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TractInput {
    pub name: String,
    pub acreage: String,
    pub zoning: String,
    pub intended_use: String,
    pub price: String,
    pub call_for_pricing: bool,
}

impl TractInput {
    /// Converts to a tract; ticking call-for-pricing discards any typed price
    pub fn to_tract(&self, position: usize, currency: Currency) -> Tract {
        let name = parse_text(&self.name).unwrap_or_else(|| format!("Tract {position}"));
        let pricing = if self.call_for_pricing {
            TractPricing::CallForPricing
        } else {
            parse_money(&self.price, currency)
                .map(TractPricing::Priced)
                .unwrap_or(TractPricing::Unpriced)
        };
        Tract {
            name,
            acreage: parse_decimal(&self.acreage),
            zoning: parse_text(&self.zoning),
            intended_use: parse_text(&self.intended_use),
            pricing,
        }
    }
}

/// Everything captured by the listing form, as entered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingForm {
    pub property_type: String,
    pub listing_mode: String,
    pub currency: Currency,

    pub title: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,

    pub sale_price: String,
    pub monthly_rent: String,
    pub deposit: String,
    pub lease_term_months: String,
    pub available_date: String,

    pub beds: String,
    pub baths: String,
    pub square_feet: String,
    pub year_built: String,
    pub lot_size_acres: String,
    pub garage_spaces: String,
    pub stories: String,
    pub unit_number: String,
    pub hoa_fees: String,
    pub floor: String,
    pub parking_spaces: String,
    pub total_units: String,
    pub acreage: String,
    pub zoning: String,
    pub utilities: String,
    pub water_rights: String,
    pub improvements: String,
    pub intended_use: String,

    pub multi_tract: bool,
    pub tracts: Vec<TractInput>,
}

impl ListingForm {
    /// Resolves the schema the form currently points at
    pub fn resolve_schema(&self) -> Result<PropertySchema, ListingError> {
        property::resolve_labels(&self.property_type, &self.listing_mode)
    }

    /// Checks a draft can be stored at all
    ///
    /// Drafts may be incomplete, but a property type, once chosen, must be
    /// one we know.
    pub fn check_structure(&self) -> Result<Option<PropertyType>, ListingError> {
        self.listing_mode.parse::<ListingMode>()?;
        if self.property_type.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(self.property_type.parse()?))
    }
}

/// Where the property is
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

/// Mode-level pricing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "listing_mode", rename_all = "snake_case")]
pub enum PricingTerms {
    Sale {
        sale_price: Option<Money>,
    },
    Rent {
        monthly_rent: Option<Money>,
        deposit: Option<Money>,
        lease_term_months: Option<u32>,
        available_date: Option<NaiveDate>,
    },
}

impl PricingTerms {
    pub fn listing_mode(&self) -> ListingMode {
        match self {
            PricingTerms::Sale { .. } => ListingMode::Sale,
            PricingTerms::Rent { .. } => ListingMode::Rent,
        }
    }

    pub fn is_present(&self, field: PricingField) -> bool {
        match (self, field) {
            (PricingTerms::Sale { sale_price }, PricingField::SalePrice) => sale_price.is_some(),
            (PricingTerms::Rent { monthly_rent, .. }, PricingField::MonthlyRent) => monthly_rent.is_some(),
            (PricingTerms::Rent { deposit, .. }, PricingField::Deposit) => deposit.is_some(),
            (PricingTerms::Rent { lease_term_months, .. }, PricingField::LeaseTermMonths) => {
                lease_term_months.is_some()
            }
            (PricingTerms::Rent { available_date, .. }, PricingField::AvailableDate) => {
                available_date.is_some()
            }
            _ => false,
        }
    }

    /// The amount behind a money-valued pricing field
    pub fn amount(&self, field: PricingField) -> Option<Money> {
        match (self, field) {
            (PricingTerms::Sale { sale_price }, PricingField::SalePrice) => *sale_price,
            (PricingTerms::Rent { monthly_rent, .. }, PricingField::MonthlyRent) => *monthly_rent,
            (PricingTerms::Rent { deposit, .. }, PricingField::Deposit) => *deposit,
            _ => None,
        }
    }
}

/// The normalized listing record produced from a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingPayload {
    pub title: String,
    pub description: String,
    pub location: Location,
    pub pricing: PricingTerms,
    pub details: PropertyDetails,
    /// Present only in multi-tract mode
    pub tracts: Option<Vec<Tract>>,
    pub total_acreage: Option<Decimal>,
}

impl ListingPayload {
    pub fn property_type(&self) -> PropertyType {
        self.details.property_type()
    }

    pub fn listing_mode(&self) -> ListingMode {
        self.pricing.listing_mode()
    }

    pub fn is_multi_tract(&self) -> bool {
        self.tracts.is_some()
    }
}

/// Builds the payload for `schema` from the form
///
/// Tracts are only carried for types that support them; in that case the
/// payload acreage is replaced by the tract total.
pub fn build(form: &ListingForm, schema: &PropertySchema) -> ListingPayload {
    let currency = form.currency;
    let mut details = build_details(form, schema.property_type, currency);

    let tracts = if form.multi_tract && schema.supports_tracts {
        let tracts: Vec<Tract> = if form.tracts.is_empty() {
            vec![Tract::new("Tract 1")]
        } else {
            form.tracts
                .iter()
                .enumerate()
                .map(|(i, input)| input.to_tract(i + 1, currency))
                .collect()
        };
        details.set_acreage(recompute_total(&tracts));
        Some(tracts)
    } else {
        None
    };

    let pricing = match schema.listing_mode {
        ListingMode::Sale => PricingTerms::Sale {
            sale_price: parse_money(&form.sale_price, currency),
        },
        ListingMode::Rent => PricingTerms::Rent {
            monthly_rent: parse_money(&form.monthly_rent, currency),
            deposit: parse_money(&form.deposit, currency),
            lease_term_months: parse_count(&form.lease_term_months),
            available_date: parse_date(&form.available_date),
        },
    };

    ListingPayload {
        title: form.title.trim().to_string(),
        description: form.description.trim().to_string(),
        location: Location {
            address: parse_text(&form.address),
            city: parse_text(&form.city),
            state: parse_text(&form.state),
            postal_code: parse_text(&form.postal_code),
        },
        pricing,
        total_acreage: details.acreage(),
        details,
        tracts,
    }
}

fn build_details(form: &ListingForm, property_type: PropertyType, currency: Currency) -> PropertyDetails {
    match property_type {
        PropertyType::House => PropertyDetails::House(HouseDetails {
            beds: parse_count(&form.beds),
            baths: parse_decimal(&form.baths),
            square_feet: parse_count(&form.square_feet),
            year_built: parse_count(&form.year_built),
            lot_size_acres: parse_decimal(&form.lot_size_acres),
            garage_spaces: parse_count(&form.garage_spaces),
            stories: parse_count(&form.stories),
        }),
        PropertyType::Condo => PropertyDetails::Condo(CondoDetails {
            beds: parse_count(&form.beds),
            baths: parse_decimal(&form.baths),
            square_feet: parse_count(&form.square_feet),
            unit_number: parse_text(&form.unit_number),
            hoa_fees: parse_money(&form.hoa_fees, currency),
            floor: parse_count(&form.floor),
            year_built: parse_count(&form.year_built),
            parking_spaces: parse_count(&form.parking_spaces),
        }),
        PropertyType::Townhome => PropertyDetails::Townhome(TownhomeDetails {
            beds: parse_count(&form.beds),
            baths: parse_decimal(&form.baths),
            square_feet: parse_count(&form.square_feet),
            hoa_fees: parse_money(&form.hoa_fees, currency),
            year_built: parse_count(&form.year_built),
            stories: parse_count(&form.stories),
            garage_spaces: parse_count(&form.garage_spaces),
        }),
        PropertyType::Apartment => PropertyDetails::Apartment(ApartmentDetails {
            beds: parse_count(&form.beds),
            baths: parse_decimal(&form.baths),
            square_feet: parse_count(&form.square_feet),
            unit_number: parse_text(&form.unit_number),
            floor: parse_count(&form.floor),
            parking_spaces: parse_count(&form.parking_spaces),
        }),
        PropertyType::MultiFamily => PropertyDetails::MultiFamily(MultiFamilyDetails {
            total_units: parse_count(&form.total_units),
            square_feet: parse_count(&form.square_feet),
            year_built: parse_count(&form.year_built),
            lot_size_acres: parse_decimal(&form.lot_size_acres),
        }),
        PropertyType::Land => PropertyDetails::Land(LandDetails {
            acreage: parse_decimal(&form.acreage),
            zoning: parse_text(&form.zoning),
            utilities: parse_text(&form.utilities),
        }),
        PropertyType::Ranch => PropertyDetails::Ranch(RanchDetails {
            acreage: parse_decimal(&form.acreage),
            zoning: parse_text(&form.zoning),
            water_rights: parse_text(&form.water_rights),
            improvements: parse_text(&form.improvements),
        }),
        PropertyType::Other => PropertyDetails::Other(OtherDetails {
            square_feet: parse_count(&form.square_feet),
            acreage: parse_decimal(&form.acreage),
            intended_use: parse_text(&form.intended_use),
        }),
    }
}
