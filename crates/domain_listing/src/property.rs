//! Property types and the schema resolver
//!
//! Each property type, combined with a listing mode, resolves to exactly one
//! [`PropertySchema`]: the payload fields it requires, those it merely
//! recognizes, the pricing fields of the mode, and the value rules applied at
//! submission. Resolution is pure.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ListingError, ValidationError};

/// The closed set of property types a listing can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    House,
    Condo,
    Townhome,
    Apartment,
    MultiFamily,
    Land,
    Ranch,
    Other,
}

impl PropertyType {
    pub const ALL: [PropertyType; 8] = [
        PropertyType::House,
        PropertyType::Condo,
        PropertyType::Townhome,
        PropertyType::Apartment,
        PropertyType::MultiFamily,
        PropertyType::Land,
        PropertyType::Ranch,
        PropertyType::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PropertyType::House => "house",
            PropertyType::Condo => "condo",
            PropertyType::Townhome => "townhome",
            PropertyType::Apartment => "apartment",
            PropertyType::MultiFamily => "multi_family",
            PropertyType::Land => "land",
            PropertyType::Ranch => "ranch",
            PropertyType::Other => "other",
        }
    }

    /// Land and ranch listings may be split into tracts
    pub fn supports_tracts(&self) -> bool {
        matches!(self, PropertyType::Land | PropertyType::Ranch)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PropertyType {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "" => Err(ValidationError::missing_property_type().into()),
            "house" => Ok(PropertyType::House),
            "condo" => Ok(PropertyType::Condo),
            "townhome" => Ok(PropertyType::Townhome),
            "apartment" => Ok(PropertyType::Apartment),
            "multi_family" => Ok(PropertyType::MultiFamily),
            "land" => Ok(PropertyType::Land),
            "ranch" => Ok(PropertyType::Ranch),
            "other" => Ok(PropertyType::Other),
            _ => Err(ListingError::UnknownPropertyType(s.trim().to_string())),
        }
    }
}

/// Whether the property is offered for sale or for rent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingMode {
    #[default]
    Sale,
    Rent,
}

impl ListingMode {
    pub fn label(&self) -> &'static str {
        match self {
            ListingMode::Sale => "sale",
            ListingMode::Rent => "rent",
        }
    }
}

impl fmt::Display for ListingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ListingMode {
    type Err = ListingError;

    /// An empty mode defaults to sale
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "sale" => Ok(ListingMode::Sale),
            "rent" => Ok(ListingMode::Rent),
            other => Err(ValidationError::invalid_listing_mode(other).into()),
        }
    }
}

/// A type-specific payload field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyField {
    Beds,
    Baths,
    SquareFeet,
    YearBuilt,
    LotSizeAcres,
    GarageSpaces,
    Stories,
    UnitNumber,
    HoaFees,
    Floor,
    ParkingSpaces,
    TotalUnits,
    Acreage,
    Zoning,
    Utilities,
    WaterRights,
    Improvements,
    IntendedUse,
}

impl PropertyField {
    pub fn key(&self) -> &'static str {
        match self {
            PropertyField::Beds => "beds",
            PropertyField::Baths => "baths",
            PropertyField::SquareFeet => "square_feet",
            PropertyField::YearBuilt => "year_built",
            PropertyField::LotSizeAcres => "lot_size_acres",
            PropertyField::GarageSpaces => "garage_spaces",
            PropertyField::Stories => "stories",
            PropertyField::UnitNumber => "unit_number",
            PropertyField::HoaFees => "hoa_fees",
            PropertyField::Floor => "floor",
            PropertyField::ParkingSpaces => "parking_spaces",
            PropertyField::TotalUnits => "total_units",
            PropertyField::Acreage => "acreage",
            PropertyField::Zoning => "zoning",
            PropertyField::Utilities => "utilities",
            PropertyField::WaterRights => "water_rights",
            PropertyField::Improvements => "improvements",
            PropertyField::IntendedUse => "intended_use",
        }
    }
}

impl fmt::Display for PropertyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A pricing field, shared by every type in a given mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingField {
    SalePrice,
    MonthlyRent,
    Deposit,
    LeaseTermMonths,
    AvailableDate,
}

impl PricingField {
    pub fn key(&self) -> &'static str {
        match self {
            PricingField::SalePrice => "sale_price",
            PricingField::MonthlyRent => "monthly_rent",
            PricingField::Deposit => "deposit",
            PricingField::LeaseTermMonths => "lease_term_months",
            PricingField::AvailableDate => "available_date",
        }
    }
}

impl fmt::Display for PricingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A value constraint checked at submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// A count field must be at least `minimum`
    AtLeast { field: PropertyField, minimum: u32 },
    /// A numeric field, when present, must be greater than zero
    Positive { field: PropertyField },
}

impl FieldRule {
    pub fn field(&self) -> PropertyField {
        match self {
            FieldRule::AtLeast { field, .. } | FieldRule::Positive { field } => *field,
        }
    }
}

/// The field contract for one (property type, listing mode) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySchema {
    pub property_type: PropertyType,
    pub listing_mode: ListingMode,
    pub required: Vec<PropertyField>,
    pub optional: Vec<PropertyField>,
    pub pricing_required: Vec<PricingField>,
    pub pricing_optional: Vec<PricingField>,
    pub rules: Vec<FieldRule>,
    pub supports_tracts: bool,
}

impl PropertySchema {
    /// True if the field belongs to this schema's payload
    pub fn recognizes(&self, field: PropertyField) -> bool {
        self.required.contains(&field) || self.optional.contains(&field)
    }

    pub fn is_required(&self, field: PropertyField) -> bool {
        self.required.contains(&field)
    }

    pub fn recognizes_pricing(&self, field: PricingField) -> bool {
        self.pricing_required.contains(&field) || self.pricing_optional.contains(&field)
    }

    /// Every payload field this schema recognizes
    pub fn recognized(&self) -> impl Iterator<Item = PropertyField> + '_ {
        self.required.iter().chain(self.optional.iter()).copied()
    }

    /// Required payload fields keyed by type, e.g. `condo.unit_number`
    pub fn qualified_required(&self) -> Vec<String> {
        self.required
            .iter()
            .map(|field| format!("{}.{}", self.property_type.label(), field.key()))
            .collect()
    }
}

/// Resolves the schema for a property type and listing mode
pub fn resolve(property_type: PropertyType, listing_mode: ListingMode) -> PropertySchema {
    use PropertyField::*;

    let (required, optional, rules) = match property_type {
        PropertyType::House => (
            vec![Beds, Baths, SquareFeet],
            vec![YearBuilt, LotSizeAcres, GarageSpaces, Stories],
            vec![],
        ),
        PropertyType::Condo => {
            let (required, optional) = match listing_mode {
                ListingMode::Sale => (
                    vec![Beds, Baths, SquareFeet, UnitNumber, HoaFees],
                    vec![Floor, YearBuilt, ParkingSpaces],
                ),
                ListingMode::Rent => (
                    vec![Beds, Baths, SquareFeet, UnitNumber],
                    vec![HoaFees, Floor, YearBuilt, ParkingSpaces],
                ),
            };
            (required, optional, vec![])
        }
        PropertyType::Townhome => (
            vec![Beds, Baths, SquareFeet],
            vec![HoaFees, YearBuilt, Stories, GarageSpaces],
            vec![],
        ),
        PropertyType::Apartment => (
            vec![Beds, Baths, SquareFeet],
            vec![UnitNumber, Floor, ParkingSpaces],
            vec![],
        ),
        PropertyType::MultiFamily => (
            vec![TotalUnits],
            vec![SquareFeet, YearBuilt, LotSizeAcres],
            vec![FieldRule::AtLeast { field: TotalUnits, minimum: 2 }],
        ),
        PropertyType::Land => (
            vec![Acreage],
            vec![Zoning, Utilities],
            vec![FieldRule::Positive { field: Acreage }],
        ),
        PropertyType::Ranch => (
            vec![Acreage],
            vec![Zoning, WaterRights, Improvements],
            vec![FieldRule::Positive { field: Acreage }],
        ),
        PropertyType::Other => (
            vec![],
            vec![SquareFeet, Acreage, IntendedUse],
            vec![FieldRule::Positive { field: Acreage }],
        ),
    };

    let (pricing_required, pricing_optional) = match listing_mode {
        ListingMode::Sale => (vec![PricingField::SalePrice], vec![]),
        ListingMode::Rent => (
            vec![PricingField::MonthlyRent],
            vec![
                PricingField::Deposit,
                PricingField::LeaseTermMonths,
                PricingField::AvailableDate,
            ],
        ),
    };

    PropertySchema {
        property_type,
        listing_mode,
        required,
        optional,
        pricing_required,
        pricing_optional,
        rules,
        supports_tracts: property_type.supports_tracts(),
    }
}

/// Parses raw labels and resolves the schema
///
/// An unknown property type is rejected before anything else is looked at.
pub fn resolve_labels(property_type: &str, listing_mode: &str) -> Result<PropertySchema, ListingError> {
    let property_type: PropertyType = property_type.parse()?;
    let listing_mode: ListingMode = listing_mode.parse()?;
    Ok(resolve(property_type, listing_mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condo_sale_requires_hoa_fees() {
        let schema = resolve(PropertyType::Condo, ListingMode::Sale);
        assert!(schema.is_required(PropertyField::HoaFees));
        assert!(schema.is_required(PropertyField::UnitNumber));
    }

    #[test]
    fn test_condo_rent_makes_hoa_optional() {
        let schema = resolve(PropertyType::Condo, ListingMode::Rent);
        assert!(!schema.is_required(PropertyField::HoaFees));
        assert!(schema.recognizes(PropertyField::HoaFees));
        assert_eq!(schema.pricing_required, vec![PricingField::MonthlyRent]);
    }

    #[test]
    fn test_land_does_not_recognize_rooms() {
        let schema = resolve(PropertyType::Land, ListingMode::Sale);
        assert!(!schema.recognizes(PropertyField::Beds));
        assert!(!schema.recognizes(PropertyField::Baths));
        assert!(!schema.recognizes(PropertyField::SquareFeet));
        assert!(schema.supports_tracts);
    }

    #[test]
    fn test_parse_multi_family_spellings() {
        assert_eq!("multi-family".parse::<PropertyType>().unwrap(), PropertyType::MultiFamily);
        assert_eq!("Multi_Family".parse::<PropertyType>().unwrap(), PropertyType::MultiFamily);
    }

    #[test]
    fn test_parse_unknown_type() {
        assert!(matches!(
            "castle".parse::<PropertyType>(),
            Err(ListingError::UnknownPropertyType(ref t)) if t == "castle"
        ));
    }

    #[test]
    fn test_qualified_required_keys() {
        let schema = resolve(PropertyType::MultiFamily, ListingMode::Sale);
        assert_eq!(schema.qualified_required(), vec!["multi_family.total_units".to_string()]);
    }
}
