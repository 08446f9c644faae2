//! Type-specific property payloads
//!
//! One struct per property type, each carrying only its own fields. A condo
//! payload cannot hold acreage and a land payload cannot hold bedrooms, so
//! stale values from a type the broker switched away from have nowhere to go.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::Money;

use crate::property::{PropertyField, PropertyType};

/// A single payload value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Count(u32),
    Decimal(Decimal),
    Money(Money),
    Text(String),
}

impl FieldValue {
    /// The value as a decimal, for numeric rules
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Count(n) => Some(Decimal::from(*n)),
            FieldValue::Decimal(d) => Some(*d),
            FieldValue::Money(m) => Some(m.amount()),
            FieldValue::Text(_) => None,
        }
    }
}

fn count(value: Option<u32>) -> Option<FieldValue> {
    value.map(FieldValue::Count)
}

fn decimal(value: Option<Decimal>) -> Option<FieldValue> {
    value.map(FieldValue::Decimal)
}

fn money(value: Option<Money>) -> Option<FieldValue> {
    value.map(FieldValue::Money)
}

fn text(value: &Option<String>) -> Option<FieldValue> {
    value.clone().map(FieldValue::Text)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseDetails {
    pub beds: Option<u32>,
    pub baths: Option<Decimal>,
    pub square_feet: Option<u32>,
    pub year_built: Option<u32>,
    pub lot_size_acres: Option<Decimal>,
    pub garage_spaces: Option<u32>,
    pub stories: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CondoDetails {
    pub beds: Option<u32>,
    pub baths: Option<Decimal>,
    pub square_feet: Option<u32>,
    pub unit_number: Option<String>,
    /// Monthly association fee
    pub hoa_fees: Option<Money>,
    pub floor: Option<u32>,
    pub year_built: Option<u32>,
    pub parking_spaces: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TownhomeDetails {
    pub beds: Option<u32>,
    pub baths: Option<Decimal>,
    pub square_feet: Option<u32>,
    pub hoa_fees: Option<Money>,
    pub year_built: Option<u32>,
    pub stories: Option<u32>,
    pub garage_spaces: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApartmentDetails {
    pub beds: Option<u32>,
    pub baths: Option<Decimal>,
    pub square_feet: Option<u32>,
    pub unit_number: Option<String>,
    pub floor: Option<u32>,
    pub parking_spaces: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiFamilyDetails {
    pub total_units: Option<u32>,
    pub square_feet: Option<u32>,
    pub year_built: Option<u32>,
    pub lot_size_acres: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandDetails {
    pub acreage: Option<Decimal>,
    pub zoning: Option<String>,
    pub utilities: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RanchDetails {
    pub acreage: Option<Decimal>,
    pub zoning: Option<String>,
    pub water_rights: Option<String>,
    pub improvements: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtherDetails {
    pub square_feet: Option<u32>,
    pub acreage: Option<Decimal>,
    pub intended_use: Option<String>,
}

/// The property-type payload of a listing, tagged by type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "property_type", rename_all = "snake_case")]
pub enum PropertyDetails {
    House(HouseDetails),
    Condo(CondoDetails),
    Townhome(TownhomeDetails),
    Apartment(ApartmentDetails),
    MultiFamily(MultiFamilyDetails),
    Land(LandDetails),
    Ranch(RanchDetails),
    Other(OtherDetails),
}

impl PropertyDetails {
    /// An empty payload for the given type
    pub fn empty(property_type: PropertyType) -> Self {
        match property_type {
            PropertyType::House => PropertyDetails::House(HouseDetails::default()),
            PropertyType::Condo => PropertyDetails::Condo(CondoDetails::default()),
            PropertyType::Townhome => PropertyDetails::Townhome(TownhomeDetails::default()),
            PropertyType::Apartment => PropertyDetails::Apartment(ApartmentDetails::default()),
            PropertyType::MultiFamily => PropertyDetails::MultiFamily(MultiFamilyDetails::default()),
            PropertyType::Land => PropertyDetails::Land(LandDetails::default()),
            PropertyType::Ranch => PropertyDetails::Ranch(RanchDetails::default()),
            PropertyType::Other => PropertyDetails::Other(OtherDetails::default()),
        }
    }

    pub fn property_type(&self) -> PropertyType {
        match self {
            PropertyDetails::House(_) => PropertyType::House,
            PropertyDetails::Condo(_) => PropertyType::Condo,
            PropertyDetails::Townhome(_) => PropertyType::Townhome,
            PropertyDetails::Apartment(_) => PropertyType::Apartment,
            PropertyDetails::MultiFamily(_) => PropertyType::MultiFamily,
            PropertyDetails::Land(_) => PropertyType::Land,
            PropertyDetails::Ranch(_) => PropertyType::Ranch,
            PropertyDetails::Other(_) => PropertyType::Other,
        }
    }

    /// Every field this variant carries, with its current value
    pub fn fields(&self) -> Vec<(PropertyField, Option<FieldValue>)> {
        use PropertyField::*;
        match self {
            PropertyDetails::House(d) => vec![
                (Beds, count(d.beds)),
                (Baths, decimal(d.baths)),
                (SquareFeet, count(d.square_feet)),
                (YearBuilt, count(d.year_built)),
                (LotSizeAcres, decimal(d.lot_size_acres)),
                (GarageSpaces, count(d.garage_spaces)),
                (Stories, count(d.stories)),
            ],
            PropertyDetails::Condo(d) => vec![
                (Beds, count(d.beds)),
                (Baths, decimal(d.baths)),
                (SquareFeet, count(d.square_feet)),
                (UnitNumber, text(&d.unit_number)),
                (HoaFees, money(d.hoa_fees)),
                (Floor, count(d.floor)),
                (YearBuilt, count(d.year_built)),
                (ParkingSpaces, count(d.parking_spaces)),
            ],
            PropertyDetails::Townhome(d) => vec![
                (Beds, count(d.beds)),
                (Baths, decimal(d.baths)),
                (SquareFeet, count(d.square_feet)),
                (HoaFees, money(d.hoa_fees)),
                (YearBuilt, count(d.year_built)),
                (Stories, count(d.stories)),
                (GarageSpaces, count(d.garage_spaces)),
            ],
            PropertyDetails::Apartment(d) => vec![
                (Beds, count(d.beds)),
                (Baths, decimal(d.baths)),
                (SquareFeet, count(d.square_feet)),
                (UnitNumber, text(&d.unit_number)),
                (Floor, count(d.floor)),
                (ParkingSpaces, count(d.parking_spaces)),
            ],
            PropertyDetails::MultiFamily(d) => vec![
                (TotalUnits, count(d.total_units)),
                (SquareFeet, count(d.square_feet)),
                (YearBuilt, count(d.year_built)),
                (LotSizeAcres, decimal(d.lot_size_acres)),
            ],
            PropertyDetails::Land(d) => vec![
                (Acreage, decimal(d.acreage)),
                (Zoning, text(&d.zoning)),
                (Utilities, text(&d.utilities)),
            ],
            PropertyDetails::Ranch(d) => vec![
                (Acreage, decimal(d.acreage)),
                (Zoning, text(&d.zoning)),
                (WaterRights, text(&d.water_rights)),
                (Improvements, text(&d.improvements)),
            ],
            PropertyDetails::Other(d) => vec![
                (SquareFeet, count(d.square_feet)),
                (Acreage, decimal(d.acreage)),
                (IntendedUse, text(&d.intended_use)),
            ],
        }
    }

    /// The value of `field`, or `None` if absent or not carried by this type
    pub fn value_of(&self, field: PropertyField) -> Option<FieldValue> {
        self.fields()
            .into_iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, value)| value)
    }

    /// Fields that currently hold a value
    pub fn present_fields(&self) -> Vec<PropertyField> {
        self.fields()
            .into_iter()
            .filter_map(|(field, value)| value.map(|_| field))
            .collect()
    }

    pub fn acreage(&self) -> Option<Decimal> {
        match self {
            PropertyDetails::Land(d) => d.acreage,
            PropertyDetails::Ranch(d) => d.acreage,
            PropertyDetails::Other(d) => d.acreage,
            _ => None,
        }
    }

    /// Overwrites acreage on types that carry it; returns false otherwise
    pub fn set_acreage(&mut self, acreage: Option<Decimal>) -> bool {
        match self {
            PropertyDetails::Land(d) => d.acreage = acreage,
            PropertyDetails::Ranch(d) => d.acreage = acreage,
            PropertyDetails::Other(d) => d.acreage = acreage,
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_land_has_no_room_fields() {
        let details = PropertyDetails::Land(LandDetails {
            acreage: Some(dec!(250)),
            ..Default::default()
        });
        assert_eq!(details.value_of(PropertyField::Beds), None);
        assert_eq!(details.present_fields(), vec![PropertyField::Acreage]);
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let details = PropertyDetails::MultiFamily(MultiFamilyDetails {
            total_units: Some(4),
            ..Default::default()
        });
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["property_type"], "multi_family");
        assert_eq!(json["total_units"], 4);
    }

    #[test]
    fn test_set_acreage_only_on_land_like_types() {
        let mut house = PropertyDetails::empty(PropertyType::House);
        assert!(!house.set_acreage(Some(dec!(1))));
        let mut ranch = PropertyDetails::empty(PropertyType::Ranch);
        assert!(ranch.set_acreage(Some(dec!(1760.62))));
        assert_eq!(ranch.acreage(), Some(dec!(1760.62)));
    }
}
