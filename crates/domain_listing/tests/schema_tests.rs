//! Property schema resolution tests

use std::collections::HashSet;

use domain_listing::{
    resolve, resolve_labels, ListingError, ListingMode, PricingField, PropertyField, PropertyType,
    ValidationCode,
};

// ============================================================================
// Resolution
// ============================================================================

mod resolution {
    use super::*;

    #[test]
    fn test_every_type_resolves_in_both_modes() {
        for property_type in PropertyType::ALL {
            for mode in [ListingMode::Sale, ListingMode::Rent] {
                let schema = resolve(property_type, mode);
                assert_eq!(schema.property_type, property_type);
                assert_eq!(schema.listing_mode, mode);
                for field in &schema.required {
                    assert!(!schema.optional.contains(field), "{field:?} both required and optional");
                }
            }
        }
    }

    #[test]
    fn test_only_land_and_ranch_support_tracts() {
        let with_tracts: Vec<_> = PropertyType::ALL
            .into_iter()
            .filter(|t| resolve(*t, ListingMode::Sale).supports_tracts)
            .collect();
        assert_eq!(with_tracts, vec![PropertyType::Land, PropertyType::Ranch]);
    }

    #[test]
    fn test_pricing_depends_on_mode_only() {
        for property_type in PropertyType::ALL {
            assert_eq!(
                resolve(property_type, ListingMode::Sale).pricing_required,
                vec![PricingField::SalePrice]
            );
            let rent = resolve(property_type, ListingMode::Rent);
            assert_eq!(rent.pricing_required, vec![PricingField::MonthlyRent]);
            assert!(rent.recognizes_pricing(PricingField::Deposit));
            assert!(!rent.recognizes_pricing(PricingField::SalePrice));
        }
    }

    #[test]
    fn test_required_fields_per_type_for_sale() {
        let expected: [(PropertyType, &[&str]); 8] = [
            (PropertyType::House, &["beds", "baths", "square_feet"]),
            (PropertyType::Condo, &["beds", "baths", "square_feet", "unit_number", "hoa_fees"]),
            (PropertyType::Townhome, &["beds", "baths", "square_feet"]),
            (PropertyType::Apartment, &["beds", "baths", "square_feet"]),
            (PropertyType::MultiFamily, &["total_units"]),
            (PropertyType::Land, &["acreage"]),
            (PropertyType::Ranch, &["acreage"]),
            (PropertyType::Other, &[]),
        ];
        for (property_type, keys) in expected {
            let schema = resolve(property_type, ListingMode::Sale);
            let required: HashSet<&str> = schema.required.iter().map(|f| f.key()).collect();
            let keys: HashSet<&str> = keys.iter().copied().collect();
            assert_eq!(required, keys, "{property_type}");
        }
    }

    #[test]
    fn test_condo_rent_relaxes_hoa_fees() {
        let rent = resolve(PropertyType::Condo, ListingMode::Rent);
        assert!(!rent.is_required(PropertyField::HoaFees));
        assert!(rent.recognizes(PropertyField::HoaFees));
        assert_eq!(
            rent.qualified_required(),
            vec!["condo.beds", "condo.baths", "condo.square_feet", "condo.unit_number"]
        );
    }

    #[test]
    fn test_land_and_house_fields_do_not_mix() {
        let land = resolve(PropertyType::Land, ListingMode::Sale);
        let house = resolve(PropertyType::House, ListingMode::Sale);
        assert!(!land.recognizes(PropertyField::Beds));
        assert!(!house.recognizes(PropertyField::Acreage));
    }
}

// ============================================================================
// Label parsing
// ============================================================================

mod labels {
    use super::*;

    #[test]
    fn test_labels_are_case_and_dash_insensitive() {
        let schema = resolve_labels(" Multi-Family ", "RENT").unwrap();
        assert_eq!(schema.property_type, PropertyType::MultiFamily);
        assert_eq!(schema.listing_mode, ListingMode::Rent);
    }

    #[test]
    fn test_blank_mode_defaults_to_sale() {
        let schema = resolve_labels("house", "").unwrap();
        assert_eq!(schema.listing_mode, ListingMode::Sale);
    }

    #[test]
    fn test_unknown_type_is_not_a_validation_error() {
        let err = resolve_labels("castle", "sale").unwrap_err();
        assert!(matches!(err, ListingError::UnknownPropertyType(ref t) if t == "castle"));
        assert!(err.validation().is_none());
    }

    #[test]
    fn test_blank_type_is_missing_property_type() {
        let err = resolve_labels("  ", "sale").unwrap_err();
        assert_eq!(err.validation().map(|v| v.code()), Some(ValidationCode::MissingPropertyType));
    }

    #[test]
    fn test_unknown_mode_is_invalid_listing_mode() {
        let err = resolve_labels("house", "auction").unwrap_err();
        assert_eq!(err.validation().map(|v| v.code()), Some(ValidationCode::InvalidListingMode));
    }

    #[test]
    fn test_labels_round_trip() {
        for property_type in PropertyType::ALL {
            let parsed: PropertyType = property_type.label().parse().unwrap();
            assert_eq!(parsed, property_type);
        }
    }
}
