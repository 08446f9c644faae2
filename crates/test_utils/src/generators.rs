//! Property-Based Test Generators
//!
//! Proptest strategies for listing form input, including the loosely
//! formatted numbers brokers type.

use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_listing::{PropertyType, TractInput};

/// Any supported property type
pub fn property_type_strategy() -> impl Strategy<Value = PropertyType> {
    proptest::sample::select(PropertyType::ALL.to_vec())
}

/// A property type label as a form might send it
pub fn property_type_label_strategy() -> impl Strategy<Value = String> {
    (property_type_strategy(), any::<bool>(), any::<bool>()).prop_map(|(t, upper, dashed)| {
        let mut label = t.label().to_string();
        if dashed {
            label = label.replace('_', "-");
        }
        if upper {
            label = label.to_ascii_uppercase();
        }
        label
    })
}

pub fn listing_mode_label_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just("sale".to_string()), Just("rent".to_string())]
}

/// Positive acreage with up to two decimal places
pub fn acreage_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

/// Whole-dollar amounts rendered with optional `$` and thousands separators
pub fn money_text_strategy() -> impl Strategy<Value = (i64, String)> {
    (1i64..100_000_000i64, any::<bool>(), any::<bool>()).prop_map(|(dollars, symbol, grouped)| {
        let digits = dollars.to_string();
        let body = if grouped { group_thousands(&digits) } else { digits };
        let text = if symbol { format!("${body}") } else { body };
        (dollars, text)
    })
}

/// A complete tract: positive acreage and exactly one pricing choice
pub fn tract_input_strategy() -> impl Strategy<Value = TractInput> {
    (acreage_strategy(), money_text_strategy(), any::<bool>()).prop_map(
        |(acreage, (_, price), call_for_pricing)| TractInput {
            acreage: acreage.to_string(),
            price: if call_for_pricing { String::new() } else { price },
            call_for_pricing,
            ..Default::default()
        },
    )
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
