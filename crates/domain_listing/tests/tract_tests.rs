//! Tract editing tests

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money};
use domain_listing::{TractPricing, TractSet};

#[derive(Debug, Clone)]
enum Edit {
    Add,
    Remove(usize),
    SetAcreage(usize, u32, u32),
    Price(usize, u32),
    CallForPricing(usize),
    Clear(usize),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        Just(Edit::Add),
        (0usize..6).prop_map(Edit::Remove),
        (0usize..6, 0u32..5000, 0u32..100).prop_map(|(i, whole, frac)| Edit::SetAcreage(i, whole, frac)),
        (0usize..6, 1u32..10_000_000).prop_map(|(i, p)| Edit::Price(i, p)),
        (0usize..6).prop_map(Edit::CallForPricing),
        (0usize..6).prop_map(Edit::Clear),
    ]
}

fn apply(set: &mut TractSet, edit: &Edit) {
    match edit {
        Edit::Add => {
            set.add_tract();
        }
        Edit::Remove(i) => {
            set.remove_tract(*i);
        }
        Edit::SetAcreage(i, whole, frac) => {
            set.set_acreage(*i, &format!("{whole}.{frac:02}"));
        }
        Edit::Price(i, p) => {
            set.set_price(*i, Money::new(Decimal::from(*p), Currency::USD));
        }
        Edit::CallForPricing(i) => {
            set.set_call_for_pricing(*i);
        }
        Edit::Clear(i) => {
            set.clear_pricing(*i);
        }
    }
}

/// Tract acreages as the edits should leave them
fn expected_acreages(model: &mut Vec<Decimal>, edit: &Edit) {
    match edit {
        Edit::Add => model.push(Decimal::ZERO),
        Edit::Remove(i) => {
            if model.len() > 1 && *i < model.len() {
                model.remove(*i);
            }
        }
        Edit::SetAcreage(i, whole, frac) => {
            if let Some(slot) = model.get_mut(*i) {
                *slot = Decimal::from(*whole) + Decimal::new(i64::from(*frac), 2);
            }
        }
        Edit::Price(..) | Edit::CallForPricing(_) | Edit::Clear(_) => {}
    }
}

proptest! {
    #[test]
    fn test_total_always_matches_tract_sum(edits in prop::collection::vec(edit_strategy(), 0..40)) {
        let mut set = TractSet::new();
        let mut model = vec![Decimal::ZERO];
        for edit in &edits {
            apply(&mut set, edit);
            expected_acreages(&mut model, edit);
            prop_assert_eq!(set.len(), model.len());
            prop_assert_eq!(set.total_acreage(), Some(model.iter().copied().sum::<Decimal>()));
        }
    }

    #[test]
    fn test_pricing_is_never_both(edits in prop::collection::vec(edit_strategy(), 0..40)) {
        let mut set = TractSet::new();
        for edit in &edits {
            apply(&mut set, edit);
        }
        for tract in set.tracts() {
            let both = tract.pricing.price().is_some() && tract.pricing.is_call_for_pricing();
            prop_assert!(!both);
        }
    }
}

#[test]
fn test_removing_middle_tract_updates_total() {
    let mut set = TractSet::new();
    set.add_tract();
    set.add_tract();
    set.set_acreage(0, "100");
    set.set_acreage(1, "20.5");
    set.set_acreage(2, "7");
    assert_eq!(set.total_acreage(), Some(dec!(127.5)));

    assert!(set.remove_tract(1));
    assert_eq!(set.len(), 2);
    assert_eq!(set.total_acreage(), Some(dec!(107)));
}

#[test]
fn test_added_tracts_are_numbered() {
    let mut set = TractSet::new();
    set.add_tract();
    let third = set.add_tract().name.clone();
    assert_eq!(third, "Tract 3");
}

#[test]
fn test_priced_total_ignores_call_for_pricing() {
    let mut set = TractSet::new();
    set.add_tract();
    set.set_price(0, Money::new(dec!(18000000), Currency::USD));
    set.set_call_for_pricing(1);
    assert_eq!(set.priced_total(Currency::USD).unwrap().amount(), dec!(18000000));
    assert_eq!(set.get(1).map(|t| t.pricing.clone()), Some(TractPricing::CallForPricing));
}
