//! Test Data Builders
//!
//! Builders that start from a complete, submittable value so tests only
//! spell out the field under test.

use chrono::{DateTime, Utc};

use core_kernel::{BrokerId, ReviewerId};
use domain_consent::{ClientConsent, ClientContact, DEFAULT_VALIDITY_MONTHS};
use domain_listing::{ListingForm, TractInput};

use crate::fixtures::TemporalFixtures;

/// Builder for listing forms
///
/// Each constructor yields a form that passes every content check for its
/// property type.
#[derive(Debug, Clone)]
pub struct ListingFormBuilder {
    form: ListingForm,
}

impl ListingFormBuilder {
    /// 250 acres of land for sale at $1,250,000
    pub fn land() -> Self {
        Self {
            form: ListingForm {
                property_type: "land".into(),
                listing_mode: "sale".into(),
                title: "Hill Country Acreage".into(),
                description: "Rolling hills with a seasonal creek".into(),
                sale_price: "$1,250,000".into(),
                acreage: "250".into(),
                ..Default::default()
            },
        }
    }

    /// Ranch split into two priced tracts (1369.62 + 391 acres)
    pub fn ranch_two_tracts() -> Self {
        Self {
            form: ListingForm {
                property_type: "ranch".into(),
                listing_mode: "sale".into(),
                title: "Twin Creeks Ranch".into(),
                description: "Working cattle ranch offered in two tracts".into(),
                multi_tract: true,
                tracts: vec![
                    TractInput {
                        acreage: "1369.62".into(),
                        price: "4100000".into(),
                        ..Default::default()
                    },
                    TractInput {
                        acreage: "391".into(),
                        call_for_pricing: true,
                        ..Default::default()
                    },
                ],
                ..Default::default()
            },
        }
    }

    pub fn house() -> Self {
        Self {
            form: ListingForm {
                property_type: "house".into(),
                listing_mode: "sale".into(),
                title: "Craftsman Bungalow".into(),
                description: "Restored 1920s bungalow near the park".into(),
                sale_price: "585000".into(),
                beds: "3".into(),
                baths: "2".into(),
                square_feet: "1850".into(),
                ..Default::default()
            },
        }
    }

    /// Condo for sale, HOA fees included
    pub fn condo() -> Self {
        Self {
            form: ListingForm {
                property_type: "condo".into(),
                listing_mode: "sale".into(),
                title: "Downtown Loft".into(),
                description: "Corner unit with city views".into(),
                sale_price: "425000".into(),
                beds: "2".into(),
                baths: "2".into(),
                square_feet: "1100".into(),
                unit_number: "12B".into(),
                hoa_fees: "350".into(),
                ..Default::default()
            },
        }
    }

    /// Switches to rent mode with a monthly rent
    pub fn for_rent(mut self, monthly_rent: impl Into<String>) -> Self {
        self.form.listing_mode = "rent".into();
        self.form.sale_price.clear();
        self.form.monthly_rent = monthly_rent.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.form.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.form.description = description.into();
        self
    }

    pub fn with_property_type(mut self, property_type: impl Into<String>) -> Self {
        self.form.property_type = property_type.into();
        self
    }

    pub fn with_sale_price(mut self, price: impl Into<String>) -> Self {
        self.form.sale_price = price.into();
        self
    }

    pub fn with_tract(mut self, tract: TractInput) -> Self {
        self.form.multi_tract = true;
        self.form.tracts.push(tract);
        self
    }

    /// Applies an arbitrary edit to the form
    pub fn edit(mut self, f: impl FnOnce(&mut ListingForm)) -> Self {
        f(&mut self.form);
        self
    }

    pub fn build(self) -> ListingForm {
        self.form
    }
}

/// Builder for stored client consents
#[derive(Debug, Clone)]
pub struct ConsentBuilder {
    broker_id: BrokerId,
    client_name: String,
    contact: ClientContact,
    document_reference: String,
    issued_at: DateTime<Utc>,
    validity_months: u32,
    verified: bool,
    revoked: bool,
}

impl ConsentBuilder {
    /// A not-yet-verified consent issued at the reference time
    pub fn new(broker_id: BrokerId) -> Self {
        Self {
            broker_id,
            client_name: "Hal Jenkins".to_string(),
            contact: ClientContact::default(),
            document_reference: "consents/hal-jenkins.pdf".to_string(),
            issued_at: TemporalFixtures::now(),
            validity_months: DEFAULT_VALIDITY_MONTHS,
            verified: false,
            revoked: false,
        }
    }

    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    pub fn with_contact(mut self, contact: ClientContact) -> Self {
        self.contact = contact;
        self
    }

    pub fn issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = issued_at;
        self
    }

    pub fn valid_for_months(mut self, months: u32) -> Self {
        self.validity_months = months;
        self
    }

    pub fn verified(mut self) -> Self {
        self.verified = true;
        self
    }

    /// Explicitly expired by the review authority
    pub fn revoked(mut self) -> Self {
        self.revoked = true;
        self
    }

    pub fn build(self) -> ClientConsent {
        let mut consent = ClientConsent::issue(
            self.broker_id,
            self.client_name,
            self.contact,
            self.document_reference,
            self.issued_at,
            self.validity_months,
        )
        .expect("consent builder produced invalid consent");
        if self.verified {
            consent
                .verify(ReviewerId::new(), self.issued_at)
                .expect("fresh consent should verify");
        }
        if self.revoked {
            consent.expire().expect("consent should be revocable");
        }
        consent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_consent::ConsentStatus;
    use domain_listing::{build, check_payload};

    #[test]
    fn test_every_form_builder_passes_content_checks() {
        for builder in [
            ListingFormBuilder::land(),
            ListingFormBuilder::ranch_two_tracts(),
            ListingFormBuilder::house(),
            ListingFormBuilder::condo(),
            ListingFormBuilder::house().for_rent("2400"),
        ] {
            let form = builder.build();
            let schema = form.resolve_schema().unwrap();
            let payload = build(&form, &schema);
            assert_eq!(check_payload(&payload, &schema), Ok(()), "{}", form.property_type);
        }
    }

    #[test]
    fn test_consent_builder_states() {
        let broker = BrokerId::new();
        let now = TemporalFixtures::now();

        assert_eq!(
            ConsentBuilder::new(broker).build().effective_status(now),
            ConsentStatus::NotVerified
        );
        assert!(ConsentBuilder::new(broker).verified().build().is_usable(now));
        assert_eq!(
            ConsentBuilder::new(broker).verified().revoked().build().effective_status(now),
            ConsentStatus::Expired
        );
        assert_eq!(
            ConsentBuilder::new(broker)
                .issued_at(TemporalFixtures::days_ago(400))
                .verified()
                .build()
                .effective_status(now),
            ConsentStatus::Expired
        );
    }
}
