use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use once_cell::sync::Lazy;
use serde_derive::{Deserialize, Serialize};
use uuid::Uuid;

use crate::helper_model::{BookingAction, Section, ValidationError};
use crate::methods::booking::{self, PricingContext};
use crate::methods::offering_ledger::OfferingLedger;
use crate::methods::quote_sequence::{self, QuoteSequencer, QuoteTicket};
use crate::methods::timestamps::BookingZone;
use crate::methods::wizard::WizardState;
use crate::model::{
    BookingDraft, BookingPayload, Discount, Offering, OfferingSelection, Package, PricingBreakdown,
    PricingQuote,
};

/// One booking being composed in the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingSession {
    pub id: Uuid,
    pub draft: BookingDraft,
    pub ledger: OfferingLedger,
    pub catalog: Vec<Offering>,
    pub mandatory: Vec<Offering>,
    pub package: Option<Package>,
    pub discount: Option<Discount>,
    pub quote: Option<PricingQuote>,
    pub sequencer: QuoteSequencer,
    pub wizard: WizardState,
    pub section_errors: BTreeMap<Section, String>,
    pub last_touched: DateTime<Utc>,
    /// Set while the booking is being sent to the backend.
    pub submitting: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub draft: BookingDraft,
    pub selections: Vec<OfferingSelection>,
    pub catalog: Vec<Offering>,
    pub package: Option<Package>,
    pub discount: Option<Discount>,
    pub pricing_quote: Option<PricingQuote>,
    pub wizard: WizardState,
    pub can_proceed: bool,
    pub submitting: bool,
    pub section_errors: BTreeMap<Section, String>,
    pub pricing: PricingBreakdown,
}

impl BookingSession {
    pub fn new() -> BookingSession {
        BookingSession {
            id: Uuid::new_v4(),
            draft: BookingDraft::default(),
            ledger: OfferingLedger::new(),
            catalog: Vec::new(),
            mandatory: Vec::new(),
            package: None,
            discount: None,
            quote: None,
            sequencer: QuoteSequencer::default(),
            wizard: WizardState::default(),
            section_errors: BTreeMap::new(),
            last_touched: Utc::now(),
            submitting: false,
        }
    }

    pub fn context<'a>(&'a self, zone: &'a BookingZone) -> PricingContext<'a> {
        PricingContext {
            draft: &self.draft,
            ledger: &self.ledger,
            quote: self.quote.as_ref(),
            package: self.package.as_ref(),
            discount: self.discount.as_ref(),
            zone,
        }
    }

    fn reconcile_offerings(&mut self) {
        let package_included: &[Offering] = self
            .package
            .as_ref()
            .map(|p| p.offerings.as_slice())
            .unwrap_or(&[]);
        // the catalog's own mandatory flags count even when the mandatory list
        // failed to load or is shorter
        let mut mandatory = self.mandatory.clone();
        for offering in self.catalog.iter().filter(|o| o.is_mandatory) {
            if !mandatory.iter().any(|m| m.id == offering.id) {
                mandatory.push(offering.clone());
            }
        }
        self.ledger.reconcile(&mandatory, package_included);
        self.ledger.refresh_from_catalog(&self.catalog);
        self.ledger.refresh_from_catalog(&self.mandatory);
    }

    fn find_offering(&self, offering_id: i32) -> Option<Offering> {
        self.catalog
            .iter()
            .chain(self.mandatory.iter())
            .chain(self.package.iter().flat_map(|p| p.offerings.iter()))
            .find(|o| o.id == offering_id)
            .cloned()
            .or_else(|| self.ledger.get(offering_id).map(|s| s.offering.clone()))
    }

    /// Drops the quote when the vehicle or dates moved off the quoted key.
    fn sync_quote_key(&mut self, zone: &BookingZone) {
        let key = quote_sequence::quote_key(&self.draft, zone);
        if !self.sequencer.retarget(key) && self.quote.is_some() {
            debug!("session {} pricing inputs changed, dropping quote", self.id);
            self.quote = None;
        }
    }

    /// Applies one synchronous edit.
    pub fn apply(&mut self, action: BookingAction, zone: &BookingZone) {
        self.last_touched = Utc::now();
        match action {
            BookingAction::SetVehicle { vehicle_id } => {
                self.draft.vehicle_id = vehicle_id;
                self.sync_quote_key(zone);
            }
            BookingAction::SetDates { start_date, end_date } => {
                self.draft.start_date = start_date;
                self.draft.end_date = end_date;
                self.sync_quote_key(zone);
            }
            BookingAction::SetPackage { package } => {
                self.draft.package_id = package.as_ref().map(|p| p.id);
                self.package = package;
                self.section_errors.remove(&Section::Package);
                self.reconcile_offerings();
            }
            BookingAction::SetDiscount { discount } => {
                self.draft.discount_id = discount.as_ref().map(|d| d.id);
                self.discount = discount;
                self.section_errors.remove(&Section::Discount);
            }
            BookingAction::SetCatalog { offerings } => {
                self.catalog = offerings;
                self.section_errors.remove(&Section::Catalog);
                self.reconcile_offerings();
            }
            BookingAction::SetMandatoryOfferings { offerings } => {
                self.mandatory = offerings;
                self.section_errors.remove(&Section::MandatoryOfferings);
                self.reconcile_offerings();
            }
            BookingAction::ToggleOffering { offering_id, selected } => {
                match self.find_offering(offering_id) {
                    Some(offering) => self.ledger.toggle(&offering, selected),
                    None => debug!("session {} toggled unknown offering {}", self.id, offering_id),
                }
            }
            BookingAction::SetQuantity { offering_id, quantity } => {
                self.ledger.set_quantity(offering_id, quantity);
            }
            BookingAction::SetLocations { pickup_location, dropoff_location } => {
                self.draft.pickup_location = pickup_location;
                self.draft.dropoff_location = dropoff_location;
            }
            BookingAction::SetInsurancePolicy { insurance_policy } => {
                self.draft.insurance_policy = insurance_policy;
            }
            BookingAction::SetStatus { status } => {
                self.draft.status = status;
            }
            BookingAction::Advance => {
                let booking_duration = self.context(zone).duration();
                self.wizard.advance(&self.draft, &booking_duration);
            }
            BookingAction::GoToStep { step } => {
                self.wizard.go_to(step);
            }
        }
    }

    /// Issues a ticket for the pricing quote when one is due.
    pub fn request_quote(&mut self, zone: &BookingZone) -> Option<QuoteTicket> {
        let key = quote_sequence::quote_key(&self.draft, zone)?;
        self.sequencer.request(key)
    }

    /// Lands a fetched quote if its ticket is still the newest one.
    pub fn land_quote(&mut self, ticket: &QuoteTicket, quote: PricingQuote) -> bool {
        if !self.sequencer.accept(ticket) {
            return false;
        }
        self.quote = Some(quote);
        self.section_errors.remove(&Section::Pricing);
        true
    }

    pub fn quote_failed(&mut self, ticket: &QuoteTicket, message: String) {
        self.sequencer.fail(ticket);
        if self.sequencer.is_latest(ticket) {
            self.section_errors.insert(Section::Pricing, message);
        }
    }

    pub fn record_section_error(&mut self, section: Section, message: String) {
        self.section_errors.insert(section, message);
    }

    pub fn prepare_submission(&mut self, zone: &BookingZone) -> Result<BookingPayload, ValidationError> {
        self.last_touched = Utc::now();
        let booking_duration = self.context(zone).duration();
        self.wizard.check_submission(&self.draft, &booking_duration, zone)?;
        let payload = booking::build_payload(&self.context(zone));
        if let Err(e) = &payload {
            self.wizard.form_error = Some(e.to_string());
        }
        payload
    }

    /// Validates and claims the session for one submission. `Ok(None)` when
    /// another submission already holds it.
    pub fn claim_submission(&mut self, zone: &BookingZone) -> Result<Option<BookingPayload>, ValidationError> {
        if self.submitting {
            return Ok(None);
        }
        let payload = self.prepare_submission(zone)?;
        self.submitting = true;
        Ok(Some(payload))
    }

    pub fn release_submission(&mut self) {
        self.submitting = false;
    }

    pub fn snapshot(&self, zone: &BookingZone) -> SessionSnapshot {
        let ctx = self.context(zone);
        let booking_duration = ctx.duration();
        SessionSnapshot {
            session_id: self.id,
            draft: self.draft.clone(),
            selections: self.ledger.selections().cloned().collect(),
            catalog: self.catalog.clone(),
            package: self.package.clone(),
            discount: self.discount.clone(),
            pricing_quote: self.quote.clone(),
            wizard: self.wizard.clone(),
            submitting: self.submitting,
            can_proceed: crate::methods::wizard::can_proceed(self.wizard.current, &self.draft, &booking_duration),
            section_errors: self.section_errors.clone(),
            pricing: booking::price_booking(&ctx),
        }
    }
}

impl Default for BookingSession {
    fn default() -> Self {
        BookingSession::new()
    }
}

// Process-wide storage for sessions in progress. Never hold the lock across
// an await.
pub static SESSIONS: Lazy<RwLock<HashMap<Uuid, BookingSession>>> = Lazy::new(|| RwLock::new(HashMap::new()));

pub fn insert_session(session: BookingSession) {
    if let Ok(mut guard) = SESSIONS.write() {
        guard.insert(session.id, session);
    }
}

pub fn remove_session(id: &Uuid) -> Option<BookingSession> {
    SESSIONS.write().ok().and_then(|mut g| g.remove(id))
}

/// Runs `f` against the session under the write lock.
pub fn with_session<T>(id: &Uuid, f: impl FnOnce(&mut BookingSession) -> T) -> Option<T> {
    let mut guard = SESSIONS.write().ok()?;
    guard.get_mut(id).map(f)
}

/// Removes sessions untouched for longer than `idle`. Returns how many went.
pub fn evict_idle(idle: Duration, now: DateTime<Utc>) -> usize {
    let Ok(mut guard) = SESSIONS.write() else {
        return 0;
    };
    let before = guard.len();
    guard.retain(|_, s| s.submitting || now - s.last_touched <= idle);
    let evicted = before - guard.len();
    if evicted > 0 {
        info!("evicted {} idle booking sessions", evicted);
    }
    evicted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::wizard::WizardStep;
    use crate::model::DiscountType;

    fn zone() -> BookingZone {
        BookingZone::default()
    }

    fn gps() -> Offering {
        Offering { id: 4, name: "GPS".to_string(), price: Some(20.0), ..Default::default() }
    }

    fn cleaning() -> Offering {
        Offering { id: 6, name: "Cleaning".to_string(), price: Some(15.0), is_mandatory: true, ..Default::default() }
    }

    fn premium() -> Package {
        Package {
            id: 2,
            name: "Premium".to_string(),
            price_modifier: Some(1.5),
            offerings: vec![Offering { id: 4, ..Default::default() }],
        }
    }

    fn quote() -> PricingQuote {
        PricingQuote { total_full_days: 3.0, subtotal: 300.0, ..Default::default() }
    }

    fn booked_session() -> BookingSession {
        let z = zone();
        let mut s = BookingSession::new();
        s.apply(BookingAction::SetCatalog { offerings: vec![gps(), cleaning()] }, &z);
        s.apply(BookingAction::SetMandatoryOfferings { offerings: vec![cleaning()] }, &z);
        s.apply(BookingAction::SetVehicle { vehicle_id: Some(9) }, &z);
        s.apply(
            BookingAction::SetDates {
                start_date: Some("2025-01-01T10:00".to_string()),
                end_date: Some("2025-01-04T10:00".to_string()),
            },
            &z,
        );
        s
    }

    #[test]
    fn package_selection_reconciles_ledger() {
        let z = zone();
        let mut s = booked_session();
        assert!(s.ledger.get(6).is_some());
        s.apply(BookingAction::SetPackage { package: Some(premium()) }, &z);
        let entry = s.ledger.get(4).unwrap();
        assert!(entry.included);
        // partial package offering got the catalog record
        assert_eq!(entry.unit_price(), 20.0);
        assert_eq!(s.draft.package_id, Some(2));

        s.apply(BookingAction::SetQuantity { offering_id: 4, quantity: 3 }, &z);
        s.apply(BookingAction::SetPackage { package: None }, &z);
        let entry = s.ledger.get(4).unwrap();
        assert!(!entry.included);
        assert_eq!(entry.quantity, 3);
        assert_eq!(s.draft.package_id, None);
    }

    #[test]
    fn mandatory_offering_survives_toggle_off() {
        let z = zone();
        let mut s = booked_session();
        s.apply(BookingAction::ToggleOffering { offering_id: 6, selected: false }, &z);
        assert!(s.ledger.get(6).is_some());
        s.apply(BookingAction::ToggleOffering { offering_id: 4, selected: true }, &z);
        assert!(s.ledger.get(4).is_some());
        s.apply(BookingAction::ToggleOffering { offering_id: 4, selected: false }, &z);
        assert!(s.ledger.get(4).is_none());
    }

    #[test]
    fn quote_ticket_flow() {
        let z = zone();
        let mut s = booked_session();
        let ticket = s.request_quote(&z).unwrap();
        assert!(s.request_quote(&z).is_none());
        assert!(s.land_quote(&ticket, quote()));
        assert_eq!(s.snapshot(&z).pricing.summary.vehicle_charge, 300.0);

        // moving the end date drops the quote and strands the old ticket
        s.apply(
            BookingAction::SetDates {
                start_date: Some("2025-01-01T10:00".to_string()),
                end_date: Some("2025-01-05T10:00".to_string()),
            },
            &z,
        );
        assert!(s.quote.is_none());
        let newer = s.request_quote(&z).unwrap();
        assert!(!s.land_quote(&ticket, quote()));
        assert!(s.quote.is_none());
        assert!(s.land_quote(&newer, quote()));
    }

    #[test]
    fn unrelated_edits_keep_quote() {
        let z = zone();
        let mut s = booked_session();
        let ticket = s.request_quote(&z).unwrap();
        s.land_quote(&ticket, quote());
        s.apply(BookingAction::SetVehicle { vehicle_id: Some(9) }, &z);
        s.apply(BookingAction::SetInsurancePolicy { insurance_policy: "Own cover".to_string() }, &z);
        assert!(s.quote.is_some());
    }

    #[test]
    fn failed_quote_records_section_error() {
        let z = zone();
        let mut s = booked_session();
        let ticket = s.request_quote(&z).unwrap();
        s.quote_failed(&ticket, "pricing unavailable".to_string());
        assert_eq!(s.section_errors.get(&Section::Pricing).map(String::as_str), Some("pricing unavailable"));
        assert!(s.request_quote(&z).is_some());
    }

    #[test]
    fn full_walkthrough_to_payload() {
        let z = zone();
        let mut s = booked_session();
        let ticket = s.request_quote(&z).unwrap();
        s.land_quote(&ticket, quote());
        s.apply(BookingAction::SetPackage { package: Some(premium()) }, &z);
        s.apply(
            BookingAction::SetDiscount {
                discount: Some(Discount { id: 3, discount_type: DiscountType::Percentage, value: 10.0 }),
            },
            &z,
        );

        assert_eq!(s.prepare_submission(&z), Err(ValidationError::NotOnFinalStep));
        s.apply(BookingAction::Advance, &z);
        assert_eq!(s.wizard.current, WizardStep::LogisticCoverage);
        s.apply(BookingAction::Advance, &z);
        assert_eq!(s.wizard.current, WizardStep::LogisticCoverage);
        assert!(!s.snapshot(&z).can_proceed);

        s.apply(
            BookingAction::SetLocations {
                pickup_location: "Depot".to_string(),
                dropoff_location: "Airport".to_string(),
            },
            &z,
        );
        s.apply(BookingAction::Advance, &z);
        assert!(s.wizard.is_on_last_step());

        let payload = s.prepare_submission(&z).unwrap();
        // 450 package + 15 cleaning, GPS unit is free, minus 10%
        assert_eq!(payload.total_rental_fee, 465.0);
        assert_eq!(payload.pricing_summary.discount_amount, 46.5);
        assert_eq!(payload.final_price, 418.5);
        assert_eq!(payload.package_id, Some(2));
        assert_eq!(payload.discount_id, Some(3));
        assert!(s.wizard.form_error.is_none());
    }

    #[test]
    fn catalog_mandatory_flag_survives_toggle_off() {
        let z = zone();
        let mut s = BookingSession::new();
        s.apply(BookingAction::SetCatalog { offerings: vec![gps(), cleaning()] }, &z);
        assert!(s.ledger.get(6).is_some());
        s.apply(BookingAction::ToggleOffering { offering_id: 6, selected: false }, &z);
        assert!(s.ledger.get(6).is_some());
        assert!(s.ledger.is_mandatory(6));
    }

    fn submittable_session() -> BookingSession {
        let z = zone();
        let mut s = booked_session();
        s.apply(BookingAction::Advance, &z);
        s.apply(
            BookingAction::SetLocations {
                pickup_location: "Depot".to_string(),
                dropoff_location: "Airport".to_string(),
            },
            &z,
        );
        s.apply(BookingAction::Advance, &z);
        s
    }

    #[test]
    fn only_one_submission_holds_the_session() {
        let z = zone();
        let mut s = submittable_session();
        assert!(s.claim_submission(&z).unwrap().is_some());
        assert!(s.snapshot(&z).submitting);
        assert_eq!(s.claim_submission(&z), Ok(None));

        // a failed attempt frees it for a retry
        s.release_submission();
        assert!(s.claim_submission(&z).unwrap().is_some());
    }

    #[test]
    fn invalid_draft_does_not_claim() {
        let z = zone();
        let mut s = booked_session();
        assert_eq!(s.claim_submission(&z), Err(ValidationError::NotOnFinalStep));
        assert!(!s.submitting);
    }

    #[test]
    fn store_roundtrip_and_eviction() {
        let mut old = BookingSession::new();
        old.last_touched = Utc::now() - Duration::hours(5);
        let fresh = BookingSession::new();
        let (old_id, fresh_id) = (old.id, fresh.id);
        insert_session(old);
        insert_session(fresh);

        assert_eq!(with_session(&fresh_id, |s| s.id), Some(fresh_id));
        evict_idle(Duration::hours(2), Utc::now());
        assert!(with_session(&old_id, |_| ()).is_none());
        assert!(remove_session(&fresh_id).is_some());
    }
}
