use std::collections::BTreeSet;

use serde_derive::{Deserialize, Serialize};

use crate::helper_model::ValidationError;
use crate::methods::duration::BookingDuration;
use crate::methods::timestamps::{self, BookingZone};
use crate::model::BookingDraft;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
    ReservationDetails,
    LogisticCoverage,
    PricingOverview,
}

impl WizardStep {
    pub const LAST: WizardStep = WizardStep::PricingOverview;

    pub fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::ReservationDetails => Some(WizardStep::LogisticCoverage),
            WizardStep::LogisticCoverage => Some(WizardStep::PricingOverview),
            WizardStep::PricingOverview => None,
        }
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

pub fn can_proceed(step: WizardStep, draft: &BookingDraft, booking_duration: &BookingDuration) -> bool {
    match step {
        WizardStep::ReservationDetails => {
            draft.vehicle_id.is_some()
                && is_set(&draft.start_date)
                && is_set(&draft.end_date)
                && booking_duration.is_positive()
        }
        WizardStep::LogisticCoverage => {
            !draft.pickup_location.trim().is_empty() && !draft.dropoff_location.trim().is_empty()
        }
        WizardStep::PricingOverview => true,
    }
}

/// Final gate before a booking is sent to the backend.
pub fn validate_submission(
    draft: &BookingDraft,
    booking_duration: &BookingDuration,
    zone: &BookingZone,
) -> Result<(), ValidationError> {
    if draft.vehicle_id.is_none() {
        return Err(ValidationError::MissingVehicle);
    }
    if !is_set(&draft.start_date) || !is_set(&draft.end_date) {
        return Err(ValidationError::MissingDates);
    }
    let start = timestamps::parse_optional(draft.start_date.as_deref(), zone);
    let end = timestamps::parse_optional(draft.end_date.as_deref(), zone);
    let (Some(start), Some(end)) = (start, end) else {
        return Err(ValidationError::InvalidDates);
    };
    if start >= end {
        return Err(ValidationError::StartNotBeforeEnd);
    }
    if !booking_duration.is_positive() {
        return Err(ValidationError::ZeroDuration);
    }
    Ok(())
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    pub current: WizardStep,
    pub furthest: WizardStep,
    pub completed: BTreeSet<WizardStep>,
    pub form_error: Option<String>,
}

impl Default for WizardState {
    fn default() -> Self {
        WizardState {
            current: WizardStep::ReservationDetails,
            furthest: WizardStep::ReservationDetails,
            completed: BTreeSet::new(),
            form_error: None,
        }
    }
}

impl WizardState {
    pub fn is_on_last_step(&self) -> bool {
        self.current == WizardStep::LAST
    }

    /// Moves one step forward when the current step validates.
    pub fn advance(&mut self, draft: &BookingDraft, booking_duration: &BookingDuration) -> bool {
        let Some(next) = self.current.next() else {
            return false;
        };
        if !can_proceed(self.current, draft, booking_duration) {
            return false;
        }
        self.completed.insert(self.current);
        self.current = next;
        self.furthest = self.furthest.max(next);
        true
    }

    /// Jumps to any step already reached.
    pub fn go_to(&mut self, step: WizardStep) -> bool {
        if step > self.furthest {
            return false;
        }
        self.current = step;
        true
    }

    /// Runs the submission guard and records its message as the form error.
    pub fn check_submission(
        &mut self,
        draft: &BookingDraft,
        booking_duration: &BookingDuration,
        zone: &BookingZone,
    ) -> Result<(), ValidationError> {
        let result = if self.is_on_last_step() {
            validate_submission(draft, booking_duration, zone)
        } else {
            Err(ValidationError::NotOnFinalStep)
        };
        self.form_error = result.as_ref().err().map(|e| e.to_string());
        result
    }
}
