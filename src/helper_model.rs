use serde_derive::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::methods::wizard::WizardStep;
use crate::model;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ErrorResponse {
    pub title: String,
    pub message: String,
}

/// Form-level problems that stop a booking from being submitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a vehicle")]
    MissingVehicle,
    #[error("Please select both a start and an end date")]
    MissingDates,
    #[error("Start and end dates must be valid dates")]
    InvalidDates,
    #[error("Start date must be before end date")]
    StartNotBeforeEnd,
    #[error("Booking duration must be greater than zero")]
    ZeroDuration,
    #[error("Complete every step before submitting")]
    NotOnFinalStep,
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("rental backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("rental backend answered {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected rental backend response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Text shown to the dashboard user.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Rejected { message, .. } => message.clone(),
            BackendError::Transport(_) => "The rental backend could not be reached.".to_string(),
            BackendError::Decode(_) => "The rental backend sent a response we could not read.".to_string(),
        }
    }
}

/// Wizard sections whose remote data may fail to load independently.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    Pricing,
    Package,
    Discount,
    Catalog,
    MandatoryOfferings,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OfferingChoice {
    pub offering: model::Offering,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

/// Body of the stateless quote route.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub package: Option<model::Package>,
    #[serde(default)]
    pub discount: Option<model::Discount>,
    #[serde(default)]
    pub mandatory_offerings: Vec<model::Offering>,
    #[serde(default)]
    pub selections: Vec<OfferingChoice>,
    #[serde(default)]
    pub pricing_quote: Option<model::PricingQuote>,
}

/// Edits a client may send. Catalog data, packages, discounts and quotes are
/// never accepted from the wire; they only arrive through backend fetches.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BookingEdit {
    SetVehicle { vehicle_id: Option<i32> },
    SetDates { start_date: Option<String>, end_date: Option<String> },
    ToggleOffering { offering_id: i32, selected: bool },
    SetQuantity { offering_id: i32, quantity: u32 },
    SetLocations { pickup_location: String, dropoff_location: String },
    SetInsurancePolicy { insurance_policy: String },
    SetStatus { status: model::BookingStatus },
    Advance,
    GoToStep { step: WizardStep },
}

/// Synchronous edits applied to a session's state.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingAction {
    SetVehicle { vehicle_id: Option<i32> },
    SetDates { start_date: Option<String>, end_date: Option<String> },
    SetPackage { package: Option<model::Package> },
    SetDiscount { discount: Option<model::Discount> },
    SetCatalog { offerings: Vec<model::Offering> },
    SetMandatoryOfferings { offerings: Vec<model::Offering> },
    ToggleOffering { offering_id: i32, selected: bool },
    SetQuantity { offering_id: i32, quantity: u32 },
    SetLocations { pickup_location: String, dropoff_location: String },
    SetInsurancePolicy { insurance_policy: String },
    SetStatus { status: model::BookingStatus },
    Advance,
    GoToStep { step: WizardStep },
}

impl From<BookingEdit> for BookingAction {
    fn from(edit: BookingEdit) -> Self {
        match edit {
            BookingEdit::SetVehicle { vehicle_id } => BookingAction::SetVehicle { vehicle_id },
            BookingEdit::SetDates { start_date, end_date } => BookingAction::SetDates { start_date, end_date },
            BookingEdit::ToggleOffering { offering_id, selected } => {
                BookingAction::ToggleOffering { offering_id, selected }
            }
            BookingEdit::SetQuantity { offering_id, quantity } => BookingAction::SetQuantity { offering_id, quantity },
            BookingEdit::SetLocations { pickup_location, dropoff_location } => {
                BookingAction::SetLocations { pickup_location, dropoff_location }
            }
            BookingEdit::SetInsurancePolicy { insurance_policy } => BookingAction::SetInsurancePolicy { insurance_policy },
            BookingEdit::SetStatus { status } => BookingAction::SetStatus { status },
            BookingEdit::Advance => BookingAction::Advance,
            BookingEdit::GoToStep { step } => BookingAction::GoToStep { step },
        }
    }
}

/// What the session update route accepts: a plain edit, or a selection by
/// id that is looked up on the rental backend first.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SessionCommand {
    SelectPackage { package_id: Option<i32> },
    SelectDiscount { discount_id: Option<i32> },
    Apply(BookingEdit),
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionId {
    pub session_id: Uuid,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdateRequest {
    pub session_id: Uuid,
    pub command: SessionCommand,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRejected {
    pub error: ErrorResponse,
    pub session: crate::methods::session::SessionSnapshot,
}
