use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferingType {
    Equipment,
    Insurance,
    Service,
    Fee,
    #[default]
    #[serde(other)]
    Other,
}

impl OfferingType {
    /// Unit wording used in the helper text of a bill line.
    pub fn unit_label(&self, quantity: u32) -> &'static str {
        match (self, quantity == 1) {
            (OfferingType::Equipment, true) => "item",
            (OfferingType::Equipment, false) => "items",
            (OfferingType::Insurance, true) => "policy",
            (OfferingType::Insurance, false) => "policies",
            (OfferingType::Service, true) => "service",
            (OfferingType::Service, false) => "services",
            (OfferingType::Fee, true) => "fee",
            (OfferingType::Fee, false) => "fees",
            (OfferingType::Other, true) => "unit",
            (OfferingType::Other, false) => "units",
        }
    }
}

/// Catalog entry for an ancillary add-on. Package payloads embed partial
/// offerings (`{id}` only), so everything but the id falls back to defaults.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Offering {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub is_mandatory: bool,
    #[serde(default)]
    pub max_quantity_per_booking: Option<u32>,
    #[serde(default, rename = "type")]
    pub offering_type: OfferingType,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price_modifier: Option<f64>,
    #[serde(default)]
    pub offerings: Vec<Offering>,
}

impl Package {
    pub fn modifier(&self) -> f64 {
        self.price_modifier.unwrap_or(1.0)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    Percentage,
    Flat,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: i32,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub value: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApplicablePricing {
    #[serde(default)]
    pub rate_type: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub applicable_units: f64,
    #[serde(default)]
    pub rate: f64,
    #[serde(default)]
    pub line_total: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RateSummary {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub units: f64,
    #[serde(default)]
    pub unit_rate: f64,
    #[serde(default)]
    pub subtotal: f64,
}

impl RateSummary {
    pub fn is_empty(&self) -> bool {
        self.units == 0.0 && self.subtotal == 0.0
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PricingAnalysis {
    #[serde(default)]
    pub subtotal: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Server-computed vehicle rate breakdown. Only the fields the pricing core
/// reads are typed; the rest is kept in `extra` so the quote can be echoed
/// back untouched as `appliedPricing`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PricingQuote {
    #[serde(default)]
    pub total_full_days: f64,
    #[serde(default)]
    pub total_partial_hours: f64,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicable_pricings: Option<Vec<ApplicablePricing>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<PricingAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday_daily_summary: Option<RateSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekend_daily_summary: Option<RateSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday_hourly_summary: Option<RateSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekend_hourly_summary: Option<RateSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holiday_daily_summary: Option<RateSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holiday_hourly_summary: Option<RateSummary>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PricingQuote {
    /// Named summaries in display order, paired with their label.
    pub fn named_summaries(&self) -> Vec<(&'static str, &RateSummary)> {
        [
            ("Weekday daily", &self.weekday_daily_summary),
            ("Weekend daily", &self.weekend_daily_summary),
            ("Holiday daily", &self.holiday_daily_summary),
            ("Weekday hourly", &self.weekday_hourly_summary),
            ("Weekend hourly", &self.weekend_hourly_summary),
            ("Holiday hourly", &self.holiday_hourly_summary),
        ]
        .into_iter()
        .filter_map(|(label, summary)| summary.as_ref().map(|s| (label, s)))
        .collect()
    }

    pub fn analysis_subtotal(&self) -> Option<f64> {
        self.analysis.as_ref().and_then(|a| a.subtotal)
    }
}

/// In-progress booking as composed in the wizard. Dates are kept as typed so
/// the guard can tell "missing" apart from "unparseable".
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub vehicle_id: Option<i32>,
    pub package_id: Option<i32>,
    pub discount_id: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub pickup_location: String,
    #[serde(default)]
    pub dropoff_location: String,
    #[serde(default)]
    pub insurance_policy: String,
    #[serde(default)]
    pub status: BookingStatus,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OfferingSelection {
    pub offering: Offering,
    pub quantity: u32,
    pub included: bool,
}

impl OfferingSelection {
    pub fn billable_quantity(&self) -> u32 {
        self.quantity.saturating_sub(if self.included { 1 } else { 0 })
    }

    pub fn unit_price(&self) -> f64 {
        self.offering.price.unwrap_or(0.0)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub label: String,
    pub amount: f64,
    pub helper: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PricingSummary {
    pub vehicle_charge: f64,
    pub package_charge: f64,
    pub offering_charge: f64,
    pub discount_amount: f64,
    pub subtotal: f64,
    pub total: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    #[serde(flatten)]
    pub summary: PricingSummary,
    pub total_days: f64,
    pub total_hours: f64,
    pub duration_label: String,
    pub line_items: Vec<LineItem>,
    pub included_offerings: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingOfferingPayload {
    pub offering_id: i32,
    pub quantity: u32,
    pub price: f64,
    pub total_price: f64,
    pub included: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    pub vehicle_id: i32,
    pub package_id: Option<i32>,
    pub discount_id: Option<i32>,
    pub start_date: String,
    pub end_date: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub insurance_policy: String,
    pub total_days: f64,
    pub total_rental_fee: f64,
    pub final_price: f64,
    pub balance_payment: f64,
    pub status: BookingStatus,
    pub offerings: Vec<BookingOfferingPayload>,
    pub pricing_summary: PricingSummary,
    pub applied_pricing: Option<PricingQuote>,
}
