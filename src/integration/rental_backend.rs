use chrono::SecondsFormat;
use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::SETTINGS;
use crate::helper_model::BackendError;
use crate::methods::quote_sequence::QuoteKey;
use crate::model::{BookingPayload, Discount, Offering, Package, PricingQuote};

// One client for the process so connections are pooled.
static CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

fn url(path: &str) -> String {
    format!("{}{}", SETTINGS.backend_url, path)
}

pub const REQUEST_FAILED: &str = "The rental backend could not complete the request.";
pub const BOOKING_FAILED: &str = "The booking could not be created.";

/// Pulls a human readable message out of an error body, falling back to the
/// raw text and then to `fallback`.
pub fn extract_message(body: &str, fallback: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error", "detail", "title"] {
            if let Some(msg) = json.get(key).and_then(Value::as_str) {
                if !msg.is_empty() {
                    return msg.to_string();
                }
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Offering lists come either bare or wrapped in a HAL `_embedded` envelope.
pub fn unwrap_offering_list(body: Value) -> Result<Vec<Offering>, BackendError> {
    let list = match body {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => match map.remove("_embedded") {
            Some(Value::Object(mut embedded)) => embedded
                .remove("offerings")
                .or_else(|| embedded.into_iter().next().map(|(_, v)| v))
                .unwrap_or(Value::Array(vec![])),
            _ => map.remove("content").unwrap_or(Value::Array(vec![])),
        },
        other => return Err(BackendError::Decode(format!("offering list was {}", other))),
    };
    serde_json::from_value(list).map_err(|e| BackendError::Decode(e.to_string()))
}

async fn send(
    request: reqwest::RequestBuilder,
    authorization: Option<&str>,
    fallback: &str,
) -> Result<reqwest::Response, BackendError> {
    let request = match authorization {
        Some(auth) => request.header(reqwest::header::AUTHORIZATION, auth),
        None => request,
    };
    let resp = request.send().await?;
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        warn!("rental backend answered {}: {}", status, body);
        return Err(BackendError::Rejected {
            status: status.as_u16(),
            message: extract_message(&body, fallback),
        });
    }
    Ok(resp)
}

async fn get_json<T: DeserializeOwned>(
    path: &str,
    query: &[(&str, String)],
    authorization: Option<&str>,
) -> Result<T, BackendError> {
    debug!("GET {}", path);
    let resp = send(CLIENT.get(url(path)).query(query), authorization, REQUEST_FAILED).await?;
    resp.json::<T>()
        .await
        .map_err(|e| BackendError::Decode(e.to_string()))
}

pub async fn fetch_pricing_quote(
    key: &QuoteKey,
    authorization: Option<&str>,
) -> Result<PricingQuote, BackendError> {
    let query = [
        ("startDate", key.start.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ("endDate", key.end.to_rfc3339_opts(SecondsFormat::Secs, true)),
    ];
    get_json(&format!("/api/vehicles/{}/pricing", key.vehicle_id), &query, authorization).await
}

pub async fn fetch_package(package_id: i32, authorization: Option<&str>) -> Result<Package, BackendError> {
    get_json(&format!("/api/packages/{}", package_id), &[], authorization).await
}

pub async fn fetch_discount(discount_id: i32, authorization: Option<&str>) -> Result<Discount, BackendError> {
    get_json(&format!("/api/discounts/{}", discount_id), &[], authorization).await
}

pub async fn fetch_offerings(authorization: Option<&str>) -> Result<Vec<Offering>, BackendError> {
    let body: Value = get_json("/api/offerings", &[], authorization).await?;
    unwrap_offering_list(body)
}

pub async fn fetch_mandatory_offerings(authorization: Option<&str>) -> Result<Vec<Offering>, BackendError> {
    let body: Value = get_json("/api/offerings/search/mandatory", &[], authorization).await?;
    let offerings = unwrap_offering_list(body)?;
    Ok(offerings
        .into_iter()
        .map(|mut o| {
            o.is_mandatory = true;
            o
        })
        .collect())
}

/// Posts the booking and hands back whatever the backend created.
pub async fn create_booking(
    payload: &BookingPayload,
    authorization: Option<&str>,
) -> Result<Value, BackendError> {
    debug!("POST /api/bookings for vehicle {}", payload.vehicle_id);
    let resp = send(CLIENT.post(url("/api/bookings")).json(payload), authorization, BOOKING_FAILED).await?;
    let text = resp.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))
}
