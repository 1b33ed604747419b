use crate::config::SETTINGS;
use crate::helper_model::QuoteRequest;
use crate::methods;
use crate::methods::booking::PricingContext;
use crate::methods::offering_ledger::OfferingLedger;
use crate::methods::timestamps::BookingZone;
use crate::model::{BookingDraft, PricingBreakdown};
use warp::http::{Method, StatusCode};
use warp::{Filter, Reply};

/// Prices a booking from everything in the request body; nothing is stored.
pub fn quote_from_request(body: &QuoteRequest, zone: &BookingZone) -> PricingBreakdown {
    let draft = BookingDraft {
        start_date: body.start_date.clone(),
        end_date: body.end_date.clone(),
        package_id: body.package.as_ref().map(|p| p.id),
        discount_id: body.discount.as_ref().map(|d| d.id),
        ..Default::default()
    };
    let mut ledger = OfferingLedger::new();
    let package_included = body
        .package
        .as_ref()
        .map(|p| p.offerings.as_slice())
        .unwrap_or(&[]);
    ledger.reconcile(&body.mandatory_offerings, package_included);
    for choice in &body.selections {
        ledger.toggle(&choice.offering, true);
        ledger.set_quantity(choice.offering.id, choice.quantity);
    }
    let chosen: Vec<_> = body.selections.iter().map(|c| c.offering.clone()).collect();
    ledger.refresh_from_catalog(&chosen);

    methods::booking::price_booking(&PricingContext {
        draft: &draft,
        ledger: &ledger,
        quote: body.pricing_quote.as_ref(),
        package: body.package.as_ref(),
        discount: body.discount.as_ref(),
        zone,
    })
}

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    warp::path("quote")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and_then(async move |method: Method, body: QuoteRequest| {
            if method != Method::POST {
                return methods::standard_replies::method_not_allowed_response();
            }
            let breakdown = quote_from_request(&body, &SETTINGS.booking_zone);
            methods::standard_replies::response_with_obj(breakdown, StatusCode::OK)
        })
}
