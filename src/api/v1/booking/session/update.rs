use crate::config::SETTINGS;
use crate::helper_model::{BookingAction, Section, SessionCommand, SessionUpdateRequest};
use crate::integration::rental_backend;
use crate::methods;
use log::warn;
use warp::http::{Method, StatusCode};
use warp::{Filter, Reply};

use super::refresh_pricing;

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    warp::path("update")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(warp::header::optional::<String>("authorization"))
        .and_then(async move |method: Method, body: SessionUpdateRequest, auth: Option<String>| {
            if method != Method::POST {
                return methods::standard_replies::method_not_allowed_response();
            }
            let zone = &SETTINGS.booking_zone;
            let session_id = body.session_id;
            if methods::session::with_session(&session_id, |_| ()).is_none() {
                return methods::standard_replies::session_not_found();
            }

            // selections by id are looked up before touching the session
            let (action, failure) = match body.command {
                SessionCommand::Apply(edit) => (BookingAction::from(edit), None),
                SessionCommand::SelectPackage { package_id: None } => (BookingAction::SetPackage { package: None }, None),
                SessionCommand::SelectPackage { package_id: Some(id) } => {
                    match rental_backend::fetch_package(id, auth.as_deref()).await {
                        Ok(package) => (BookingAction::SetPackage { package: Some(package) }, None),
                        Err(e) => {
                            warn!("package {} unavailable: {}", id, e);
                            (BookingAction::SetPackage { package: None }, Some((Section::Package, e.user_message())))
                        }
                    }
                }
                SessionCommand::SelectDiscount { discount_id: None } => (BookingAction::SetDiscount { discount: None }, None),
                SessionCommand::SelectDiscount { discount_id: Some(id) } => {
                    match rental_backend::fetch_discount(id, auth.as_deref()).await {
                        Ok(discount) => (BookingAction::SetDiscount { discount: Some(discount) }, None),
                        Err(e) => {
                            warn!("discount {} unavailable: {}", id, e);
                            (BookingAction::SetDiscount { discount: None }, Some((Section::Discount, e.user_message())))
                        }
                    }
                }
            };

            let applied = methods::session::with_session(&session_id, |s| {
                s.apply(action, zone);
                if let Some((section, message)) = failure {
                    s.record_section_error(section, message);
                }
            });
            if applied.is_none() || !refresh_pricing(&session_id, auth.as_deref()).await {
                return methods::standard_replies::session_not_found();
            }

            match methods::session::with_session(&session_id, |s| s.snapshot(zone)) {
                Some(snapshot) => methods::standard_replies::response_with_obj(snapshot, StatusCode::OK),
                None => methods::standard_replies::session_not_found(),
            }
        })
}
