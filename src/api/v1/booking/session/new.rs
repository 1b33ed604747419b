use crate::config::SETTINGS;
use crate::helper_model::{BookingAction, Section};
use crate::integration::rental_backend;
use crate::methods;
use crate::methods::session::BookingSession;
use log::{info, warn};
use warp::http::{Method, StatusCode};
use warp::{Filter, Reply};

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    warp::path("new")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::header::optional::<String>("authorization"))
        .and_then(async move |method: Method, auth: Option<String>| {
            if method != Method::POST {
                return methods::standard_replies::method_not_allowed_response();
            }
            let zone = &SETTINGS.booking_zone;
            let mut session = BookingSession::new();

            // catalog lookups are independent, fire both at once
            let (catalog, mandatory) = futures::join!(
                rental_backend::fetch_offerings(auth.as_deref()),
                rental_backend::fetch_mandatory_offerings(auth.as_deref()),
            );
            match catalog {
                Ok(offerings) => session.apply(BookingAction::SetCatalog { offerings }, zone),
                Err(e) => {
                    warn!("offering catalog unavailable: {}", e);
                    session.record_section_error(Section::Catalog, e.user_message());
                }
            }
            match mandatory {
                Ok(offerings) => session.apply(BookingAction::SetMandatoryOfferings { offerings }, zone),
                Err(e) => {
                    warn!("mandatory offerings unavailable: {}", e);
                    session.record_section_error(Section::MandatoryOfferings, e.user_message());
                }
            }

            let snapshot = session.snapshot(zone);
            info!("booking session {} opened", session.id);
            methods::session::insert_session(session);
            methods::standard_replies::response_with_obj(snapshot, StatusCode::CREATED)
        })
}
