use crate::config::SETTINGS;
use crate::helper_model::SessionId;
use crate::methods;
use warp::http::{Method, StatusCode};
use warp::{Filter, Reply};

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    warp::path("get")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and_then(async move |method: Method, body: SessionId| {
            if method != Method::POST {
                return methods::standard_replies::method_not_allowed_response();
            }
            let zone = &SETTINGS.booking_zone;
            match methods::session::with_session(&body.session_id, |s| s.snapshot(zone)) {
                Some(snapshot) => methods::standard_replies::response_with_obj(snapshot, StatusCode::OK),
                None => methods::standard_replies::session_not_found(),
            }
        })
}
