mod get;
mod new;
mod submit;
mod update;

use crate::config::SETTINGS;
use crate::integration::rental_backend;
use crate::methods::session;
use log::{debug, warn};
use uuid::Uuid;
use warp::Filter;

pub fn api_v1_booking_session()
-> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("session")
        .and(
            new::main()
                .or(get::main())
                .or(update::main())
                .or(submit::main())
        )
        .and(warp::path::end())
}

/// Fetches the pricing quote when the session's inputs call for one and lands
/// it only if no newer fetch was issued meanwhile. Returns false when the
/// session disappeared.
pub(crate) async fn refresh_pricing(session_id: &Uuid, authorization: Option<&str>) -> bool {
    let zone = &SETTINGS.booking_zone;
    let Some(ticket) = session::with_session(session_id, |s| s.request_quote(zone)) else {
        return false;
    };
    let Some(ticket) = ticket else {
        return true;
    };
    debug!("session {} fetching pricing quote #{}", session_id, ticket.token);
    let fetched = rental_backend::fetch_pricing_quote(&ticket.key, authorization).await;
    session::with_session(session_id, |s| match fetched {
        Ok(quote) => {
            if !s.land_quote(&ticket, quote) {
                warn!("session {} dropped stale pricing quote #{}", session_id, ticket.token);
            }
        }
        Err(e) => {
            warn!("session {} pricing quote failed: {}", session_id, e);
            s.quote_failed(&ticket, e.user_message());
        }
    })
    .is_some()
}
