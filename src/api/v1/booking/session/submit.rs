use crate::config::SETTINGS;
use crate::helper_model::SessionId;
use crate::integration::rental_backend;
use crate::methods;
use log::{error, info, warn};
use warp::http::{Method, StatusCode};
use warp::{Filter, Reply};

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    warp::path("submit")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(warp::header::optional::<String>("authorization"))
        .and_then(async move |method: Method, body: SessionId, auth: Option<String>| {
            if method != Method::POST {
                return methods::standard_replies::method_not_allowed_response();
            }
            let zone = &SETTINGS.booking_zone;
            let session_id = body.session_id;
            // claimed under the lock so overlapping submits cannot both send
            let claimed = methods::session::with_session(&session_id, |s| {
                s.claim_submission(zone).map_err(|e| (e, s.snapshot(zone)))
            });
            let payload = match claimed {
                None => return methods::standard_replies::session_not_found(),
                Some(Err((e, snapshot))) => {
                    info!("session {} not submitted: {}", session_id, e);
                    return methods::standard_replies::validation_failed(&e, snapshot);
                }
                Some(Ok(None)) => {
                    warn!("session {} already has a submission in flight", session_id);
                    return methods::standard_replies::submission_in_progress();
                }
                Some(Ok(Some(payload))) => payload,
            };

            match rental_backend::create_booking(&payload, auth.as_deref()).await {
                Ok(created) => {
                    methods::session::remove_session(&session_id);
                    info!("session {} submitted booking for vehicle {}", session_id, payload.vehicle_id);
                    let msg = serde_json::json!({"booking": created, "payload": payload});
                    methods::standard_replies::response_with_obj(msg, StatusCode::CREATED)
                }
                Err(e) => {
                    // keep the session so the user can retry as is
                    error!("session {} booking creation failed: {}", session_id, e);
                    let released = methods::session::with_session(&session_id, |s| {
                        s.release_submission();
                        s.snapshot(zone)
                    });
                    match released {
                        Some(snapshot) => methods::standard_replies::submission_rejected(&e, snapshot),
                        None => methods::standard_replies::session_not_found(),
                    }
                }
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper_model::{BookingAction, SubmissionRejected};
    use crate::methods::session::BookingSession;

    #[tokio::test]
    async fn incomplete_booking_is_not_sent() {
        let zone = &SETTINGS.booking_zone;
        let mut session = BookingSession::new();
        session.apply(BookingAction::SetVehicle { vehicle_id: Some(5) }, zone);
        session.apply(
            BookingAction::SetDates {
                start_date: Some("2025-01-01T10:00:00Z".to_string()),
                end_date: Some("2025-01-01T09:00:00Z".to_string()),
            },
            zone,
        );
        // walk the wizard to the last step directly
        session.wizard.furthest = crate::methods::wizard::WizardStep::PricingOverview;
        session.wizard.go_to(crate::methods::wizard::WizardStep::PricingOverview);
        let id = session.id;
        methods::session::insert_session(session);

        let resp = warp::test::request()
            .method("POST")
            .path("/submit")
            .json(&serde_json::json!({ "sessionId": id }))
            .reply(&main())
            .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: SubmissionRejected = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body.error.message, "Start date must be before end date");
        assert_eq!(body.session.wizard.form_error.as_deref(), Some("Start date must be before end date"));
        assert_eq!(body.session.pricing.total_days, 0.0);

        // the session is still there for the user to fix
        assert_eq!(methods::session::with_session(&id, |s| s.submitting), Some(false));
        methods::session::remove_session(&id);
    }

    #[tokio::test]
    async fn second_submit_waits_for_the_first() {
        let zone = &SETTINGS.booking_zone;
        let mut session = BookingSession::new();
        session.apply(BookingAction::SetVehicle { vehicle_id: Some(5) }, zone);
        session.apply(
            BookingAction::SetDates {
                start_date: Some("2025-01-01T10:00:00Z".to_string()),
                end_date: Some("2025-01-03T10:00:00Z".to_string()),
            },
            zone,
        );
        session.wizard.furthest = crate::methods::wizard::WizardStep::PricingOverview;
        session.wizard.go_to(crate::methods::wizard::WizardStep::PricingOverview);
        // first submit claimed the session and is waiting on the backend
        assert!(session.claim_submission(zone).unwrap().is_some());
        let id = session.id;
        methods::session::insert_session(session);

        let resp = warp::test::request()
            .method("POST")
            .path("/submit")
            .json(&serde_json::json!({ "sessionId": id }))
            .reply(&main())
            .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(methods::session::with_session(&id, |s| s.submitting), Some(true));
        methods::session::remove_session(&id);
    }
}
