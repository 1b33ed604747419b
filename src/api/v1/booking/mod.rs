mod quote;
mod session;

use warp::Filter;

pub fn api_v1_booking()
-> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("booking")
        .and(
            quote::main()
                .or(session::api_v1_booking_session())
        )
        .and(warp::path::end())
}
