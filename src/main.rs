mod api;
mod config;
mod helper_model;
mod integration;
mod methods;
mod model;
mod scheduled_tasks;

use config::SETTINGS;
use env_logger::Env;
use log::info;
use std::net::SocketAddr;
use warp::Filter;

#[tokio::main]
async fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let addr = SocketAddr::new(SETTINGS.host, SETTINGS.port);
    info!("quoting against {}", SETTINGS.backend_url);

    tokio::spawn(scheduled_tasks::session_sweeper());

    // routing for the server
    let httpd = api::api()
        .and(warp::path::end())
        .with(warp::log("rental_quote_httpd"));
    info!("listening on {}", addr);
    warp::serve(httpd).run(addr).await;
}
