use std::env;
use std::net::{IpAddr, Ipv4Addr};

use anyhow::Context;
use dotenv::dotenv;
use log::warn;
use once_cell::sync::Lazy;

use crate::methods::timestamps::BookingZone;

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_PORT: u16 = 3030;
const DEFAULT_SESSION_IDLE_MINUTES: i64 = 120;

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: IpAddr,
    pub port: u16,
    pub backend_url: String,
    pub booking_zone: BookingZone,
    pub session_idle_minutes: i64,
}

fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Settings> {
        dotenv().ok();
        let host: IpAddr = env_or_default("HTTP_HOST", "127.0.0.1")
            .parse()
            .context("HTTP_HOST must be an IP address")?;
        let port: u16 = env_or_default("HTTP_PORT", &DEFAULT_PORT.to_string())
            .parse()
            .context("HTTP_PORT must be a port number")?;
        let backend_url = env_or_default("RENTAL_BACKEND_URL", DEFAULT_BACKEND_URL)
            .trim_end_matches('/')
            .to_string();
        let booking_zone = BookingZone::parse(&env_or_default("BOOKING_TIMEZONE", "UTC"))
            .context("BOOKING_TIMEZONE must be an IANA zone or an hour offset")?;
        let session_idle_minutes: i64 = env_or_default(
            "SESSION_IDLE_MINUTES",
            &DEFAULT_SESSION_IDLE_MINUTES.to_string(),
        )
        .parse()
        .context("SESSION_IDLE_MINUTES must be a whole number")?;
        Ok(Settings {
            host,
            port,
            backend_url,
            booking_zone,
            session_idle_minutes: session_idle_minutes.max(1),
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            booking_zone: BookingZone::default(),
            session_idle_minutes: DEFAULT_SESSION_IDLE_MINUTES,
        }
    }
}

pub static SETTINGS: Lazy<Settings> = Lazy::new(|| match Settings::from_env() {
    Ok(settings) => settings,
    Err(e) => {
        warn!("invalid configuration, falling back to defaults: {:#}", e);
        Settings::default()
    }
});
