//! Helpers for turning the wizard's date inputs into `DateTime<Utc>`.
//! Dashboards send anything from a full RFC 3339 stamp to a bare
//! `YYYY-MM-DDTHH:MM` picked from a datetime input, so zone-less values get
//! the configured booking zone attached.

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Zone used for timestamps that carry no offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BookingZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl BookingZone {
    /// * `"America/Chicago"` → IANA zone (DST aware)
    /// * `"-5"`, `"+2"`, `"0"` → fixed offset in hours
    /// * `"UTC"` → UTC
    pub fn parse(hint: &str) -> anyhow::Result<BookingZone> {
        let hint = hint.trim();
        if let Ok(hours) = hint.parse::<i32>() {
            let offset = FixedOffset::east_opt(hours * 3600)
                .ok_or_else(|| anyhow::anyhow!("invalid offset {}", hint))?;
            return Ok(BookingZone::Fixed(offset));
        }
        let tz: Tz = hint
            .parse()
            .map_err(|e| anyhow::anyhow!("unknown time zone {}: {}", hint, e))?;
        Ok(BookingZone::Named(tz))
    }

    fn attach(&self, naive: &NaiveDateTime, raw: &str) -> anyhow::Result<DateTime<Utc>> {
        let local = match self {
            BookingZone::Named(tz) => tz.from_local_datetime(naive).map(|dt| dt.with_timezone(&Utc)),
            BookingZone::Fixed(offset) => offset.from_local_datetime(naive).map(|dt| dt.with_timezone(&Utc)),
        };
        match local {
            LocalResult::Single(dt) => Ok(dt),
            LocalResult::Ambiguous(dt, _) => Ok(dt), // pick earliest
            LocalResult::None => anyhow::bail!("{} is not a valid local time", raw),
        }
    }
}

impl Default for BookingZone {
    fn default() -> Self {
        BookingZone::Named(chrono_tz::UTC)
    }
}

/// Convert a booking date input to **UTC**.
pub fn parse_booking_timestamp(raw: &str, zone: &BookingZone) -> anyhow::Result<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        anyhow::bail!("timestamp is empty");
    }

    // 1. Carries its own offset or a trailing Z.
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    // 2. Date and time without zone.
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return zone.attach(&naive, raw);
        }
    }

    // 3. Date only → local midnight.
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")?;
    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("{} has no midnight", raw))?;
    zone.attach(&naive, raw)
}

/// `None` for missing, blank or unparseable input.
pub fn parse_optional(raw: Option<&str>, zone: &BookingZone) -> Option<DateTime<Utc>> {
    raw.and_then(|r| parse_booking_timestamp(r, zone).ok())
}
