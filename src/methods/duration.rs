use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

use crate::methods::timestamps::{self, BookingZone};
use crate::model::BookingDraft;

const MS_PER_DAY: f64 = 86_400_000.0;
const MS_PER_HOUR: f64 = 3_600_000.0;
// Keeps a valid range from ever pricing at zero days.
const MIN_DURATION: f64 = 0.01;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BookingDuration {
    pub total_days: f64,
    pub total_hours: f64,
}

impl BookingDuration {
    pub fn is_positive(&self) -> bool {
        self.total_days > 0.0
    }
}

fn floored(elapsed_ms: f64, unit_ms: f64) -> f64 {
    let value = elapsed_ms / unit_ms;
    if value.is_nan() || value <= 0.0 {
        0.0
    } else {
        value.max(MIN_DURATION)
    }
}

pub fn calculate_duration(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> BookingDuration {
    let (Some(start), Some(end)) = (start, end) else {
        return BookingDuration::default();
    };
    let elapsed_ms = (end - start).num_milliseconds() as f64;
    BookingDuration {
        total_days: floored(elapsed_ms, MS_PER_DAY),
        total_hours: floored(elapsed_ms, MS_PER_HOUR),
    }
}

pub fn draft_duration(draft: &BookingDraft, zone: &BookingZone) -> BookingDuration {
    calculate_duration(
        timestamps::parse_optional(draft.start_date.as_deref(), zone),
        timestamps::parse_optional(draft.end_date.as_deref(), zone),
    )
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// "2 days, 3 hours", "1 day" or "5 hours".
pub fn format_duration(total_hours: f64) -> String {
    let whole_hours = total_hours.max(0.0).floor() as i64;
    let days = whole_hours / 24;
    let hours = whole_hours % 24;
    if days == 0 {
        return plural(hours, "hour");
    }
    if hours == 0 {
        plural(days, "day")
    } else {
        format!("{}, {}", plural(days, "day"), plural(hours, "hour"))
    }
}
