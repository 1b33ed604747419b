use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

use crate::methods::timestamps::{self, BookingZone};
use crate::model::BookingDraft;

/// Inputs a pricing quote is fetched for.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteKey {
    pub vehicle_id: i32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteTicket {
    pub token: u64,
    pub key: QuoteKey,
}

/// A quote is only worth fetching once the vehicle and a valid range are
/// both known; half-typed dates never reach the backend.
pub fn quote_key(draft: &BookingDraft, zone: &BookingZone) -> Option<QuoteKey> {
    let vehicle_id = draft.vehicle_id?;
    let start = timestamps::parse_optional(draft.start_date.as_deref(), zone)?;
    let end = timestamps::parse_optional(draft.end_date.as_deref(), zone)?;
    if start >= end {
        return None;
    }
    Some(QuoteKey { vehicle_id, start, end })
}

/// Hands out monotonic tokens for pricing fetches; only the newest token may
/// land its response.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSequencer {
    last_token: u64,
    pending: Option<QuoteKey>,
    applied: Option<QuoteKey>,
}

impl QuoteSequencer {
    /// `None` when the key is already applied or already in flight.
    pub fn request(&mut self, key: QuoteKey) -> Option<QuoteTicket> {
        if self.applied == Some(key) || self.pending == Some(key) {
            return None;
        }
        self.last_token += 1;
        self.pending = Some(key);
        Some(QuoteTicket { token: self.last_token, key })
    }

    /// Whether a response for `ticket` may be applied. Accepting clears the
    /// pending slot.
    pub fn accept(&mut self, ticket: &QuoteTicket) -> bool {
        if ticket.token != self.last_token {
            return false;
        }
        self.pending = None;
        self.applied = Some(ticket.key);
        true
    }

    pub fn is_latest(&self, ticket: &QuoteTicket) -> bool {
        ticket.token == self.last_token
    }

    /// A failed fetch frees the key so the next update can retry it.
    pub fn fail(&mut self, ticket: &QuoteTicket) {
        if self.is_latest(ticket) {
            self.pending = None;
        }
    }

    /// Points the sequencer at the inputs the draft now describes. An
    /// in-flight fetch for other inputs is stranded. Returns whether the
    /// applied quote still matches.
    pub fn retarget(&mut self, key: Option<QuoteKey>) -> bool {
        if self.pending.is_some() && self.pending != key {
            self.last_token += 1;
            self.pending = None;
        }
        if self.applied.is_some() && self.applied == key {
            return true;
        }
        self.applied = None;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn key(vehicle_id: i32, days: u32) -> QuoteKey {
        QuoteKey {
            vehicle_id,
            start: Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 1, 1 + days, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn gating_needs_vehicle_and_valid_range() {
        let zone = BookingZone::default();
        let mut draft = BookingDraft {
            start_date: Some("2025-01-01T10:00".to_string()),
            ..Default::default()
        };
        assert!(quote_key(&draft, &zone).is_none());
        draft.end_date = Some("2025-01-0".to_string());
        draft.vehicle_id = Some(3);
        assert!(quote_key(&draft, &zone).is_none());
        draft.end_date = Some("2025-01-01T09:00".to_string());
        assert!(quote_key(&draft, &zone).is_none());
        draft.end_date = Some("2025-01-04T10:00".to_string());
        assert_eq!(quote_key(&draft, &zone), Some(key(3, 3)));
    }

    #[test]
    fn out_of_order_response_is_dropped() {
        let mut seq = QuoteSequencer::default();
        let first = seq.request(key(1, 1)).unwrap();
        let second = seq.request(key(1, 2)).unwrap();
        assert!(second.token > first.token);

        // second resolves first, then the stale first one arrives
        assert!(seq.accept(&second));
        assert!(!seq.accept(&first));
        assert_eq!(seq.applied, Some(key(1, 2)));
    }

    #[test]
    fn same_key_is_not_refetched() {
        let mut seq = QuoteSequencer::default();
        let ticket = seq.request(key(1, 1)).unwrap();
        assert!(seq.request(key(1, 1)).is_none());
        assert!(seq.accept(&ticket));
        assert!(seq.request(key(1, 1)).is_none());
    }

    #[test]
    fn failure_allows_retry() {
        let mut seq = QuoteSequencer::default();
        let ticket = seq.request(key(2, 1)).unwrap();
        seq.fail(&ticket);
        assert!(seq.request(key(2, 1)).is_some());
    }

    #[test]
    fn retarget_strands_in_flight_fetch() {
        let mut seq = QuoteSequencer::default();
        let ticket = seq.request(key(2, 1)).unwrap();
        assert!(!seq.retarget(None));
        assert!(!seq.accept(&ticket));
        assert!(seq.applied.is_none());
    }

    #[test]
    fn retarget_keeps_matching_quote() {
        let mut seq = QuoteSequencer::default();
        let ticket = seq.request(key(2, 1)).unwrap();
        assert!(seq.accept(&ticket));
        assert!(seq.retarget(Some(key(2, 1))));
        assert!(!seq.retarget(Some(key(2, 3))));
        assert!(seq.applied.is_none());
    }
}
