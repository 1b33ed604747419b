pub mod booking;
pub mod charges;
pub mod discount;
pub mod duration;
pub mod money;
pub mod offering_ledger;
pub mod quote_sequence;
pub mod session;
pub mod standard_replies;
pub mod timestamps;
pub mod wizard;
