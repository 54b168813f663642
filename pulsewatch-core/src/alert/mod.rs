//! Threshold alerts and their dispatch
//!
//! `evaluate` turns a vitals snapshot into an ordered alert list;
//! `AlertDispatcher` sounds the local alarm and forwards rate-limited
//! notifications to the external sink.

pub mod dispatcher;
pub mod threshold;

pub use dispatcher::{AlarmOutcome, AlertDispatcher, DispatchOutcome, NotificationOutcome};
pub use threshold::{evaluate, AlertKind, AlertList, AlertRecord, Severity};
