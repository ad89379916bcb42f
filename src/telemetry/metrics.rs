//! Metric definitions
//!
//! The library only emits through the `metrics` facade. Hosts that want the
//! numbers install a recorder of their choice before sending.

use metrics::{counter, describe_counter};

pub const SEND_TOTAL: &str = "email_hook_send_total";

pub const OUTCOME_SENT: &str = "sent";
pub const OUTCOME_INVALID: &str = "invalid";
pub const OUTCOME_FAILED: &str = "failed";

/// Register metric descriptions
pub fn describe_metrics() {
    describe_counter!(
        SEND_TOTAL,
        "Email send attempts by engine and outcome (sent/invalid/failed)"
    );
}

pub fn record_send(engine: &'static str, outcome: &'static str) {
    counter!(SEND_TOTAL, "engine" => engine, "outcome" => outcome).increment(1);
}
