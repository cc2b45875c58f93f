//! # Metrics Collection
//!
//! Counters for the invite flow, recorded through the `metrics` facade.

use metrics::{counter, describe_counter};

pub const INVITES_ACCEPTED_TOTAL: &str = "maity_invites_accepted_total";
pub const INVITES_REJECTED_TOTAL: &str = "maity_invites_rejected_total";
pub const INVITES_FINALIZED_TOTAL: &str = "maity_invites_finalized_total";
pub const INVITE_USAGE_INCREMENT_FAILURES_TOTAL: &str =
    "maity_invite_usage_increment_failures_total";

/// Register descriptions for every counter this crate emits.
pub fn describe_metrics() {
    describe_counter!(INVITES_ACCEPTED_TOTAL, "Invite cookies issued by accept-invite");
    describe_counter!(INVITES_REJECTED_TOTAL, "Invite flow requests rejected, by error code");
    describe_counter!(INVITES_FINALIZED_TOTAL, "Successful finalize-invite calls, by outcome");
    describe_counter!(
        INVITE_USAGE_INCREMENT_FAILURES_TOTAL,
        "Usage counter increments that failed after a committed assignment"
    );
}

/// Metrics recorder that tracks invite flow events
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorder;

impl MetricsRecorder {
    pub fn new() -> Self {
        Self
    }

    pub fn record_invite_accepted(&self, mode: &'static str) {
        counter!(INVITES_ACCEPTED_TOTAL, "mode" => mode).increment(1);
    }

    /// Record a rejected request under its client-visible error code.
    pub fn record_invite_rejected(&self, operation: &'static str, code: &'static str) {
        counter!(INVITES_REJECTED_TOTAL, "operation" => operation, "code" => code).increment(1);
    }

    pub fn record_invite_finalized(&self, assigned: bool, audience: &'static str) {
        let outcome = if assigned { "assigned" } else { "already_assigned" };
        counter!(INVITES_FINALIZED_TOTAL, "outcome" => outcome, "audience" => audience)
            .increment(1);
    }

    pub fn record_usage_increment_failure(&self) {
        counter!(INVITE_USAGE_INCREMENT_FAILURES_TOTAL).increment(1);
    }
}
