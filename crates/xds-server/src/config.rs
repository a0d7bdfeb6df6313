//! Server configuration.

use std::time::Duration;

/// Environment variable enabling the legacy child-resend behavior.
///
/// When a parent resource is updated, its children must be resent even when
/// their hashes did not change, because Envoy drops child data on parent
/// replacement. The legacy mode skips scrubbing children from in-flight
/// pending updates, which leaves a window where a late ACK re-records a
/// version Envoy no longer holds. The escape hatch remains for users who
/// depended on the old behavior; it is slated for removal.
pub const LEGACY_CHILD_RESEND_ENV: &str = "LEGACY_CHILD_RESEND";

/// Configuration for the delta xDS server.
///
/// Built once at server construction; streams receive an immutable copy, so
/// environment toggles are never consulted at operation time.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// How often a quiet stream re-checks its ACLs.
    pub auth_check_period: Duration,
    /// Buffer size of the per-stream response channel.
    pub response_buffer_size: usize,
    /// Buffer size of the per-stream inbound request channel.
    pub request_buffer_size: usize,
    /// Legacy child-resend behavior (see [`LEGACY_CHILD_RESEND_ENV`]).
    pub legacy_child_resend: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            auth_check_period: Duration::from_secs(5 * 60),
            response_buffer_size: 16,
            request_buffer_size: 16,
            legacy_child_resend: legacy_child_resend_from_env(),
        }
    }
}

/// Read the legacy child-resend toggle from the environment.
///
/// Any non-empty value enables it.
pub fn legacy_child_resend_from_env() -> bool {
    std::env::var(LEGACY_CHILD_RESEND_ENV)
        .map(|v| !v.is_empty())
        .unwrap_or(false)
}
