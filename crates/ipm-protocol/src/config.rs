//! Runtime configuration threaded explicitly through the dialogues,
//! rather than read from a process-wide mutable flag.

use std::time::Duration;

use ipm_wire::frame::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT};

/// Timeouts for a send or receive dialogue.
#[derive(Clone, Copy, Debug)]
pub struct ProtocolConfig {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}
