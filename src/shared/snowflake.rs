//! Snowflake ID Generator
//!
//! Twitter-style unique ID generation. IDs increase monotonically per
//! generator, which the repositories rely on to break `created_at` ties.

use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Custom epoch (2024-01-01T00:00:00.000Z)
pub const EPOCH: u64 = 1_704_067_200_000;

const SEQUENCE_MASK: u64 = 0xFFF;

#[derive(Debug, Default)]
struct GeneratorState {
    last_timestamp: u64,
    sequence: u64,
}

/// Snowflake ID generator
#[derive(Debug)]
pub struct SnowflakeGenerator {
    machine_id: u64,
    node_id: u64,
    state: Mutex<GeneratorState>,
}

impl SnowflakeGenerator {
    /// Create a new snowflake generator
    pub fn new(machine_id: u64, node_id: u64) -> Self {
        Self {
            machine_id: machine_id & 0x1F, // 5 bits
            node_id: node_id & 0x1F,       // 5 bits
            state: Mutex::new(GeneratorState::default()),
        }
    }

    /// Generate a new snowflake ID
    pub fn generate(&self) -> i64 {
        let mut state = self.state.lock();
        let mut timestamp = current_timestamp().max(state.last_timestamp);

        if timestamp == state.last_timestamp {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                // Sequence exhausted for this millisecond; borrow the next one.
                timestamp += 1;
            }
        } else {
            state.sequence = 0;
        }
        state.last_timestamp = timestamp;

        let id = ((timestamp - EPOCH) << 22)
            | (self.machine_id << 17)
            | (self.node_id << 12)
            | state.sequence;

        id as i64
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(EPOCH)
}

/// Parse a snowflake from its string form, naming the field on failure.
pub fn parse_id(field: &str, value: &str) -> Result<i64, crate::shared::error::AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| crate::shared::error::AppError::BadRequest(format!("Invalid {}", field)))
}
