// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snowflake-style id generator used for echo ids.
//!
//! Layout (from MSB): 41-bit ms timestamp since [`EPOCH_MS`], 5-bit
//! datacenter id, 3-bit worker id, 12-bit sequence.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Fixed epoch, preserved from the reference generator. Do not change: ids
/// generated against different epochs are not comparable.
const EPOCH_MS: i64 = 1_064_980_800_000;

const WORKER_ID_BITS: u32 = 3;
const DATACENTER_ID_BITS: u32 = 5;
const SEQUENCE_BITS: u32 = 12;

const MAX_WORKER_ID: u64 = (1 << WORKER_ID_BITS) - 1;
const MAX_DATACENTER_ID: u64 = (1 << DATACENTER_ID_BITS) - 1;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;

const WORKER_ID_SHIFT: u32 = SEQUENCE_BITS;
const DATACENTER_ID_SHIFT: u32 = SEQUENCE_BITS + WORKER_ID_BITS;
const TIMESTAMP_SHIFT: u32 = SEQUENCE_BITS + WORKER_ID_BITS + DATACENTER_ID_BITS;

struct State {
    last_timestamp: i64,
    sequence: u64,
}

/// A single-process snowflake generator.
///
/// The critical section is a handful of integer operations guarded by a
/// plain [`Mutex`]; it is never held across an await point.
pub struct Snowflake {
    worker_id: u64,
    datacenter_id: u64,
    state: Mutex<State>,
}

impl Snowflake {
    pub fn new(worker_id: u64, datacenter_id: u64) -> Self {
        assert!(worker_id <= MAX_WORKER_ID, "worker_id out of range");
        assert!(datacenter_id <= MAX_DATACENTER_ID, "datacenter_id out of range");
        Self {
            worker_id,
            datacenter_id,
            state: Mutex::new(State { last_timestamp: -1, sequence: 0 }),
        }
    }

    /// Generate the next id, as a decimal string (echo ids are transmitted as strings).
    pub fn next_id(&self) -> String {
        self.next_id_u64().to_string()
    }

    fn next_id_u64(&self) -> u64 {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut now = current_millis();

        if now < state.last_timestamp {
            // Clock moved backwards; reject the skew by pinning to the last
            // observed timestamp rather than emitting a non-monotonic id.
            now = state.last_timestamp;
        }

        if now == state.last_timestamp {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                now = wait_next_millis(state.last_timestamp);
            }
        } else {
            state.sequence = 0;
        }

        state.last_timestamp = now;

        (((now - EPOCH_MS) as u64) << TIMESTAMP_SHIFT)
            | (self.datacenter_id << DATACENTER_ID_SHIFT)
            | (self.worker_id << WORKER_ID_SHIFT)
            | state.sequence
    }
}

fn current_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn wait_next_millis(last: i64) -> i64 {
    let mut now = current_millis();
    while now <= last {
        std::thread::yield_now();
        now = current_millis();
    }
    now
}
