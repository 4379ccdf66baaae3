use crate::consts::{DEFAULT_DUTY, DUTY_MAX};

/// A single tone sequence, copied by value into the queue.
///
/// Each of the `count` cycles plays `frequency1` for `duration_ms`, then
/// either `frequency2` (if nonzero) or silence for another `duration_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToneRequest {
    /// Primary tone frequency in Hz. Must be nonzero.
    pub frequency1: u32,
    /// Secondary frequency in Hz, or 0 for silence in the second half-cycle.
    pub frequency2: u32,
    /// Length of each half-cycle in milliseconds. Must be nonzero.
    pub duration_ms: u32,
    /// Number of repeat cycles, 1-255.
    pub count: u8,
    /// Output intensity, 1-4096. Full scale is a 50% square wave.
    pub duty: u16,
}

impl ToneRequest {
    /// Extended variant: two frequencies and an explicit duty.
    pub fn new(frequency1: u32, frequency2: u32, duration_ms: u32, count: u8, duty: u16) -> Self {
        Self {
            frequency1,
            frequency2,
            duration_ms,
            count,
            duty,
        }
    }

    /// Basic variant: a single frequency with silent gaps at default duty.
    pub fn beep(frequency: u32, duration_ms: u32, count: u8) -> Self {
        Self::new(frequency, 0, duration_ms, count, DEFAULT_DUTY)
    }

    /// Check all required fields.
    ///
    /// Enforced at submission time so the worker never sees a malformed
    /// request.
    pub fn is_valid(&self) -> bool {
        self.frequency1 > 0
            && self.duration_ms > 0
            && self.count > 0
            && self.duty > 0
            && self.duty <= DUTY_MAX
    }
}
