//! Compile-time configuration shared by all backends.

/// Maximum number of pending tone requests.
pub const QUEUE_CAPACITY: usize = 3;

/// How long a submission waits for a free queue slot before giving up, in
/// milliseconds.
pub const SUBMIT_WAIT_MS: u64 = 10;

/// Full-scale duty value. Maps to a 50% square wave on the PWM output.
pub const DUTY_MAX: u16 = 4096;

/// Duty used by the basic beep constructor.
pub const DEFAULT_DUTY: u16 = DUTY_MAX / 2;
