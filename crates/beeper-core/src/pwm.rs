//! Hardware seams for the playback worker.

/// PWM tone output, owned exclusively by the playback worker.
pub trait TonePwm {
    /// Configure the output for `frequency_hz` at the given duty (1-4096).
    fn set_tone(&mut self, frequency_hz: u32, duty: u16);

    /// Force the output silent (duty 0).
    fn silence(&mut self);
}

/// Liveness signal fed at every phase boundary.
///
/// PWM reconfiguration is the only potentially slow operation inside the
/// worker's otherwise tight sleep loop.
pub trait Watchdog {
    fn feed(&mut self);
}

/// Watchdog for platforms without one.
pub struct NoopWatchdog;

impl Watchdog for NoopWatchdog {
    fn feed(&mut self) {}
}
