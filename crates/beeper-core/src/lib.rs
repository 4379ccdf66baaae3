//! Platform-agnostic buzzer tone sequencing.
//!
//! Callers enqueue [`ToneRequest`] values through a [`Beeper`]; a dedicated
//! worker thread drains the bounded queue and drives a PWM backend one tone
//! at a time with drift-free pacing. Hardware backends plug in through the
//! [`TonePwm`], [`Pacer`] and [`Watchdog`] seams.

pub mod beeper;
pub mod consts;
pub mod player;
pub mod pwm;
pub mod queue;
pub mod request;

pub use beeper::Beeper;
pub use player::{MonotonicPacer, Pacer};
pub use pwm::{NoopWatchdog, TonePwm, Watchdog};
pub use queue::ToneQueue;
pub use request::ToneRequest;
