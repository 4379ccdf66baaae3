//! LEDC-backed playback worker.
//!
//! The worker thread exclusively owns the LEDC timer and channel drivers;
//! they are constructed inside the thread after spawn so the peripherals
//! move with it. The thread is pinned to one core at a fixed priority and
//! lives until the tone queue is closed.

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use beeper_core::consts::DUTY_MAX;
use beeper_core::player;
use beeper_core::pwm::TonePwm;
use beeper_core::queue::ToneQueue;
use esp_idf_hal::cpu::Core;
use esp_idf_hal::gpio::OutputPin;
use esp_idf_hal::ledc::{
    config::TimerConfig, LedcChannel, LedcDriver, LedcTimer, LedcTimerDriver, LowSpeed, Resolution,
};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::prelude::*;
use esp_idf_hal::task::thread::ThreadSpawnConfiguration;

use crate::peripherals::BeepPeripherals;
use crate::rtos::{RtosPacer, TaskWatchdog};

const WORKER_STACK_SIZE: usize = 4096;
const WORKER_PRIORITY: u8 = 3;
const WORKER_CORE: Core = Core::Core0;

/// Base timer setup; the frequency is retuned for every tone.
const BASE_FREQ_HZ: u32 = 3000;

/// Spawn the playback worker pinned to [`WORKER_CORE`] at a fixed priority.
pub fn spawn_worker<T, C, P>(
    peripherals: BeepPeripherals<T, C, P>,
    queue: Arc<ToneQueue>,
) -> io::Result<JoinHandle<()>>
where
    T: LedcTimer<SpeedMode = LowSpeed> + Send + 'static,
    T: Peripheral<P = T>,
    C: LedcChannel<SpeedMode = LowSpeed> + Send + 'static,
    C: Peripheral<P = C>,
    P: OutputPin + Send + 'static,
{
    ThreadSpawnConfiguration {
        name: Some(b"beep-worker\0"),
        stack_size: WORKER_STACK_SIZE,
        priority: WORKER_PRIORITY,
        pin_to_core: Some(WORKER_CORE),
        ..Default::default()
    }
    .set()
    .map_err(io::Error::other)?;

    let handle = std::thread::Builder::new()
        .name("beep-worker".to_string())
        .spawn(move || beep_worker_thread(peripherals, queue))?;

    // Restore spawn defaults for threads created later
    ThreadSpawnConfiguration::default()
        .set()
        .map_err(io::Error::other)?;

    Ok(handle)
}

fn beep_worker_thread<T, C, P>(peripherals: BeepPeripherals<T, C, P>, queue: Arc<ToneQueue>)
where
    T: LedcTimer<SpeedMode = LowSpeed>,
    T: Peripheral<P = T>,
    C: LedcChannel<SpeedMode = LowSpeed>,
    C: Peripheral<P = C>,
    P: OutputPin,
{
    log::info!("beep worker started");

    let timer = match LedcTimerDriver::new(
        peripherals.timer,
        &TimerConfig::new()
            .frequency(BASE_FREQ_HZ.Hz().into())
            .resolution(Resolution::Bits13),
    ) {
        Ok(timer) => timer,
        Err(err) => {
            log::error!("beep timer init failed: {err}");
            return;
        }
    };

    let mut channel = match LedcDriver::new(peripherals.channel, &timer, peripherals.pin) {
        Ok(channel) => channel,
        Err(err) => {
            log::error!("beep channel init failed: {err}");
            return;
        }
    };

    // Start silent
    if let Err(err) = channel.set_duty(0) {
        log::warn!("ledc set_duty(0) failed: {err}");
    }

    let pwm = LedcTonePwm::new(timer, channel);
    player::run(&queue, pwm, RtosPacer::new(), TaskWatchdog);

    log::info!("beep worker stopped");
}

/// [`TonePwm`] over an LEDC timer/channel pair.
pub struct LedcTonePwm<'d, T>
where
    T: LedcTimer<SpeedMode = LowSpeed>,
{
    timer: LedcTimerDriver<'d, T>,
    channel: LedcDriver<'d>,
    max_duty: u32,
}

impl<'d, T> LedcTonePwm<'d, T>
where
    T: LedcTimer<SpeedMode = LowSpeed>,
{
    pub fn new(timer: LedcTimerDriver<'d, T>, channel: LedcDriver<'d>) -> Self {
        let max_duty = channel.get_max_duty();
        Self {
            timer,
            channel,
            max_duty,
        }
    }
}

impl<T> TonePwm for LedcTonePwm<'_, T>
where
    T: LedcTimer<SpeedMode = LowSpeed>,
{
    fn set_tone(&mut self, frequency_hz: u32, duty: u16) {
        if let Err(err) = self.timer.set_frequency(Hertz(frequency_hz)) {
            log::warn!("ledc set_frequency({frequency_hz}) failed: {err}");
        }
        // duty is 1-4096 full scale; cap the output at a 50% square wave
        let ticks = u32::from(duty.min(DUTY_MAX)) * self.max_duty / (2 * u32::from(DUTY_MAX));
        if let Err(err) = self.channel.set_duty(ticks) {
            log::warn!("ledc set_duty({ticks}) failed: {err}");
        }
    }

    fn silence(&mut self) {
        if let Err(err) = self.channel.set_duty(0) {
            log::warn!("ledc set_duty(0) failed: {err}");
        }
    }
}
