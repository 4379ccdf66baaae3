//! FreeRTOS timing and liveness glue for the playback worker.

use beeper_core::player::Pacer;
use beeper_core::pwm::Watchdog;
use esp_idf_svc::sys::{
    configTICK_RATE_HZ, esp_task_wdt_reset, xTaskDelayUntil, xTaskGetTickCount, TickType_t,
};

/// Absolute-deadline pacer over the FreeRTOS tick clock.
///
/// `xTaskDelayUntil` advances the stored wake time by a fixed increment, so
/// PWM reconfiguration overhead inside a phase never shifts later
/// deadlines.
pub struct RtosPacer {
    last_wake: TickType_t,
}

impl RtosPacer {
    pub fn new() -> Self {
        Self {
            last_wake: unsafe { xTaskGetTickCount() },
        }
    }
}

impl Default for RtosPacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Pacer for RtosPacer {
    fn rearm(&mut self) {
        self.last_wake = unsafe { xTaskGetTickCount() };
    }

    fn pace(&mut self, ms: u32) {
        // ms -> ticks; sub-tick phases still yield for at least one tick
        let ticks = ((ms * configTICK_RATE_HZ) / 1000).max(1);
        unsafe {
            xTaskDelayUntil(&mut self.last_wake as *mut _, ticks);
        }
    }
}

/// Feeds the task watchdog between PWM phases.
pub struct TaskWatchdog;

impl Watchdog for TaskWatchdog {
    fn feed(&mut self) {
        unsafe {
            esp_task_wdt_reset();
        }
    }
}
