mod beep_driver;
mod peripherals;
mod rtos;

use beeper_core::{Beeper, ToneRequest};
use esp_idf_hal::delay::FreeRtos;
use peripherals::SystemPeripherals;

fn main() {
    // It is necessary to call this function once. Otherwise, some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!("Beeper ESP32 starting...");

    let peripherals = SystemPeripherals::take();

    let mut beeper = Beeper::new();
    beeper.create(|queue| beep_driver::spawn_worker(peripherals.beep, queue));

    // Startup chime: three short beeps
    if !beeper.send(ToneRequest::new(1000, 0, 100, 3, 2048)) {
        log::warn!("startup beep rejected");
    }

    loop {
        FreeRtos::delay_ms(10_000);

        // Periodic two-tone demo
        if !beeper.send(ToneRequest::new(880, 660, 150, 2, 2048)) {
            log::warn!("demo tone rejected");
        }
    }
}
