use esp_idf_hal::gpio::Gpio25;
use esp_idf_hal::ledc::{CHANNEL0, TIMER0};
use esp_idf_hal::peripherals::Peripherals;

/// LEDC resources dedicated to the buzzer.
///
/// Timer, channel and pin are fixed for the lifetime of the worker once it
/// has been created.
pub struct BeepPeripherals<T, C, P> {
    pub timer: T,
    pub channel: C,
    pub pin: P,
}

pub struct SystemPeripherals {
    pub beep: BeepPeripherals<TIMER0, CHANNEL0, Gpio25>,
}

impl SystemPeripherals {
    pub fn take() -> Self {
        let peripherals = Peripherals::take().unwrap();

        SystemPeripherals {
            beep: BeepPeripherals {
                timer: peripherals.ledc.timer0,
                channel: peripherals.ledc.channel0,
                pin: peripherals.pins.gpio25,
            },
        }
    }
}
