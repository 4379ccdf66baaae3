//! Square-wave tone output through the host audio device.

use std::time::Duration;

use beeper_core::consts::DUTY_MAX;
use beeper_core::pwm::TonePwm;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

const SAMPLE_RATE: u32 = 48000; // Standard audio sample rate

/// Peak amplitude at full-scale duty; keeps the square wave comfortable
/// on headphones.
const FULL_SCALE_AMPLITUDE: f32 = 0.15;

// Endless square wave generator
struct SquareWave {
    frequency: f32,
    amplitude: f32,
    sample_rate: u32,
    current_sample: usize,
}

impl SquareWave {
    fn new(frequency: f32, amplitude: f32, sample_rate: u32) -> Self {
        Self {
            frequency,
            amplitude,
            sample_rate,
            current_sample: 0,
        }
    }
}

impl Iterator for SquareWave {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let sample_position = self.current_sample as f32 / self.sample_rate as f32;
        let cycle_position = (sample_position * self.frequency) % 1.0;

        self.current_sample = self.current_sample.wrapping_add(1);

        // Square wave: high for first half of cycle, low for second half
        if cycle_position < 0.5 {
            Some(self.amplitude)
        } else {
            Some(-self.amplitude)
        }
    }
}

impl Source for SquareWave {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

/// [`TonePwm`] backend that plays square waves through rodio.
///
/// Must be created on the worker thread; audio output streams are not
/// `Send`.
pub struct RodioTonePwm {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
}

impl RodioTonePwm {
    pub fn new() -> anyhow::Result<Self> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
            sink: None,
        })
    }
}

impl TonePwm for RodioTonePwm {
    fn set_tone(&mut self, frequency_hz: u32, duty: u16) {
        // Dropping the previous sink stops the old tone
        self.sink = None;

        let amplitude = FULL_SCALE_AMPLITUDE * f32::from(duty.min(DUTY_MAX)) / f32::from(DUTY_MAX);
        match Sink::try_new(&self.handle) {
            Ok(sink) => {
                sink.append(SquareWave::new(
                    frequency_hz as f32,
                    amplitude,
                    SAMPLE_RATE,
                ));
                self.sink = Some(sink);
            }
            Err(err) => log::error!("failed to open audio sink: {err}"),
        }
    }

    fn silence(&mut self) {
        self.sink = None;
    }
}
