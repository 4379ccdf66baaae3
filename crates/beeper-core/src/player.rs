//! Playback state machine with drift-free pacing.

use std::thread;
use std::time::{Duration, Instant};

use crate::pwm::{TonePwm, Watchdog};
use crate::queue::ToneQueue;
use crate::request::ToneRequest;

/// Absolute-deadline sleep primitive.
///
/// `pace` advances an internal deadline and sleeps until that instant, so
/// configuration overhead inside a phase never accumulates into timing
/// drift across a long sequence.
pub trait Pacer {
    /// Snapshot the wake reference. Called once per dequeued request.
    fn rearm(&mut self);

    /// Advance the deadline by `ms` and sleep until it.
    fn pace(&mut self, ms: u32);
}

/// [`Pacer`] over the std monotonic clock.
pub struct MonotonicPacer {
    deadline: Instant,
}

impl MonotonicPacer {
    pub fn new() -> Self {
        Self {
            deadline: Instant::now(),
        }
    }
}

impl Default for MonotonicPacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Pacer for MonotonicPacer {
    fn rearm(&mut self) {
        self.deadline = Instant::now();
    }

    fn pace(&mut self, ms: u32) {
        self.deadline += Duration::from_millis(u64::from(ms));
        if let Some(remaining) = self.deadline.checked_duration_since(Instant::now()) {
            thread::sleep(remaining);
        }
    }
}

/// Play one request to completion.
///
/// `count` cycles of tone1 then tone2-or-silence, each half-cycle
/// `duration_ms` long. The output is forced silent afterwards regardless of
/// what the last phase configured.
pub fn play_sequence(
    pwm: &mut impl TonePwm,
    pacer: &mut impl Pacer,
    watchdog: &mut impl Watchdog,
    request: &ToneRequest,
) {
    pacer.rearm();
    for _ in 0..request.count {
        watchdog.feed();
        pwm.set_tone(request.frequency1, request.duty);
        pacer.pace(request.duration_ms);

        watchdog.feed();
        if request.frequency2 > 0 {
            pwm.set_tone(request.frequency2, request.duty);
        } else {
            pwm.silence();
        }
        pacer.pace(request.duration_ms);
    }
    pwm.silence();
}

/// Worker loop: block on the queue and play each sequence to completion.
///
/// Sequences are not preemptable; a request submitted mid-sequence queues
/// behind the one playing. Returns once the queue is closed, leaving the
/// output silent.
pub fn run(
    queue: &ToneQueue,
    mut pwm: impl TonePwm,
    mut pacer: impl Pacer,
    mut watchdog: impl Watchdog,
) {
    while let Some(request) = queue.recv() {
        play_sequence(&mut pwm, &mut pacer, &mut watchdog, &request);
    }
    pwm.silence();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEFAULT_DUTY;
    use crate::pwm::NoopWatchdog;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MockPwm {
        events: Vec<(u32, u16)>,
    }

    impl TonePwm for MockPwm {
        fn set_tone(&mut self, frequency_hz: u32, duty: u16) {
            self.events.push((frequency_hz, duty));
        }

        fn silence(&mut self) {
            self.events.push((0, 0));
        }
    }

    #[derive(Default)]
    struct CountingPacer {
        rearms: u32,
        paced: Vec<u32>,
    }

    impl Pacer for CountingPacer {
        fn rearm(&mut self) {
            self.rearms += 1;
        }

        fn pace(&mut self, ms: u32) {
            self.paced.push(ms);
        }
    }

    struct FeedCounter(u32);

    impl Watchdog for FeedCounter {
        fn feed(&mut self) {
            self.0 += 1;
        }
    }

    #[test]
    fn single_tone_sequence_toggles_and_ends_silent() {
        let mut pwm = MockPwm::default();
        let mut pacer = CountingPacer::default();
        let request = ToneRequest::new(1000, 0, 100, 3, 2048);

        play_sequence(&mut pwm, &mut pacer, &mut NoopWatchdog, &request);

        assert_eq!(
            pwm.events,
            vec![
                (1000, 2048),
                (0, 0),
                (1000, 2048),
                (0, 0),
                (1000, 2048),
                (0, 0),
                (0, 0), // forced silence at end of sequence
            ]
        );
        assert_eq!(pacer.rearms, 1);
        assert_eq!(pacer.paced, vec![100; 6]);
    }

    #[test]
    fn two_tone_sequence_alternates_frequencies() {
        let mut pwm = MockPwm::default();
        let mut pacer = CountingPacer::default();
        let request = ToneRequest::new(880, 660, 150, 2, 4096);

        play_sequence(&mut pwm, &mut pacer, &mut NoopWatchdog, &request);

        assert_eq!(
            pwm.events,
            vec![(880, 4096), (660, 4096), (880, 4096), (660, 4096), (0, 0)]
        );
        assert_eq!(pacer.paced, vec![150; 4]);
    }

    #[test]
    fn phase_count_and_paced_time_scale_with_count() {
        let mut pwm = MockPwm::default();
        let mut pacer = CountingPacer::default();
        let request = ToneRequest::new(2000, 0, 25, 10, 1);

        play_sequence(&mut pwm, &mut pacer, &mut NoopWatchdog, &request);

        // 2N phase transitions, total paced time 2 * N * duration
        assert_eq!(pacer.paced.len(), 20);
        assert_eq!(pacer.paced.iter().sum::<u32>(), 500);
        assert_eq!(pwm.events.len(), 21);
    }

    #[test]
    fn watchdog_fed_at_every_phase_boundary() {
        let mut pwm = MockPwm::default();
        let mut pacer = CountingPacer::default();
        let mut watchdog = FeedCounter(0);
        let request = ToneRequest::new(1000, 0, 10, 3, 2048);

        play_sequence(&mut pwm, &mut pacer, &mut watchdog, &request);

        assert_eq!(watchdog.0, 6);
    }

    #[test]
    fn monotonic_pacer_holds_absolute_deadlines() {
        let mut pacer = MonotonicPacer::new();
        let start = Instant::now();
        pacer.rearm();
        for _ in 0..20 {
            pacer.pace(2);
        }
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(40), "woke early: {elapsed:?}");
        assert!(elapsed < Duration::from_millis(400), "stalled: {elapsed:?}");
    }

    #[test]
    fn monotonic_pacer_skips_sleep_past_deadline() {
        let mut pacer = MonotonicPacer::new();
        pacer.rearm();
        thread::sleep(Duration::from_millis(20));

        let start = Instant::now();
        pacer.pace(5); // deadline is already 15 ms behind
        assert!(start.elapsed() < Duration::from_millis(15));
    }

    struct SharedPwm(Arc<Mutex<Vec<(u32, u16)>>>);

    impl TonePwm for SharedPwm {
        fn set_tone(&mut self, frequency_hz: u32, duty: u16) {
            self.0.lock().unwrap().push((frequency_hz, duty));
        }

        fn silence(&mut self) {
            self.0.lock().unwrap().push((0, 0));
        }
    }

    #[test]
    fn run_drains_queue_until_closed() {
        let queue = Arc::new(ToneQueue::new());
        let events = Arc::new(Mutex::new(Vec::new()));

        let worker = {
            let queue = Arc::clone(&queue);
            let events = Arc::clone(&events);
            thread::spawn(move || {
                run(
                    &queue,
                    SharedPwm(events),
                    CountingPacer::default(),
                    NoopWatchdog,
                )
            })
        };

        assert!(queue.try_send(ToneRequest::beep(440, 10, 2), Duration::from_millis(10)));

        let deadline = Instant::now() + Duration::from_secs(1);
        while events.lock().unwrap().len() < 5 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }

        queue.close();
        worker.join().unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                (440, DEFAULT_DUTY),
                (0, 0),
                (440, DEFAULT_DUTY),
                (0, 0),
                (0, 0), // end of sequence
                (0, 0), // worker exit
            ]
        );
    }
}
