mod buzzer;

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use beeper_core::{player, Beeper, MonotonicPacer, NoopWatchdog, ToneQueue, ToneRequest};
use buzzer::RodioTonePwm;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut beeper = Beeper::new();
    beeper.create(spawn_worker);
    if !beeper.is_created() {
        anyhow::bail!("audio worker failed to start");
    }

    log::info!("three short beeps");
    if !beeper.send(ToneRequest::beep(1000, 100, 3)) {
        log::warn!("beep rejected");
    }
    thread::sleep(Duration::from_millis(800));

    log::info!("two-tone siren");
    if !beeper.send(ToneRequest::new(880, 660, 250, 4, 4096)) {
        log::warn!("siren rejected");
    }
    thread::sleep(Duration::from_millis(2200));

    beeper.delete();
    Ok(())
}

fn spawn_worker(queue: Arc<ToneQueue>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("beep-worker".to_string())
        .spawn(move || {
            // The audio stream has to live on this thread
            let pwm = match RodioTonePwm::new() {
                Ok(pwm) => pwm,
                Err(err) => {
                    log::error!("failed to initialize audio output: {err}");
                    return;
                }
            };
            player::run(&queue, pwm, MonotonicPacer::new(), NoopWatchdog);
        })
}
