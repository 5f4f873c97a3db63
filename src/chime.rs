//! Once-per-second tick cue on a background thread.
//!
//! Fully independent of rendering: the thread owns the audio output, shares
//! nothing with the surface, and communicates only through a cooperative
//! cancellation flag it checks every poll interval.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rodio::source::{SineWave, Source};
use rodio::{OutputStream, Sink};

const TICK_HZ: f32 = 1318.5;
const TICK_LENGTH: Duration = Duration::from_millis(30);
const POLL: Duration = Duration::from_millis(50);

pub struct Chime {
    cancel: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Chime {
    /// Start the chime thread. Audio output failure is logged, not fatal:
    /// the overlay renders fine without sound.
    pub fn start() -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();

        let handle = thread::Builder::new()
            .name("chime".to_string())
            .spawn(move || {
                let (stream, stream_handle) = match OutputStream::try_default() {
                    Ok(out) => out,
                    Err(e) => {
                        log::warn!("no audio output, chime disabled: {e}");
                        return;
                    },
                };
                // Keep the stream alive for the thread's lifetime
                let _stream = stream;

                let mut polls_until_tick = 0u32;
                while !flag.load(Ordering::Relaxed) {
                    if polls_until_tick == 0 {
                        match Sink::try_new(&stream_handle) {
                            Ok(sink) => {
                                let tick = SineWave::new(TICK_HZ)
                                    .take_duration(TICK_LENGTH)
                                    .amplify(0.2);
                                sink.append(tick);
                                sink.detach();
                            },
                            Err(e) => log::warn!("chime tick skipped: {e}"),
                        }
                        polls_until_tick = (1000 / POLL.as_millis()) as u32;
                    }
                    polls_until_tick -= 1;
                    thread::sleep(POLL);
                }
            })
            .ok();

        if handle.is_none() {
            log::warn!("could not spawn chime thread");
        }

        Self {
            cancel,
            thread: handle,
        }
    }

    /// Ask the thread to stop and wait for it
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Chime {
    fn drop(&mut self) {
        self.shutdown();
    }
}
