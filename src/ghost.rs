//! Ghost replay of the best run's keystroke timeline.

use crate::runtime::AppEvent;
use crate::session::Keystroke;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Granularity of the replay thread's cancellation checks.
const POLL_SLICE: Duration = Duration::from_millis(25);

/// Replays a recorded keystroke timeline alongside a live session.
///
/// One handle owns the whole batch of scheduled updates: cancelling (or
/// dropping) it stops every update that has not fired yet. Emitted events
/// carry the epoch of the session that started the replay; the app loop
/// discards events whose epoch no longer matches, so nothing recorded here
/// can touch a later session.
#[derive(Debug)]
pub struct GhostPlayer {
    cancelled: Arc<AtomicBool>,
}

impl GhostPlayer {
    pub fn start(keystrokes: Vec<Keystroke>, epoch: u64, tx: Sender<AppEvent>) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();

        thread::spawn(move || {
            let start = Instant::now();
            for stroke in keystrokes {
                let deadline = Duration::from_millis(stroke.offset_ms);
                loop {
                    if flag.load(Ordering::Relaxed) {
                        return;
                    }
                    let elapsed = start.elapsed();
                    if elapsed >= deadline {
                        break;
                    }
                    thread::sleep(POLL_SLICE.min(deadline - elapsed));
                }
                if flag.load(Ordering::Relaxed) {
                    return;
                }
                let evt = AppEvent::Ghost {
                    epoch,
                    cursor: stroke.cursor,
                };
                if tx.send(evt).is_err() {
                    return;
                }
            }
        });

        Self { cancelled }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

impl Drop for GhostPlayer {
    fn drop(&mut self) {
        self.cancel();
    }
}
