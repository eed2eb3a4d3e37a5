//! Event plumbing for the app loop.
//!
//! Keyboard input, the 1 Hz session ticker, and ghost replay all feed one
//! mpsc channel, so every state mutation happens on the receiving loop in
//! strict arrival order. The ticker and ghost threads hold cancellation
//! flags; cancelling is mandatory on every transition out of a running
//! session so no stale callback outlives it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Unified event type consumed by the app loop
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    /// Bracketed paste payload; the session rejects it.
    Paste(String),
    Resize,
    Tick,
    /// Ghost cursor advance, tagged with the session epoch that scheduled
    /// it so the loop can discard events from a discarded session.
    Ghost { epoch: u64, cursor: usize },
}

pub fn channel() -> (Sender<AppEvent>, Receiver<AppEvent>) {
    mpsc::channel()
}

/// Spawn the terminal reader thread feeding the shared channel.
pub fn spawn_input_source(tx: Sender<AppEvent>) {
    thread::spawn(move || loop {
        let evt = match event::read() {
            Ok(CtEvent::Key(key)) => Some(AppEvent::Key(key)),
            Ok(CtEvent::Paste(data)) => Some(AppEvent::Paste(data)),
            Ok(CtEvent::Resize(_, _)) => Some(AppEvent::Resize),
            Ok(_) => None,
            Err(_) => break,
        };
        if let Some(evt) = evt {
            if tx.send(evt).is_err() {
                break;
            }
        }
    });
}

/// Cancellable repeating ticker.
///
/// The flag is checked after every sleep, so once `cancel` returns no
/// further Tick can be sent. Dropping the handle cancels it.
#[derive(Debug)]
pub struct Ticker {
    cancelled: Arc<AtomicBool>,
}

impl Ticker {
    pub fn spawn(tx: Sender<AppEvent>, interval: Duration) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        thread::spawn(move || loop {
            thread::sleep(interval);
            if flag.load(Ordering::Relaxed) {
                break;
            }
            if tx.send(AppEvent::Tick).is_err() {
                break;
            }
        });
        Self { cancelled }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn ticker_emits_ticks() {
        let (tx, rx) = channel();
        let _ticker = Ticker::spawn(tx, Duration::from_millis(5));

        for _ in 0..3 {
            let evt = rx.recv_timeout(Duration::from_secs(1)).unwrap();
            assert!(matches!(evt, AppEvent::Tick));
        }
    }

    #[test]
    fn cancelled_ticker_goes_quiet() {
        let (tx, rx) = channel();
        let ticker = Ticker::spawn(tx, Duration::from_millis(5));

        rx.recv_timeout(Duration::from_secs(1)).unwrap();
        ticker.cancel();

        // drain anything sent before the cancel landed, then expect silence
        let deadline = Instant::now() + Duration::from_millis(50);
        while Instant::now() < deadline {
            let _ = rx.try_recv();
        }
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn dropping_ticker_cancels_it() {
        let (tx, rx) = channel();
        {
            let _ticker = Ticker::spawn(tx, Duration::from_millis(5));
            rx.recv_timeout(Duration::from_secs(1)).unwrap();
        }

        let deadline = Instant::now() + Duration::from_millis(50);
        while Instant::now() < deadline {
            let _ = rx.try_recv();
        }
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }
}
