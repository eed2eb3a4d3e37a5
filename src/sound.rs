//! Terminal-bell feedback for session events.
//!
//! Audio synthesis is outside the core; the session emits discrete events
//! and this maps them to the bell. Hits stay silent; a beep per correct
//! keystroke makes the trainer unusable in a real terminal.

use crate::session::SessionEvent;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy)]
pub struct SoundPlayer {
    enabled: bool,
}

const BELL: &[u8] = b"\x07";

impl SoundPlayer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn play(&self, event: SessionEvent) {
        let _ = self.write_to(&mut io::stdout(), event);
    }

    fn write_to<W: Write>(&self, out: &mut W, event: SessionEvent) -> io::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        match event {
            SessionEvent::Mistake | SessionEvent::Completed | SessionEvent::Rejected => {
                out.write_all(BELL)?;
                out.flush()
            }
            SessionEvent::Hit => Ok(()),
        }
    }
}
