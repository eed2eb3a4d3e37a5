use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Classification of one target position against the typed prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharState {
    Correct,
    Incorrect,
    Pending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    NotStarted,
    Running,
    Finished,
}

/// Edit kind reported by the input layer for one event. Paste is carried as
/// its own kind so the session can refuse bulk input outright.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Insertion,
    Deletion,
    Other,
    Paste,
}

/// Discrete side effects of one input event, consumed by the feedback layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Hit,
    Mistake,
    Completed,
    Rejected,
}

/// One recorded input event: millisecond offset from session start and the
/// cursor position after the event. The full sequence reconstructs typing
/// cadence for ghost replay, so every input is logged, not only insertions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keystroke {
    #[serde(rename = "t")]
    pub offset_ms: u64,
    #[serde(rename = "i")]
    pub cursor: usize,
}

/// State machine for one typing attempt against a fixed target passage.
///
/// Transitions are NotStarted -> Running (first input) -> Finished (every
/// position typed correctly, or the countdown expires). A finished session
/// is discarded; reset means building a new one.
#[derive(Debug)]
pub struct TypingSession {
    target: Vec<char>,
    typed: Vec<char>,
    classes: Vec<CharState>,
    mistakes: u32,
    keystrokes: Vec<Keystroke>,
    started_at: Option<Instant>,
    status: Status,
}

impl TypingSession {
    /// The passage must be non-empty; an empty target would complete
    /// vacuously on the first event. The passage source guarantees this.
    pub fn new(target: String) -> Self {
        debug_assert!(!target.is_empty());
        let target: Vec<char> = target.chars().collect();
        let classes = vec![CharState::Pending; target.len()];
        Self {
            target,
            typed: Vec::new(),
            classes,
            mistakes: 0,
            keystrokes: Vec::new(),
            started_at: None,
            status: Status::NotStarted,
        }
    }

    /// Feed the full current input value after one edit.
    ///
    /// The first accepted call starts the session. Each accepted call logs a
    /// keystroke, updates the mistake tally for newly inserted characters,
    /// reclassifies every position (a backspace can retroactively change any
    /// prior position), and detects completion. Calls after Finished and
    /// paste input leave the session untouched.
    pub fn submit_input(&mut self, value: &str, kind: InputKind) -> Vec<SessionEvent> {
        if self.status == Status::Finished {
            return vec![];
        }
        if kind == InputKind::Paste {
            return vec![SessionEvent::Rejected];
        }

        if self.status == Status::NotStarted {
            self.status = Status::Running;
            self.started_at = Some(Instant::now());
        }

        let raw_len = value.chars().count();
        let mut new_typed: Vec<char> = value.chars().collect();
        new_typed.truncate(self.target.len());

        self.keystrokes.push(Keystroke {
            offset_ms: self.elapsed_ms(),
            cursor: new_typed.len(),
        });

        let mut events = Vec::new();

        // Only a newly inserted character inside the target counts toward
        // the tally; deletions and out-of-bounds positions change nothing.
        // The count is cumulative; a later correction never decrements it.
        if kind == InputKind::Insertion && raw_len > 0 && raw_len <= self.target.len() {
            let idx = raw_len - 1;
            if new_typed[idx] == self.target[idx] {
                events.push(SessionEvent::Hit);
            } else {
                self.mistakes += 1;
                events.push(SessionEvent::Mistake);
            }
        }

        self.typed = new_typed;
        self.reclassify();

        // The passage is complete once every position is typed correctly; a
        // full-length prefix with a trailing error stays open until fixed.
        if self.typed.len() == self.target.len()
            && self.classes.iter().all(|&c| c == CharState::Correct)
        {
            self.status = Status::Finished;
            events.push(SessionEvent::Completed);
        }

        events
    }

    /// End the session from outside, on countdown expiry. Only meaningful
    /// while running; the prefix stays wherever the typist got to.
    pub fn force_finish(&mut self) {
        if self.status == Status::Running {
            self.status = Status::Finished;
        }
    }

    // Full recompute on purpose: corrections can flip any earlier position,
    // so an incremental diff would have to track the same information anyway.
    fn reclassify(&mut self) {
        for (idx, &expected) in self.target.iter().enumerate() {
            self.classes[idx] = match self.typed.get(idx) {
                Some(&c) if c == expected => CharState::Correct,
                Some(_) => CharState::Incorrect,
                None => CharState::Pending,
            };
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.started_at
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn char_states(&self) -> &[CharState] {
        &self.classes
    }

    pub fn target(&self) -> &[char] {
        &self.target
    }

    pub fn typed(&self) -> &[char] {
        &self.typed
    }

    pub fn typed_len(&self) -> usize {
        self.typed.len()
    }

    pub fn target_len(&self) -> usize {
        self.target.len()
    }

    pub fn typed_value(&self) -> String {
        self.typed.iter().collect()
    }

    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    pub fn correct_chars(&self) -> usize {
        self.classes
            .iter()
            .filter(|&&c| c == CharState::Correct)
            .count()
    }

    pub fn keystrokes(&self) -> &[Keystroke] {
        &self.keystrokes
    }

    pub fn has_started(&self) -> bool {
        self.status != Status::NotStarted
    }

    pub fn has_finished(&self) -> bool {
        self.status == Status::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_new_session_is_all_pending() {
        let session = TypingSession::new("cat".to_string());

        assert_eq!(session.status(), Status::NotStarted);
        assert_eq!(session.char_states(), &[CharState::Pending; 3]);
        assert_eq!(session.mistakes(), 0);
        assert_eq!(session.typed_len(), 0);
        assert!(session.keystrokes().is_empty());
    }

    #[test]
    fn test_first_input_starts_session() {
        let mut session = TypingSession::new("cat".to_string());

        let events = session.submit_input("c", InputKind::Insertion);

        assert_eq!(session.status(), Status::Running);
        assert_matches!(events[..], [SessionEvent::Hit]);
        assert_eq!(session.keystrokes().len(), 1);
        assert_eq!(session.keystrokes()[0].cursor, 1);
    }

    #[test]
    fn test_type_mistype_backspace_scenario() {
        // target "cat", inputs: "c", "ca", "cax", "ca"
        let mut session = TypingSession::new("cat".to_string());

        session.submit_input("c", InputKind::Insertion);
        session.submit_input("ca", InputKind::Insertion);
        let events = session.submit_input("cax", InputKind::Insertion);
        assert_matches!(events[..], [SessionEvent::Mistake]);

        session.submit_input("ca", InputKind::Deletion);

        assert_eq!(
            session.char_states(),
            &[CharState::Correct, CharState::Correct, CharState::Pending]
        );
        assert_eq!(session.mistakes(), 1);
        assert_eq!(session.status(), Status::Running);
        // every event was logged, deletions included
        assert_eq!(session.keystrokes().len(), 4);
    }

    #[test]
    fn test_mistakes_are_cumulative() {
        let mut session = TypingSession::new("ab".to_string());

        session.submit_input("x", InputKind::Insertion);
        assert_eq!(session.mistakes(), 1);

        // correcting the position does not take the mistake back
        session.submit_input("", InputKind::Deletion);
        session.submit_input("a", InputKind::Insertion);
        assert_eq!(session.mistakes(), 1);

        session.submit_input("ay", InputKind::Insertion);
        assert_eq!(session.mistakes(), 2);
    }

    #[test]
    fn test_deletion_never_counts_a_mistake() {
        let mut session = TypingSession::new("hi".to_string());

        session.submit_input("x", InputKind::Insertion);
        let events = session.submit_input("", InputKind::Deletion);

        assert!(events.is_empty());
        assert_eq!(session.mistakes(), 1);
        assert_eq!(session.char_states(), &[CharState::Pending; 2]);
    }

    #[test]
    fn test_completion_fires_exactly_once() {
        let mut session = TypingSession::new("hi".to_string());

        session.submit_input("h", InputKind::Insertion);
        let events = session.submit_input("hi", InputKind::Insertion);

        assert_matches!(events[..], [SessionEvent::Hit, SessionEvent::Completed]);
        assert_eq!(session.status(), Status::Finished);

        // a finished session ignores further input entirely
        let events = session.submit_input("hix", InputKind::Insertion);
        assert!(events.is_empty());
        assert_eq!(session.typed_len(), 2);
        assert_eq!(session.keystrokes().len(), 2);
    }

    #[test]
    fn test_wrong_final_char_keeps_session_open() {
        let mut session = TypingSession::new("ab".to_string());

        session.submit_input("a", InputKind::Insertion);
        let events = session.submit_input("ax", InputKind::Insertion);

        assert_matches!(events[..], [SessionEvent::Mistake]);
        assert_eq!(session.status(), Status::Running);
        assert_eq!(
            session.char_states(),
            &[CharState::Correct, CharState::Incorrect]
        );

        // fixing the trailing error completes the passage
        session.submit_input("a", InputKind::Deletion);
        let events = session.submit_input("ab", InputKind::Insertion);
        assert_matches!(events[..], [SessionEvent::Hit, SessionEvent::Completed]);
        assert_eq!(session.status(), Status::Finished);
    }

    #[test]
    fn test_prefix_never_exceeds_target() {
        let mut session = TypingSession::new("hi".to_string());

        session.submit_input("hijklm", InputKind::Insertion);

        assert!(session.typed_len() <= session.target_len());
        assert_eq!(session.typed_len(), 2);
        assert_eq!(session.status(), Status::Finished);
    }

    #[test]
    fn test_out_of_bounds_insertion_makes_no_mistake() {
        let mut session = TypingSession::new("hi".to_string());
        session.submit_input("h", InputKind::Insertion);

        // insertion position past the target never reaches the tally
        let before = session.mistakes();
        session.submit_input("hixyz", InputKind::Insertion);
        assert_eq!(session.mistakes(), before);
    }

    #[test]
    fn test_other_edits_update_without_scoring() {
        // e.g. a selection replace reported by the input layer
        let mut session = TypingSession::new("cat".to_string());

        let events = session.submit_input("ca", InputKind::Other);

        assert!(events.is_empty());
        assert_eq!(session.typed_len(), 2);
        assert_eq!(session.mistakes(), 0);
        assert_eq!(session.keystrokes().len(), 1);
    }

    #[test]
    fn test_paste_is_rejected_without_state_change() {
        let mut session = TypingSession::new("cat".to_string());
        session.submit_input("c", InputKind::Insertion);

        let events = session.submit_input("cat", InputKind::Paste);

        assert_matches!(events[..], [SessionEvent::Rejected]);
        assert_eq!(session.typed_len(), 1);
        assert_eq!(session.keystrokes().len(), 1);
        assert_eq!(session.status(), Status::Running);
    }

    #[test]
    fn test_force_finish_only_while_running() {
        let mut session = TypingSession::new("cat".to_string());

        // not started yet: nothing to end
        session.force_finish();
        assert_eq!(session.status(), Status::NotStarted);

        session.submit_input("ca", InputKind::Insertion);
        session.force_finish();
        assert_eq!(session.status(), Status::Finished);
        assert_eq!(session.typed_len(), 2);
    }

    #[test]
    fn test_correct_chars_tracks_live_prefix() {
        let mut session = TypingSession::new("cat".to_string());

        session.submit_input("cx", InputKind::Insertion);
        assert_eq!(session.correct_chars(), 1);

        session.submit_input("c", InputKind::Deletion);
        session.submit_input("ca", InputKind::Insertion);
        assert_eq!(session.correct_chars(), 2);
    }

    #[test]
    fn test_keystroke_offsets_monotone() {
        let mut session = TypingSession::new("cat".to_string());

        session.submit_input("c", InputKind::Insertion);
        session.submit_input("ca", InputKind::Insertion);
        session.submit_input("cat", InputKind::Insertion);

        let offsets: Vec<u64> = session.keystrokes().iter().map(|k| k.offset_ms).collect();
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        assert_eq!(offsets, sorted);
    }
}
