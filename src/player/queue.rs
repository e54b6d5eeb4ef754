//! Autoplay queue over the message library.
//!
//! Keeps an ordered list of voice messages with a cursor. The player advances
//! the cursor when a message ends (autoplay) or when the user skips; the
//! cursor stops at the list edges rather than wrapping.

use crate::library::VoiceMessage;

/// Ordered playback queue with a current position.
#[derive(Debug)]
pub struct PlayQueue {
    messages: Vec<VoiceMessage>,
    current: usize,
}

impl PlayQueue {
    /// Creates a queue over the given messages, starting at `start_index`.
    ///
    /// An out-of-range start index is clamped to the last message.
    pub fn new(messages: Vec<VoiceMessage>, start_index: usize) -> Self {
        let current = if messages.is_empty() {
            0
        } else {
            start_index.min(messages.len() - 1)
        };
        Self { messages, current }
    }

    /// Returns the message at the cursor, if any.
    pub fn current(&self) -> Option<&VoiceMessage> {
        self.messages.get(self.current)
    }

    /// Advances to the next message and returns it, or `None` at the end.
    pub fn next(&mut self) -> Option<&VoiceMessage> {
        if self.current + 1 < self.messages.len() {
            self.current += 1;
            self.messages.get(self.current)
        } else {
            None
        }
    }

    /// Moves back to the previous message and returns it, or `None` at the start.
    pub fn prev(&mut self) -> Option<&VoiceMessage> {
        if self.current > 0 && !self.messages.is_empty() {
            self.current -= 1;
            self.messages.get(self.current)
        } else {
            None
        }
    }

    /// Returns `(cursor position, queue length)`, 1-based for display.
    pub fn position(&self) -> (usize, usize) {
        if self.messages.is_empty() {
            (0, 0)
        } else {
            (self.current + 1, self.messages.len())
        }
    }

    /// Returns whether the cursor is on the last message.
    pub fn at_end(&self) -> bool {
        self.messages.is_empty() || self.current + 1 == self.messages.len()
    }

    /// Marks the message at the cursor as listened in the in-memory copy.
    ///
    /// The database row is updated separately; this keeps the UI's unread
    /// marker in sync without a reload.
    pub fn mark_current_listened(&mut self) {
        if let Some(message) = self.messages.get_mut(self.current) {
            message.listened = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use std::path::PathBuf;

    fn message(id: i64) -> VoiceMessage {
        VoiceMessage {
            id,
            path: PathBuf::from(format!("/tmp/{id}.wav")),
            title: format!("msg {id}"),
            duration_secs: 1.0,
            waveform: Vec::new(),
            listened: false,
            created_at: Local::now(),
        }
    }

    #[test]
    fn test_cursor_moves_and_stops_at_edges() {
        let mut queue = PlayQueue::new(vec![message(1), message(2), message(3)], 0);
        assert_eq!(queue.current().unwrap().id, 1);

        assert_eq!(queue.next().unwrap().id, 2);
        assert_eq!(queue.next().unwrap().id, 3);
        assert!(queue.next().is_none());
        assert_eq!(queue.current().unwrap().id, 3);
        assert!(queue.at_end());

        assert_eq!(queue.prev().unwrap().id, 2);
        assert_eq!(queue.prev().unwrap().id, 1);
        assert!(queue.prev().is_none());
        assert_eq!(queue.current().unwrap().id, 1);
    }

    #[test]
    fn test_start_index_is_clamped() {
        let queue = PlayQueue::new(vec![message(1), message(2)], 99);
        assert_eq!(queue.current().unwrap().id, 2);
        assert_eq!(queue.position(), (2, 2));
    }

    #[test]
    fn test_empty_queue() {
        let mut queue = PlayQueue::new(Vec::new(), 0);
        assert!(queue.current().is_none());
        assert!(queue.next().is_none());
        assert!(queue.prev().is_none());
        assert_eq!(queue.position(), (0, 0));
    }

    #[test]
    fn test_mark_current_listened() {
        let mut queue = PlayQueue::new(vec![message(1)], 0);
        queue.mark_current_listened();
        assert!(queue.current().unwrap().listened);
    }
}
