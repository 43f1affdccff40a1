//! Circular track navigation
//!
//! Next and previous wrap around the playlist. Every transition captures
//! whether playback was running so the orchestrator can resume on the new
//! track once its backend is ready.

/// A move from one track to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Index before the move
    pub from: usize,
    /// Index after the move
    pub to: usize,
    /// Whether playback should resume on the new track
    pub resume: bool,
}

/// Current-index state machine over a fixed-length playlist
#[derive(Debug, Clone, Default)]
pub struct TrackNavigator {
    len: usize,
    current: usize,
    resume_after_change: bool,
}

impl TrackNavigator {
    /// Navigator positioned on the first track
    pub fn new(len: usize) -> Self {
        Self {
            len,
            current: 0,
            resume_after_change: false,
        }
    }

    /// Replace the playlist length and go back to the first track
    pub fn reset(&mut self, len: usize) {
        *self = Self::new(len);
    }

    /// Playlist length
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the playlist is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current index, `None` when the playlist is empty
    pub fn current(&self) -> Option<usize> {
        (self.len > 0).then_some(self.current)
    }

    /// Whether next/previous can move anywhere
    pub fn can_navigate(&self) -> bool {
        self.len > 1
    }

    /// Advance with wrap-around
    ///
    /// No-op for playlists of zero or one track.
    pub fn next(&mut self, is_playing: bool) -> Option<Transition> {
        if !self.can_navigate() {
            return None;
        }
        Some(self.move_to((self.current + 1) % self.len, is_playing))
    }

    /// Go back with wrap-around
    ///
    /// No-op for playlists of zero or one track.
    pub fn previous(&mut self, is_playing: bool) -> Option<Transition> {
        if !self.can_navigate() {
            return None;
        }
        Some(self.move_to((self.current + self.len - 1) % self.len, is_playing))
    }

    /// Jump to an index
    ///
    /// Selecting the current index is still a transition: the track restarts
    /// from the top. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize, is_playing: bool) -> Option<Transition> {
        if index >= self.len {
            tracing::debug!("Ignoring select of index {} (len {})", index, self.len);
            return None;
        }
        Some(self.move_to(index, is_playing))
    }

    /// Whether playback should resume once the new backend is ready
    pub fn should_resume(&self) -> bool {
        self.resume_after_change
    }

    /// Resume was performed or abandoned
    pub fn clear_resume(&mut self) {
        self.resume_after_change = false;
    }

    fn move_to(&mut self, to: usize, resume: bool) -> Transition {
        let from = self.current;
        self.current = to;
        self.resume_after_change = resume;
        Transition { from, to, resume }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_wraps() {
        let mut nav = TrackNavigator::new(3);
        assert_eq!(nav.next(false).map(|t| t.to), Some(1));
        assert_eq!(nav.next(false).map(|t| t.to), Some(2));
        assert_eq!(nav.next(false).map(|t| t.to), Some(0));
    }

    #[test]
    fn previous_wraps() {
        let mut nav = TrackNavigator::new(3);
        let t = nav.previous(true).unwrap();
        assert_eq!((t.from, t.to, t.resume), (0, 2, true));
        assert!(nav.should_resume());
    }

    #[test]
    fn single_and_empty_are_noops() {
        let mut nav = TrackNavigator::new(1);
        assert_eq!(nav.next(true), None);
        assert_eq!(nav.previous(true), None);
        assert_eq!(nav.current(), Some(0));
        assert!(!nav.should_resume());

        let mut nav = TrackNavigator::new(0);
        assert_eq!(nav.next(true), None);
        assert_eq!(nav.current(), None);
        assert_eq!(nav.select(0, true), None);
    }

    #[test]
    fn select_same_index_is_a_transition() {
        let mut nav = TrackNavigator::new(3);
        let t = nav.select(0, false).unwrap();
        assert_eq!((t.from, t.to), (0, 0));
        assert_eq!(nav.select(3, false), None);
        assert_eq!(nav.current(), Some(0));
    }

    #[test]
    fn clear_resume() {
        let mut nav = TrackNavigator::new(2);
        nav.next(true);
        assert!(nav.should_resume());
        nav.clear_resume();
        assert!(!nav.should_resume());

        nav.next(false);
        assert!(!nav.should_resume());
    }
}
