//! Application model: the latest [`PlaybackState`] and the queue cursor.

use crate::library::Track;
use crate::playback::PlaybackState;

/// The main application model.
#[derive(Debug, Default)]
pub struct App {
    /// Latest snapshot published by the engine.
    pub state: PlaybackState,
    /// Cursor position in the queue list.
    pub selected: usize,
    /// When set, the cursor jumps to the current track whenever it changes.
    pub follow_playback: bool,
    pub current_dir: Option<String>,
}

impl App {
    pub fn new() -> Self {
        Self {
            follow_playback: true,
            ..Self::default()
        }
    }

    /// Record the current directory in the app state.
    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    /// Adopt a newly published state, keeping the cursor inside the queue.
    pub fn apply_state(&mut self, state: PlaybackState) {
        let moved = state.queue.current_index != self.state.queue.current_index;
        self.state = state;
        if self.follow_playback && moved {
            if let Some(idx) = self.state.queue.current_index {
                self.selected = idx;
            }
        }
        self.clamp_selected();
    }

    pub fn tracks(&self) -> &[Track] {
        &self.state.queue.tracks
    }

    /// Return true if the queue contains any tracks.
    pub fn has_tracks(&self) -> bool {
        !self.state.queue.is_empty()
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.tracks().get(self.selected)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.queue.current_index
    }

    /// Enable following playback (cursor follows currently playing track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    /// Disable follow-playback.
    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx;
        self.clamp_selected();
    }

    /// Move the cursor down, wrapping to the top.
    pub fn next(&mut self) {
        let len = self.tracks().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn prev(&mut self) {
        let len = self.tracks().len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    fn clamp_selected(&mut self) {
        let len = self.tracks().len();
        self.selected = if len == 0 { 0 } else { self.selected.min(len - 1) };
    }
}
