//! The ordered play queue and its current position.
//!
//! All index bookkeeping lives here so the engine only has to react to the
//! outcome of a mutation (see [`Removal`]).

use crate::library::Track;

#[derive(Debug, Clone, Default)]
pub struct Queue {
    tracks: Vec<Track>,
    current: Option<usize>,
}

/// What happened to the current position when a track was removed.
#[derive(Debug, Clone, PartialEq)]
pub enum Removal {
    /// A track before the current one went away; the index shifted down.
    BeforeCurrent,
    /// The current track went away. `new_current` is the clamped position
    /// now holding the current track, or `None` when the queue is empty.
    Current { new_current: Option<usize> },
    /// A track after the current one (or any track when nothing is current).
    AfterCurrent,
}

impl Queue {
    /// Replace the contents; `start_index` is clamped to the last track.
    /// Returns the new current index (`None` for an empty queue).
    pub fn replace(&mut self, tracks: Vec<Track>, start_index: usize) -> Option<usize> {
        self.current = if tracks.is_empty() {
            None
        } else {
            Some(start_index.min(tracks.len() - 1))
        };
        self.tracks = tracks;
        self.current
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    /// Point at `index`; returns `false` (and changes nothing) when out of range.
    pub fn set_current(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.current = Some(index);
            true
        } else {
            false
        }
    }

    /// Remove the track at `index`, keeping `current` on the same logical
    /// track where possible. `None` when `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Option<(Track, Removal)> {
        if index >= self.tracks.len() {
            return None;
        }
        let removed = self.tracks.remove(index);

        let outcome = match self.current {
            Some(cur) if index < cur => {
                self.current = Some(cur - 1);
                Removal::BeforeCurrent
            }
            Some(cur) if index == cur => {
                self.current = if self.tracks.is_empty() {
                    None
                } else {
                    Some(cur.min(self.tracks.len() - 1))
                };
                Removal::Current {
                    new_current: self.current,
                }
            }
            _ => Removal::AfterCurrent,
        };

        Some((removed, outcome))
    }

    /// Move the track at `from` so it ends up at `to` (`Vec::remove` then
    /// `Vec::insert` semantics). The current index follows its track.
    pub fn move_track(&mut self, from: usize, to: usize) -> bool {
        let len = self.tracks.len();
        if from >= len || to >= len {
            return false;
        }
        if from == to {
            return true;
        }

        let track = self.tracks.remove(from);
        self.tracks.insert(to, track);
        self.current = self.current.map(|cur| moved_index(cur, from, to));
        true
    }

    /// Replace every entry whose id matches `track.id`. Returns how many were replaced.
    pub fn replace_by_id(&mut self, track: &Track) -> usize {
        let mut replaced = 0;
        for slot in self.tracks.iter_mut().filter(|t| t.id == track.id) {
            *slot = track.clone();
            replaced += 1;
        }
        replaced
    }
}

/// Where an element at `index` ends up after moving `from` to `to`.
pub(crate) fn moved_index(index: usize, from: usize, to: usize) -> usize {
    if index == from {
        to
    } else if from < index && index <= to {
        index - 1
    } else if to <= index && index < from {
        index + 1
    } else {
        index
    }
}
