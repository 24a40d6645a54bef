use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::mpsc::Receiver;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, trace, warn};

use crate::config::PlaybackSettings;
use crate::error::{EngineError, PlaybackError};
use crate::library::Track;
use crate::sink::{AudioSink, LoadId, SinkEvent};
use crate::tap::SampleTap;

use super::bus::StateBus;
use super::queue::{Queue, Removal};
use super::shuffle::ShuffleOrder;
use super::types::{Command, PlaybackState, QueueSnapshot, RepeatMode, Transport};

const LOG_TARGET: &str = "encore::playback";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOptions {
    /// Start playing as soon as `set_queue` has loaded the first track.
    pub autoplay: bool,
    /// `previous` restarts the current track when further in than this.
    pub restart_threshold_secs: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            autoplay: true,
            restart_threshold_secs: 3.0,
        }
    }
}

impl From<&PlaybackSettings> for EngineOptions {
    fn from(s: &PlaybackSettings) -> Self {
        Self {
            autoplay: s.autoplay,
            restart_threshold_secs: s.restart_threshold_secs,
        }
    }
}

/// What to do once the sink reports the in-flight load as ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadyAction {
    Play,
    /// Stay stopped; `Paused` keeps a paused transport, anything else means `Loaded`.
    Hold(Transport),
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    id: LoadId,
    ready: ReadyAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// The single source of truth for what is playing and how.
///
/// Commands are applied strictly in issue order. While the sink is loading a
/// track, later commands wait in a FIFO and run once the load resolves, so a
/// `next()` issued mid-load never interleaves with the transition. Every
/// applied command that changes something publishes a [`PlaybackState`] to
/// all subscribers; meaningless commands are silent no-ops.
pub struct PlaybackEngine<S: AudioSink> {
    sink: S,
    options: EngineOptions,
    queue: Queue,
    snapshot: Arc<[Track]>,
    shuffling: bool,
    order: ShuffleOrder,
    repeat: RepeatMode,
    transport: Transport,
    position: f64,
    duration: f64,
    volume: f32,
    muted: bool,
    last_error: Option<PlaybackError>,
    last_load: LoadId,
    current_load: Option<LoadId>,
    loading: Option<InFlight>,
    pending: VecDeque<Command>,
    bus: StateBus,
    rng: StdRng,
    disposed: bool,
}

impl<S: AudioSink> PlaybackEngine<S> {
    pub fn new(mut sink: S, options: EngineOptions) -> Self {
        sink.set_volume(1.0);
        let mut rng = StdRng::from_os_rng();
        let order = ShuffleOrder::new(0, None, &mut rng);
        Self {
            sink,
            options,
            queue: Queue::default(),
            snapshot: Arc::from(Vec::new()),
            shuffling: false,
            order,
            repeat: RepeatMode::None,
            transport: Transport::Idle,
            position: 0.0,
            duration: 0.0,
            volume: 1.0,
            muted: false,
            last_error: None,
            last_load: 0,
            current_load: None,
            loading: None,
            pending: VecDeque::new(),
            bus: StateBus::default(),
            rng,
            disposed: false,
        }
    }

    /// Use a deterministic shuffle sequence.
    #[must_use]
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn signal_tap(&self) -> Option<SampleTap> {
        self.sink.signal_tap()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Receive every state published from now on, in publish order.
    pub fn subscribe(&mut self) -> Result<Receiver<PlaybackState>, EngineError> {
        self.ensure_live()?;
        Ok(self.bus.subscribe())
    }

    /// Current snapshot.
    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            current_track: self.queue.current_track().cloned(),
            transport: self.transport,
            is_playing: self.transport == Transport::Playing,
            is_loading: self.loading.is_some(),
            current_time_seconds: self.position,
            duration_seconds: self.duration,
            is_shuffling: self.shuffling,
            repeat_mode: self.repeat,
            volume: self.volume,
            is_muted: self.muted,
            queue: QueueSnapshot {
                tracks: self.snapshot.clone(),
                current_index: self.queue.current_index(),
            },
            last_error: self.last_error.clone(),
        }
    }

    pub fn set_queue(&mut self, tracks: Vec<Track>, start_index: usize) -> Result<(), EngineError> {
        self.dispatch(Command::SetQueue {
            tracks,
            start_index,
        })
    }

    pub fn play(&mut self) -> Result<(), EngineError> {
        self.dispatch(Command::Play)
    }

    pub fn pause(&mut self) -> Result<(), EngineError> {
        self.dispatch(Command::Pause)
    }

    pub fn toggle_play_pause(&mut self) -> Result<(), EngineError> {
        self.dispatch(Command::TogglePlayPause)
    }

    pub fn next(&mut self) -> Result<(), EngineError> {
        self.dispatch(Command::Next)
    }

    pub fn previous(&mut self) -> Result<(), EngineError> {
        self.dispatch(Command::Previous)
    }

    pub fn seek(&mut self, seconds: f64) -> Result<(), EngineError> {
        self.dispatch(Command::Seek(seconds))
    }

    pub fn seek_by(&mut self, delta_seconds: f64) -> Result<(), EngineError> {
        self.dispatch(Command::SeekBy(delta_seconds))
    }

    pub fn remove_from_queue(&mut self, index: usize) -> Result<(), EngineError> {
        self.dispatch(Command::RemoveFromQueue(index))
    }

    pub fn move_in_queue(&mut self, from: usize, to: usize) -> Result<(), EngineError> {
        self.dispatch(Command::MoveInQueue { from, to })
    }

    pub fn play_from_queue(&mut self, index: usize) -> Result<(), EngineError> {
        self.dispatch(Command::PlayFromQueue(index))
    }

    pub fn toggle_shuffle(&mut self) -> Result<(), EngineError> {
        self.dispatch(Command::ToggleShuffle)
    }

    pub fn toggle_repeat(&mut self) -> Result<(), EngineError> {
        self.dispatch(Command::ToggleRepeat)
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) -> Result<(), EngineError> {
        self.dispatch(Command::SetRepeatMode(mode))
    }

    pub fn set_volume(&mut self, volume: f32) -> Result<(), EngineError> {
        self.dispatch(Command::SetVolume(volume))
    }

    pub fn toggle_mute(&mut self) -> Result<(), EngineError> {
        self.dispatch(Command::ToggleMute)
    }

    /// Swap in a refreshed copy of a queued track without restarting playback.
    pub fn update_current_track(&mut self, track: Track) -> Result<(), EngineError> {
        self.dispatch(Command::UpdateCurrentTrack(track))
    }

    /// Queue `command` behind any pending ones and run as far as possible.
    pub fn dispatch(&mut self, command: Command) -> Result<(), EngineError> {
        self.ensure_live()?;
        self.pending.push_back(command);
        self.pump();
        Ok(())
    }

    /// Process sink events (position, readiness, end of track) and any
    /// commands that were waiting on a load.
    pub fn tick(&mut self) -> Result<(), EngineError> {
        self.ensure_live()?;
        self.pump();
        Ok(())
    }

    /// Stop the sink and drop every subscriber. Later commands return
    /// [`EngineError::Disposed`].
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.sink.stop();
        self.pending.clear();
        self.loading = None;
        self.current_load = None;
        self.bus.clear();
        info!(target: LOG_TARGET, "playback engine disposed");
    }

    fn ensure_live(&self) -> Result<(), EngineError> {
        if self.disposed {
            Err(EngineError::Disposed)
        } else {
            Ok(())
        }
    }

    fn pump(&mut self) {
        loop {
            self.drain_sink_events();
            if self.loading.is_some() {
                if !self.pending.is_empty() {
                    trace!(target: LOG_TARGET, "{} command(s) waiting on load", self.pending.len());
                }
                break;
            }
            let Some(command) = self.pending.pop_front() else {
                break;
            };
            self.apply(command);
        }
    }

    fn publish(&mut self) {
        let state = self.state();
        self.bus.publish(&state);
    }

    fn refresh_snapshot(&mut self) {
        self.snapshot = Arc::from(self.queue.tracks());
    }

    fn apply(&mut self, command: Command) {
        trace!(target: LOG_TARGET, "apply {command:?}");
        match command {
            Command::SetQueue {
                tracks,
                start_index,
            } => self.apply_set_queue(tracks, start_index),
            Command::Play => self.apply_play(),
            Command::Pause => self.apply_pause(),
            Command::TogglePlayPause => {
                if self.transport == Transport::Playing {
                    self.apply_pause();
                } else {
                    self.apply_play();
                }
            }
            Command::Next => self.apply_step(Direction::Forward),
            Command::Previous => self.apply_previous(),
            Command::Seek(seconds) => self.apply_seek(seconds),
            Command::SeekBy(delta) => self.apply_seek(self.position + delta),
            Command::RemoveFromQueue(index) => self.apply_remove(index),
            Command::MoveInQueue { from, to } => self.apply_move(from, to),
            Command::PlayFromQueue(index) => self.apply_play_from_queue(index),
            Command::ToggleShuffle => self.apply_toggle_shuffle(),
            Command::ToggleRepeat => {
                self.repeat = self.repeat.cycled();
                debug!(target: LOG_TARGET, "repeat mode {:?}", self.repeat);
                self.publish();
            }
            Command::SetRepeatMode(mode) => {
                if mode == self.repeat {
                    debug!(target: LOG_TARGET, "repeat mode already {mode:?}");
                    return;
                }
                self.repeat = mode;
                self.publish();
            }
            Command::SetVolume(volume) => self.apply_set_volume(volume),
            Command::ToggleMute => {
                self.muted = !self.muted;
                self.sync_volume();
                self.publish();
            }
            Command::UpdateCurrentTrack(track) => self.apply_update_track(track),
        }
    }

    fn apply_set_queue(&mut self, tracks: Vec<Track>, start_index: usize) {
        if !tracks.is_empty() && start_index >= tracks.len() {
            debug!(
                target: LOG_TARGET,
                "start index {start_index} out of range for {} tracks; clamping",
                tracks.len()
            );
        }
        let current = self.queue.replace(tracks, start_index);
        self.refresh_snapshot();
        info!(target: LOG_TARGET, "queue replaced with {} tracks", self.queue.len());

        if current.is_none() {
            self.go_idle();
            return;
        }
        self.rebuild_order();
        let ready = if self.options.autoplay {
            ReadyAction::Play
        } else {
            ReadyAction::Hold(Transport::Loaded)
        };
        self.begin_load(ready);
    }

    fn apply_play(&mut self) {
        match self.transport {
            Transport::Idle => debug!(target: LOG_TARGET, "play ignored: nothing loaded"),
            Transport::Playing => debug!(target: LOG_TARGET, "play ignored: already playing"),
            Transport::Loaded | Transport::Paused => {
                if self.last_error.is_some() {
                    info!(target: LOG_TARGET, "retrying failed track");
                    self.begin_load(ReadyAction::Play);
                    return;
                }
                self.sink.play();
                self.transport = Transport::Playing;
                self.publish();
            }
        }
    }

    fn apply_pause(&mut self) {
        if self.transport != Transport::Playing {
            debug!(target: LOG_TARGET, "pause ignored in {:?}", self.transport);
            return;
        }
        self.sink.pause();
        self.transport = Transport::Paused;
        self.publish();
    }

    fn apply_seek(&mut self, seconds: f64) {
        if self.transport == Transport::Idle || !seconds.is_finite() {
            debug!(target: LOG_TARGET, "seek to {seconds} ignored in {:?}", self.transport);
            return;
        }
        let target = if self.duration > 0.0 {
            seconds.clamp(0.0, self.duration)
        } else {
            seconds.max(0.0)
        };
        self.sink.seek(target);
        self.position = target;
        self.publish();
    }

    fn apply_previous(&mut self) {
        if self.transport == Transport::Idle {
            debug!(target: LOG_TARGET, "previous ignored: nothing loaded");
            return;
        }
        if self.position > self.options.restart_threshold_secs {
            debug!(target: LOG_TARGET, "previous restarts current track");
            self.apply_seek(0.0);
            return;
        }
        self.apply_step(Direction::Backward);
    }

    /// Manual next/previous. Wraps only under `RepeatMode::All`.
    fn apply_step(&mut self, direction: Direction) {
        if self.transport == Transport::Idle {
            debug!(target: LOG_TARGET, "{direction:?} ignored: nothing loaded");
            return;
        }
        match self.neighbour(direction) {
            Some(index) => {
                self.queue.set_current(index);
                self.begin_load(ReadyAction::Play);
            }
            None => self.halt_at_boundary(),
        }
    }

    fn apply_remove(&mut self, index: usize) {
        let prior = self.transport;
        let Some((removed, outcome)) = self.queue.remove(index) else {
            debug!(target: LOG_TARGET, "remove ignored: index {index} out of range");
            return;
        };
        self.refresh_snapshot();
        if self.shuffling {
            let new_current = match &outcome {
                Removal::Current { new_current } => *new_current,
                _ => None,
            };
            self.order.remove(index, new_current);
        }
        debug!(target: LOG_TARGET, "removed {} at {index}", removed.id);

        match outcome {
            Removal::BeforeCurrent | Removal::AfterCurrent => self.publish(),
            Removal::Current { new_current: None } => self.go_idle(),
            Removal::Current { new_current: Some(_) } => {
                let ready = match prior {
                    Transport::Playing => ReadyAction::Play,
                    other => ReadyAction::Hold(other),
                };
                self.begin_load(ready);
            }
        }
    }

    fn apply_move(&mut self, from: usize, to: usize) {
        if from == to || !self.queue.move_track(from, to) {
            debug!(target: LOG_TARGET, "move {from} -> {to} ignored");
            return;
        }
        self.refresh_snapshot();
        if self.shuffling {
            self.order.moved(from, to);
        }
        self.publish();
    }

    fn apply_play_from_queue(&mut self, index: usize) {
        if !self.queue.set_current(index) {
            debug!(target: LOG_TARGET, "play-from-queue ignored: index {index} out of range");
            return;
        }
        self.rebuild_order();
        self.begin_load(ReadyAction::Play);
    }

    fn apply_toggle_shuffle(&mut self) {
        self.shuffling = !self.shuffling;
        self.rebuild_order();
        info!(target: LOG_TARGET, "shuffle {}", if self.shuffling { "on" } else { "off" });
        self.publish();
    }

    fn apply_set_volume(&mut self, volume: f32) {
        if !volume.is_finite() {
            debug!(target: LOG_TARGET, "volume {volume} ignored");
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        if volume == self.volume {
            return;
        }
        self.volume = volume;
        self.sync_volume();
        self.publish();
    }

    fn apply_update_track(&mut self, track: Track) {
        let replaced = self.queue.replace_by_id(&track);
        if replaced == 0 {
            debug!(target: LOG_TARGET, "update ignored: {} is not queued", track.id);
            return;
        }
        self.refresh_snapshot();
        self.publish();
    }

    fn sync_volume(&mut self) {
        let gain = if self.muted { 0.0 } else { self.volume };
        self.sink.set_volume(gain);
    }

    /// Rebuild the shuffle permutation anchored at the current track.
    fn rebuild_order(&mut self) {
        let len = if self.shuffling { self.queue.len() } else { 0 };
        self.order = ShuffleOrder::new(len, self.queue.current_index(), &mut self.rng);
    }

    /// Queue index that `direction` leads to, or `None` at a boundary that
    /// does not wrap.
    fn neighbour(&mut self, direction: Direction) -> Option<usize> {
        let cur = self.queue.current_index()?;
        let len = self.queue.len();
        let wrap = self.repeat == RepeatMode::All;

        if !self.shuffling {
            return match direction {
                Direction::Forward if cur + 1 < len => Some(cur + 1),
                Direction::Forward => wrap.then_some(0),
                Direction::Backward if cur > 0 => Some(cur - 1),
                Direction::Backward => wrap.then_some(len - 1),
            };
        }

        if self.order.len() != len {
            self.order = ShuffleOrder::new(len, Some(cur), &mut self.rng);
        }
        match direction {
            Direction::Forward => match self.order.after(cur) {
                Some(i) => Some(i),
                None if wrap => {
                    // A pass is complete: return to where it started and deal a
                    // new permutation from there.
                    let start = self.order.first()?;
                    self.order = ShuffleOrder::new(len, Some(start), &mut self.rng);
                    Some(start)
                }
                None => None,
            },
            Direction::Backward => match self.order.before(cur) {
                Some(i) => Some(i),
                None if wrap => self.order.last(),
                None => None,
            },
        }
    }

    /// Stop at the edge of the queue, keeping the boundary track current.
    fn halt_at_boundary(&mut self) {
        info!(target: LOG_TARGET, "reached the end of the queue");
        self.sink.pause();
        self.sink.seek(0.0);
        self.position = 0.0;
        self.transport = Transport::Loaded;
        self.publish();
    }

    fn go_idle(&mut self) {
        self.sink.stop();
        self.current_load = None;
        self.loading = None;
        self.transport = Transport::Idle;
        self.position = 0.0;
        self.duration = 0.0;
        self.last_error = None;
        self.rebuild_order();
        self.publish();
    }

    fn begin_load(&mut self, ready: ReadyAction) {
        let Some(track) = self.queue.current_track().cloned() else {
            self.go_idle();
            return;
        };
        self.last_load += 1;
        let id = self.last_load;
        self.current_load = Some(id);
        self.loading = Some(InFlight { id, ready });
        self.position = 0.0;
        self.duration = track.duration_seconds;
        self.last_error = None;
        if self.transport == Transport::Idle || self.transport == Transport::Playing {
            self.transport = Transport::Loaded;
        }
        debug!(target: LOG_TARGET, "load #{id}: {}", track.audio_url);
        self.sink.load(id, &track);
        self.publish();
    }

    fn drain_sink_events(&mut self) {
        for event in self.sink.poll_events() {
            if Some(event.load()) != self.current_load {
                trace!(target: LOG_TARGET, "dropping stale {event:?}");
                continue;
            }
            self.handle_sink_event(event);
        }
    }

    fn handle_sink_event(&mut self, event: SinkEvent) {
        match event {
            SinkEvent::Ready { load, duration } => {
                let Some(in_flight) = self.loading.filter(|f| f.id == load) else {
                    return;
                };
                self.loading = None;
                if let Some(d) = duration.filter(|d| d.is_finite() && *d > 0.0) {
                    self.duration = d;
                }
                match in_flight.ready {
                    ReadyAction::Play => {
                        self.sink.play();
                        self.transport = Transport::Playing;
                    }
                    ReadyAction::Hold(Transport::Paused) => self.transport = Transport::Paused,
                    ReadyAction::Hold(_) => self.transport = Transport::Loaded,
                }
                self.publish();
            }
            SinkEvent::Failed { error, .. } => {
                warn!(target: LOG_TARGET, "{error}");
                self.loading = None;
                self.sink.stop();
                self.transport = Transport::Loaded;
                self.position = 0.0;
                self.last_error = Some(error);
                self.publish();
            }
            SinkEvent::Position { seconds, .. } => {
                if self.loading.is_some() || !seconds.is_finite() {
                    return;
                }
                let seconds = if self.duration > 0.0 {
                    seconds.clamp(0.0, self.duration)
                } else {
                    seconds.max(0.0)
                };
                if seconds != self.position {
                    self.position = seconds;
                    self.publish();
                }
                if self.transport == Transport::Playing
                    && self.duration > 0.0
                    && seconds >= self.duration
                {
                    self.end_of_track();
                }
            }
            SinkEvent::Ended { .. } => {
                if self.transport == Transport::Playing {
                    self.end_of_track();
                }
            }
        }
    }

    /// Natural end of the current track.
    fn end_of_track(&mut self) {
        if self.repeat == RepeatMode::One {
            debug!(target: LOG_TARGET, "repeating current track");
            self.begin_load(ReadyAction::Play);
            return;
        }
        match self.neighbour(Direction::Forward) {
            Some(index) => {
                self.queue.set_current(index);
                self.begin_load(ReadyAction::Play);
            }
            None => self.halt_at_boundary(),
        }
    }
}

impl<S: AudioSink> Drop for PlaybackEngine<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}
