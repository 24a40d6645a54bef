//! `rodio` output for local files.
//!
//! Each load opens and decodes the file into a paused `Sink` wrapped in a
//! [`TapSource`], so the visualizer sees exactly what is played. Seeking
//! rebuilds the sink and skips into the file.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source, StreamError};
use tracing::{debug, info, warn};

use crate::error::PlaybackError;
use crate::library::Track;
use crate::tap::{SampleTap, TapSource};

use super::clock::PlaybackClock;
use super::{AudioSink, LoadId, SinkEvent};

const LOG_TARGET: &str = "encore::sink";

/// Mono samples kept for the analyser; a little over a second at 44.1 kHz.
const TAP_CAPACITY: usize = 1 << 16;

struct Loaded {
    load: LoadId,
    url: String,
    path: PathBuf,
    sink: Sink,
    duration: Option<f64>,
}

pub struct RodioSink {
    stream: OutputStream,
    current: Option<Loaded>,
    clock: PlaybackClock,
    volume: f32,
    ended: bool,
    tap: SampleTap,
    events: Vec<SinkEvent>,
}

impl RodioSink {
    /// Open the default output device.
    pub fn open() -> Result<Self, StreamError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio logs to stderr when the stream is dropped, which garbles the TUI.
        stream.log_on_drop(false);
        info!(target: LOG_TARGET, "opened default audio output");

        Ok(Self {
            stream,
            current: None,
            clock: PlaybackClock::default(),
            volume: 1.0,
            ended: false,
            tap: SampleTap::new(TAP_CAPACITY),
            events: Vec::new(),
        })
    }

    /// Create a paused `Sink` for `path` that starts playback at `start_at`.
    fn create_sink_at(
        &self,
        url: &str,
        path: &Path,
        start_at: Duration,
    ) -> Result<(Sink, Option<f64>), PlaybackError> {
        let file = File::open(path).map_err(|e| PlaybackError::LoadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let decoder =
            Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::DecodeFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        let duration = decoder.total_duration().map(|d| d.as_secs_f64());

        // `skip_duration` is the seeking primitive; Duration::ZERO is fine.
        let source = TapSource::new(decoder.skip_duration(start_at), self.tap.clone());

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(source);
        sink.pause();
        Ok((sink, duration))
    }
}

/// Resolve a track location to a local path.
fn local_path(url: &str) -> Result<PathBuf, PlaybackError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        return Err(PlaybackError::NetworkFailed {
            url: url.to_string(),
            reason: "remote streams are not supported by the local output".to_string(),
        });
    }
    Ok(PathBuf::from(url.strip_prefix("file://").unwrap_or(url)))
}

impl AudioSink for RodioSink {
    fn load(&mut self, load: LoadId, track: &Track) {
        self.stop();

        let url = track.audio_url.clone();
        let opened = local_path(&url).and_then(|path| {
            let (sink, duration) = self.create_sink_at(&url, &path, Duration::ZERO)?;
            Ok((path, sink, duration))
        });

        match opened {
            Ok((path, sink, duration)) => {
                let duration = duration
                    .or((track.duration_seconds > 0.0).then_some(track.duration_seconds));
                debug!(target: LOG_TARGET, "loaded {} ({duration:?}s)", path.display());
                self.current = Some(Loaded {
                    load,
                    url,
                    path,
                    sink,
                    duration,
                });
                self.events.push(SinkEvent::Ready { load, duration });
            }
            Err(error) => {
                warn!(target: LOG_TARGET, "{error}");
                self.events.push(SinkEvent::Failed { load, error });
            }
        }
    }

    fn play(&mut self) {
        if let Some(cur) = &self.current {
            cur.sink.play();
            self.clock.start(Instant::now());
        }
    }

    fn pause(&mut self) {
        if let Some(cur) = &self.current {
            cur.sink.pause();
        }
        self.clock.pause(Instant::now());
    }

    fn stop(&mut self) {
        if let Some(cur) = self.current.take() {
            cur.sink.stop();
        }
        self.clock.clear();
        self.ended = false;
    }

    fn seek(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }
        let Some(cur) = self.current.take() else {
            return;
        };
        let target = Duration::from_secs_f64(seconds.max(0.0));
        let running = self.clock.is_running();

        // Stop the old sink and replace it with a fresh one skipped to `target`.
        cur.sink.stop();
        match self.create_sink_at(&cur.url, &cur.path, target) {
            Ok((sink, _)) => {
                if running {
                    sink.play();
                }
                self.clock.reset(target, Instant::now());
                self.ended = false;
                self.current = Some(Loaded { sink, ..cur });
            }
            Err(error) => {
                warn!(target: LOG_TARGET, "seek failed: {error}");
                self.clock.clear();
                self.events.push(SinkEvent::Failed {
                    load: cur.load,
                    error,
                });
            }
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(cur) = &self.current {
            cur.sink.set_volume(self.volume);
        }
    }

    fn poll_events(&mut self) -> Vec<SinkEvent> {
        let mut events = std::mem::take(&mut self.events);
        let Some(cur) = &self.current else {
            return events;
        };

        let now = Instant::now();
        let mut seconds = self.clock.elapsed(now).as_secs_f64();
        if let Some(d) = cur.duration {
            seconds = seconds.min(d);
        }
        events.push(SinkEvent::Position {
            load: cur.load,
            seconds,
        });

        if !self.ended && self.clock.is_running() && cur.sink.empty() {
            self.ended = true;
            self.clock.pause(now);
            events.push(SinkEvent::Ended { load: cur.load });
        }
        events
    }

    fn signal_tap(&self) -> Option<SampleTap> {
        Some(self.tap.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlaybackErrorKind;

    #[test]
    fn remote_urls_are_network_failures() {
        let err = local_path("https://example.com/a.mp3").unwrap_err();
        assert_eq!(err.kind(), PlaybackErrorKind::NetworkFailed);
        assert_eq!(err.url(), "https://example.com/a.mp3");
    }

    #[test]
    fn file_urls_resolve_to_paths() {
        assert_eq!(
            local_path("file:///music/a.flac").unwrap(),
            PathBuf::from("/music/a.flac")
        );
        assert_eq!(local_path("/music/b.ogg").unwrap(), PathBuf::from("/music/b.ogg"));
    }
}
