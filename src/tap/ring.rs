use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ringbuf::HeapRb;
use ringbuf::traits::{Consumer as _, RingBuffer as _};
use rodio::source::SeekError;
use rodio::{ChannelCount, Sample, SampleRate, Source};

static NEXT_TAP_ID: AtomicU64 = AtomicU64::new(1);

/// Samples pushed to the ring per lock; keeps the mixer thread off the mutex
/// for all but one sample in this many.
const CHUNK: usize = 256;

struct TapShared {
    id: u64,
    ring: Mutex<HeapRb<f32>>,
    attached: AtomicBool,
    sample_rate: AtomicU32,
}

/// Read-only view of the mono signal a sink is playing.
///
/// One tap exists per sink. The sink's decoder thread pushes into it while it
/// is attached; readers (the shared analyser) drain it. Cloning shares the
/// same ring.
#[derive(Clone)]
pub struct SampleTap {
    inner: Arc<TapShared>,
}

impl std::fmt::Debug for SampleTap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleTap")
            .field("id", &self.inner.id)
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl SampleTap {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(TapShared {
                id: NEXT_TAP_ID.fetch_add(1, Ordering::Relaxed),
                ring: Mutex::new(HeapRb::new(capacity.max(1))),
                attached: AtomicBool::new(false),
                sample_rate: AtomicU32::new(44_100),
            }),
        }
    }

    /// Identity of the underlying ring, shared by all clones.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn is_attached(&self) -> bool {
        self.inner.attached.load(Ordering::Acquire)
    }

    /// Start accepting samples. Returns `false` when already attached.
    pub fn attach(&self) -> bool {
        !self.inner.attached.swap(true, Ordering::AcqRel)
    }

    /// Stop accepting samples and drop anything buffered. Returns `true` only
    /// for the call that actually detached.
    pub fn detach(&self) -> bool {
        let was = self.inner.attached.swap(false, Ordering::AcqRel);
        if was {
            if let Ok(mut ring) = self.inner.ring.lock() {
                ring.clear();
            }
        }
        was
    }

    pub fn sample_rate(&self) -> u32 {
        self.inner.sample_rate.load(Ordering::Relaxed)
    }

    pub(crate) fn set_sample_rate(&self, rate: u32) {
        self.inner.sample_rate.store(rate, Ordering::Relaxed);
    }

    /// Append mono samples, overwriting the oldest when full. Ignored while detached.
    pub fn push(&self, samples: &[f32]) {
        if !self.is_attached() {
            return;
        }
        if let Ok(mut ring) = self.inner.ring.lock() {
            ring.push_slice_overwrite(samples);
        }
    }

    /// Move everything buffered into `out`. Returns the number of samples moved.
    pub fn drain_into(&self, out: &mut Vec<f32>) -> usize {
        let Ok(mut ring) = self.inner.ring.lock() else {
            return 0;
        };
        let before = out.len();
        out.extend(ring.pop_iter());
        out.len() - before
    }
}

/// Pass-through source that mixes each frame to mono and feeds a [`SampleTap`].
pub struct TapSource<S> {
    inner: S,
    tap: SampleTap,
    chunk: Vec<f32>,
    frame_sum: f32,
    frame_len: u16,
}

impl<S: Source> TapSource<S> {
    pub fn new(inner: S, tap: SampleTap) -> Self {
        tap.set_sample_rate(inner.sample_rate());
        Self {
            inner,
            tap,
            chunk: Vec::with_capacity(CHUNK),
            frame_sum: 0.0,
            frame_len: 0,
        }
    }

    fn flush(&mut self) {
        if !self.chunk.is_empty() {
            self.tap.push(&self.chunk);
            self.chunk.clear();
        }
    }
}

impl<S: Source> Iterator for TapSource<S> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        let Some(sample) = self.inner.next() else {
            self.flush();
            return None;
        };

        let channels = self.inner.channels().max(1);
        self.frame_sum += sample;
        self.frame_len += 1;
        if self.frame_len >= channels {
            self.chunk.push(self.frame_sum / f32::from(self.frame_len));
            self.frame_sum = 0.0;
            self.frame_len = 0;
            if self.chunk.len() >= CHUNK {
                self.flush();
            }
        }

        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S: Source> Source for TapSource<S> {
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    fn channels(&self) -> ChannelCount {
        self.inner.channels()
    }

    fn sample_rate(&self) -> SampleRate {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), SeekError> {
        self.chunk.clear();
        self.frame_sum = 0.0;
        self.frame_len = 0;
        self.inner.try_seek(pos)
    }
}
