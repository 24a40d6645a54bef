/// A playable song.
///
/// Tracks are values: toggling a flag produces a new `Track` which replaces
/// the old one wherever it is referenced (see
/// [`PlaybackEngine::update_current_track`](crate::playback::PlaybackEngine::update_current_track)).
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Unique identifier used to match copies of the same song.
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Length reported by the data source; the sink may refine it on load.
    pub duration_seconds: f64,
    pub thumbnail_url: Option<String>,
    /// Location handed to the audio sink (file path or URL).
    pub audio_url: String,
    pub is_favorite: bool,
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        duration_seconds: f64,
        audio_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            duration_seconds: duration_seconds.max(0.0),
            thumbnail_url: None,
            audio_url: audio_url.into(),
            is_favorite: false,
        }
    }

    #[must_use]
    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    /// Copy of this track with the favorite flag set to `favorite`.
    #[must_use]
    pub fn with_favorite(&self, favorite: bool) -> Self {
        Self {
            is_favorite: favorite,
            ..self.clone()
        }
    }

    /// `Artist - Title`, or just the title when the artist is blank.
    pub fn display(&self) -> String {
        let artist = self.artist.trim();
        if artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", artist, self.title)
        }
    }
}
