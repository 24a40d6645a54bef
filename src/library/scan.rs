use std::path::Path;

use lofty::{AudioFile, ItemKey, TaggedFileExt};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::Track;

const LOG_TARGET: &str = "encore::library";

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Build a `Track` for `path`, reading title/artist/duration from tags when
/// the file has them and falling back to the file stem otherwise.
pub(super) fn track_from_path(path: &Path) -> Track {
    let location = path.to_string_lossy().into_owned();
    let mut title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let mut artist = String::new();
    let mut duration_seconds = 0.0;

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            duration_seconds = tagged.properties().duration().as_secs_f64();

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.get_string(&ItemKey::TrackTitle) {
                    if !v.trim().is_empty() {
                        title = v.trim().to_string();
                    }
                }
                if let Some(v) = tag.get_string(&ItemKey::TrackArtist) {
                    artist = v.trim().to_string();
                }
            }
        }
        Err(e) => debug!(target: LOG_TARGET, "no readable tags in {}: {e}", path.display()),
    }

    Track::new(location.clone(), title, artist, duration_seconds, location)
}

/// Collect audio files under `dir` into tracks sorted by display name.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            tracks.push(track_from_path(path));
        }
    }

    tracks.sort_by_key(|t| t.display().to_lowercase());
    debug!(target: LOG_TARGET, "scanned {} tracks under {}", tracks.len(), dir.display());
    tracks
}
