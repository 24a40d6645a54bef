//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::App;
use crate::config::ControlsSettings;
use crate::playback::{RepeatMode, Transport};
use crate::spectrum::{FrameMode, SpectrumVisualizer, bar_color, bar_glow};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("enter".to_string(), "play selected song".to_string());
    map.insert("space".to_string(), "play/pause".to_string());
    map.insert("n/p".to_string(), "next/prev song".to_string());
    // h/l is filled dynamically from config.
    map.insert("s".to_string(), "shuffle".to_string());
    map.insert("r".to_string(), "repeat".to_string());
    map.insert("d".to_string(), "remove".to_string());
    map.insert("J/K".to_string(), "move down/up".to_string());
    map.insert("f".to_string(), "favorite".to_string());
    map.insert("+/-".to_string(), "volume".to_string());
    map.insert("m".to_string(), "mute".to_string());
    map.insert("g".to_string(), "glow".to_string());
    map.insert("[/]".to_string(), "sensitivity".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating the seek step.
fn controls_text(seek_seconds: f64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "enter", "space", "n/p", "h/l", "s", "r", "d", "J/K", "f", "+/-", "m", "g", "[/]", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "h/l" {
                Some(format!("[h/l] seek -/+{}s", seek_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format seconds as `MM:SS`; anything negative or non-finite shows as zero.
fn format_mmss(seconds: f64) -> String {
    let secs = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn repeat_text(mode: RepeatMode) -> &'static str {
    match mode {
        RepeatMode::None => "Repeat: Off",
        RepeatMode::One => "Repeat: One",
        RepeatMode::All => "Repeat: All",
    }
}

fn status_text(app: &App, visualizer: &SpectrumVisualizer) -> String {
    let state = &app.state;
    let mut parts: Vec<String> = Vec::new();

    match &state.current_track {
        Some(track) => {
            parts.push(format!(
                "Song: {} [{} / {}]",
                track.display(),
                format_mmss(state.current_time_seconds),
                format_mmss(state.duration_seconds)
            ));
            let transport = if state.is_loading {
                "Loading"
            } else {
                match state.transport {
                    Transport::Idle => "Stopped",
                    Transport::Loaded => "Ready",
                    Transport::Playing => "Playing",
                    Transport::Paused => "Paused",
                }
            };
            parts.push(transport.to_string());
        }
        None => parts.push("No tracks".to_string()),
    }

    parts.push(if state.is_shuffling {
        "Shuffle: ON".to_string()
    } else {
        "Shuffle: OFF".to_string()
    });
    parts.push(repeat_text(state.repeat_mode).to_string());

    if state.is_muted {
        parts.push("Volume: muted".to_string());
    } else {
        parts.push(format!("Volume: {:.0}%", state.volume * 100.0));
    }

    parts.push(if visualizer.is_live() {
        "EQ: live".to_string()
    } else {
        "EQ: synthetic".to_string()
    });

    if let Some(err) = &state.last_error {
        parts.push(format!("Error: {err}"));
    }

    if let Some(dir) = &app.current_dir {
        parts.push(format!("Dir: {}", dir));
    }

    parts.join(" • ")
}

const EIGHTHS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Equalizer rows, top first, sized to `area`. Partial cells use eighth
/// blocks; with glow on, the cell above each bar gets a shaded halo.
fn spectrum_lines(visualizer: &SpectrumVisualizer, area: Rect) -> Vec<Line<'static>> {
    let bars = visualizer.bars();
    let n = bars.len();
    let rows = area.height as usize;
    let width = area.width as usize;
    if n == 0 || rows == 0 || width == 0 {
        return Vec::new();
    }

    let gap = usize::from(width >= n * 2 - 1);
    let bar_width = ((width + gap) / n).saturating_sub(gap).max(1);
    let used = n * bar_width + (n - 1) * gap;
    let pad = width.saturating_sub(used) / 2;
    let glow = visualizer.show_glow()
        && matches!(visualizer.frame().mode, FrameMode::Live | FrameMode::Synthetic);

    (0..rows)
        .rev()
        .map(|row| {
            let mut spans = vec![Span::raw(" ".repeat(pad))];
            for (i, &h) in bars.iter().enumerate() {
                let units = (h.clamp(0.0, 100.0) / 100.0 * (rows * 8) as f32).round() as usize;
                let cell = units.saturating_sub(row * 8).min(8);
                let (symbol, style) = if cell > 0 {
                    let (r, g, b) = bar_color(i, n, h).to_rgb();
                    (EIGHTHS[cell], Style::default().fg(Color::Rgb(r, g, b)))
                } else if glow && units.div_ceil(8) == row {
                    let halo = bar_glow(i, n, h);
                    let (r, g, b) = halo.color.to_rgb();
                    let mut style = Style::default().fg(Color::Rgb(r, g, b));
                    if halo.alpha < 0.3 {
                        style = style.add_modifier(Modifier::DIM);
                    }
                    ('░', style)
                } else {
                    (' ', Style::default())
                };
                spans.push(Span::styled(symbol.to_string().repeat(bar_width), style));
                if gap > 0 && i + 1 < n {
                    spans.push(Span::raw(" "));
                }
            }
            Line::from(spans)
        })
        .collect()
}

fn track_label(app: &App, index: usize) -> String {
    let track = &app.tracks()[index];
    let marker = if app.current_index() == Some(index) {
        "▶ "
    } else {
        "  "
    };
    let heart = if track.is_favorite { " ♥" } else { "" };
    format!("{marker}{}{heart}", track.display())
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, visualizer: &SpectrumVisualizer, controls_settings: &ControlsSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());
    // Header
    let header = Paragraph::new("terminal music player").alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" encore ")
            .title_alignment(Alignment::Center),
    );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status_par = Paragraph::new(status_text(app, visualizer))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Equalizer
    let eq_block = Block::default().borders(Borders::ALL).title(" equalizer ");
    let eq_area = eq_block.inner(chunks[2]);
    frame.render_widget(eq_block, chunks[2]);
    frame.render_widget(Paragraph::new(spectrum_lines(visualizer, eq_area)), eq_area);

    // Main list
    {
        // Center the selected item when possible by creating a visible window.
        // Important: only build ListItems for the visible window (avoid allocating the entire list).
        let total = app.tracks().len();
        let list_height = chunks[3].height.saturating_sub(2) as usize;
        let sel_pos = app.selected.min(total.saturating_sub(1));
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = (start..end).map(|i| ListItem::new(track_label(app, i))).collect();

        let title = format!(" queue ({}) ", total);
        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[3], &mut state);
    }

    let footer_text = controls_text(controls_settings.seek_seconds);
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[4]);
}
