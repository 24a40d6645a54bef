//! encore: a queue-driven playback engine with a spectrum visualizer, plus
//! the terminal host that drives them.

pub mod app;
pub mod config;
pub mod error;
pub mod library;
pub mod playback;
pub mod prefs;
pub mod runtime;
pub mod schedule;
pub mod sink;
pub mod spectrum;
pub mod tap;
pub mod ui;
