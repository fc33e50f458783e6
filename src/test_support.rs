//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).
//!
//! `ScriptedTerminal` replays keys at fixed offsets on tokio's clock, so tests
//! that run with `start_paused = true` exercise the real poll, debounce and
//! grace timings without waiting for them.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::style::Color;
use tokio::time::Instant;

use crate::core::config::Settings;
use crate::tui::terminal::{Key, Terminal};

struct ScriptedState {
    keys: VecDeque<(Instant, Key)>,
    lines: VecDeque<String>,
    screens: Vec<String>,
    colors: (Color, Color),
    cursor_visible: bool,
    keys_read: usize,
}

pub struct ScriptedTerminal {
    origin: Instant,
    width: u16,
    height: u16,
    state: Mutex<ScriptedState>,
}

impl ScriptedTerminal {
    /// An 80x24 terminal with no keys scripted.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            width: 80,
            height: 24,
            state: Mutex::new(ScriptedState {
                keys: VecDeque::new(),
                lines: VecDeque::new(),
                screens: vec![String::new()],
                colors: (Color::Reset, Color::Reset),
                cursor_visible: true,
                keys_read: 0,
            }),
        }
    }

    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Schedules `key` to become readable `ms` milliseconds after creation.
    pub fn key_at(self, ms: u64, key: Key) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.keys.push_back((self.origin + Duration::from_millis(ms), key));
            state.keys.make_contiguous().sort_by_key(|(at, _)| *at);
        }
        self
    }

    pub fn char_at(self, ms: u64, c: char) -> Self {
        self.key_at(ms, Key::Char(c))
    }

    /// Queues an answer for `read_line`.
    pub fn line(self, text: &str) -> Self {
        self.state.lock().unwrap().lines.push_back(text.to_string());
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Everything written, across all screens.
    pub fn output(&self) -> String {
        self.state.lock().unwrap().screens.concat()
    }

    /// Output split at every `clear()`. The first entry is what came before any clear.
    pub fn screens(&self) -> Vec<String> {
        self.state.lock().unwrap().screens.clone()
    }

    pub fn keys_read(&self) -> usize {
        self.state.lock().unwrap().keys_read
    }

    pub fn keys_left(&self) -> usize {
        self.state.lock().unwrap().keys.len()
    }

    pub fn cursor_visible(&self) -> bool {
        self.state.lock().unwrap().cursor_visible
    }

    fn push(&self, text: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(screen) = state.screens.last_mut() {
            screen.push_str(text);
        }
    }
}

impl Terminal for ScriptedTerminal {
    fn write(&self, text: &str) -> io::Result<()> {
        self.push(text);
        Ok(())
    }

    fn write_line(&self, text: &str) -> io::Result<()> {
        self.push(text);
        self.push("\n");
        Ok(())
    }

    fn key_available(&self) -> io::Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(state
            .keys
            .front()
            .is_some_and(|(at, _)| *at <= Instant::now()))
    }

    fn read_key(&self) -> io::Result<Key> {
        let mut state = self.state.lock().unwrap();
        match state.keys.pop_front() {
            Some((_, key)) => {
                state.keys_read += 1;
                Ok(key)
            }
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no more scripted keys",
            )),
        }
    }

    fn read_line(&self) -> io::Result<String> {
        self.state
            .lock()
            .unwrap()
            .lines
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more scripted lines"))
    }

    fn clear(&self) -> io::Result<()> {
        self.state.lock().unwrap().screens.push(String::new());
        Ok(())
    }

    fn colors(&self) -> (Color, Color) {
        self.state.lock().unwrap().colors
    }

    fn apply_colors(&self, foreground: Color, background: Color) -> io::Result<()> {
        self.state.lock().unwrap().colors = (foreground, background);
        Ok(())
    }

    fn set_cursor_visible(&self, visible: bool) -> io::Result<()> {
        self.state.lock().unwrap().cursor_visible = visible;
        Ok(())
    }

    fn move_to_column(&self, _column: u16) -> io::Result<()> {
        self.push("\r");
        Ok(())
    }

    fn buffer_width(&self) -> u16 {
        self.width
    }

    fn window_height(&self) -> u16 {
        self.height
    }
}

/// Default settings; the timings match the documented defaults.
pub fn test_settings() -> Settings {
    Settings::default()
}
