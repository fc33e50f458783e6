//! # Terminal Surface
//!
//! The narrow set of primitives the engine needs from a terminal. Everything
//! else (menus, prompts, progress bars) is built on top of this trait, so
//! tests can swap in a scripted terminal and keep real timing semantics.
//!
//! All methods take `&self`: the surface is shared between the main flow and
//! background tasks (the progress animation, the loading watcher).

use std::collections::VecDeque;
use std::io::{self, Write, stdout};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, MoveToColumn, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, disable_raw_mode, enable_raw_mode};
use crossterm::{execute, queue};
use log::{debug, info};

/// A single keypress as seen by the input dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Char(char),
    /// Arrows, function keys and anything else without a character.
    Other,
}

impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        match event.code {
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Char(c) => Key::Char(c),
            _ => Key::Other,
        }
    }
}

pub trait Terminal: Send + Sync {
    fn write(&self, text: &str) -> io::Result<()>;

    fn write_line(&self, text: &str) -> io::Result<()>;

    /// True if a key can be read without blocking.
    fn key_available(&self) -> io::Result<bool>;

    /// Reads the next key, blocking until one arrives.
    fn read_key(&self) -> io::Result<Key>;

    /// Reads a full line of text with echo.
    fn read_line(&self) -> io::Result<String>;

    fn clear(&self) -> io::Result<()>;

    /// Current (foreground, background) colours.
    fn colors(&self) -> (Color, Color);

    fn apply_colors(&self, foreground: Color, background: Color) -> io::Result<()>;

    fn set_cursor_visible(&self, visible: bool) -> io::Result<()>;

    fn move_to_column(&self, column: u16) -> io::Result<()>;

    fn buffer_width(&self) -> u16;

    fn window_height(&self) -> u16;
}

/// Applies colours for as long as it lives, restoring the previous ones on drop.
pub struct ColorScope<'a> {
    terminal: &'a dyn Terminal,
    previous: (Color, Color),
}

impl<'a> ColorScope<'a> {
    /// Sets the foreground and, if given, the background colour.
    pub fn new(terminal: &'a dyn Terminal, foreground: Color, background: Option<Color>) -> Self {
        let previous = terminal.colors();
        let _ = terminal.apply_colors(foreground, background.unwrap_or(previous.1));
        Self { terminal, previous }
    }
}

impl Drop for ColorScope<'_> {
    fn drop(&mut self) {
        let _ = self.terminal.apply_colors(self.previous.0, self.previous.1);
    }
}

/// Terminal backed by the process's stdin/stdout through crossterm.
///
/// Expects raw mode (see [`RawModeGuard`]) so keys arrive unbuffered and
/// unechoed; lines therefore end in `\r\n`.
pub struct CrosstermTerminal {
    /// Keys seen while answering `key_available`, not yet handed out.
    pending: Mutex<VecDeque<Key>>,
    colors: Mutex<(Color, Color)>,
}

impl CrosstermTerminal {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            colors: Mutex::new((Color::Reset, Color::Reset)),
        }
    }
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads one event if it is a key press, dropping releases, resizes and mouse events.
fn read_key_press() -> io::Result<Option<Key>> {
    match event::read()? {
        Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
            debug!("Key event: {:?} with modifiers {:?}", key_event.code, key_event.modifiers);
            Ok(Some(key_event.into()))
        }
        _ => Ok(None),
    }
}

impl Terminal for CrosstermTerminal {
    fn write(&self, text: &str) -> io::Result<()> {
        let mut out = stdout();
        queue!(out, Print(text))?;
        out.flush()
    }

    fn write_line(&self, text: &str) -> io::Result<()> {
        let mut out = stdout();
        queue!(out, Print(text), Print("\r\n"))?;
        out.flush()
    }

    fn key_available(&self) -> io::Result<bool> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if !pending.is_empty() {
            return Ok(true);
        }
        while event::poll(Duration::ZERO)? {
            if let Some(key) = read_key_press()? {
                pending.push_back(key);
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn read_key(&self) -> io::Result<Key> {
        if let Some(key) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
        {
            return Ok(key);
        }
        loop {
            if let Some(key) = read_key_press()? {
                return Ok(key);
            }
        }
    }

    fn read_line(&self) -> io::Result<String> {
        // Line editing needs the terminal's cooked mode for the duration of the read.
        let raw = terminal::is_raw_mode_enabled()?;
        if raw {
            disable_raw_mode()?;
        }
        let mut line = String::new();
        let read = io::stdin().read_line(&mut line);
        if raw {
            enable_raw_mode()?;
        }
        read?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn clear(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0))
    }

    fn colors(&self) -> (Color, Color) {
        *self.colors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply_colors(&self, foreground: Color, background: Color) -> io::Result<()> {
        *self.colors.lock().unwrap_or_else(PoisonError::into_inner) = (foreground, background);
        execute!(
            stdout(),
            SetForegroundColor(foreground),
            SetBackgroundColor(background)
        )
    }

    fn set_cursor_visible(&self, visible: bool) -> io::Result<()> {
        if visible {
            execute!(stdout(), Show)
        } else {
            execute!(stdout(), Hide)
        }
    }

    fn move_to_column(&self, column: u16) -> io::Result<()> {
        execute!(stdout(), MoveToColumn(column))
    }

    fn buffer_width(&self) -> u16 {
        terminal::size().map(|(w, _)| w).unwrap_or(80)
    }

    fn window_height(&self) -> u16 {
        terminal::size().map(|(_, h)| h).unwrap_or(24)
    }
}

/// Puts the terminal in raw mode and restores it on drop, whatever the exit path.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        info!("Terminal raw mode enabled");
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), ResetColor, Show);
        let _ = disable_raw_mode();
    }
}
