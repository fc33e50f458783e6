//! # Input Dispatcher
//!
//! Every interactive decision (menu choice, y/n/a confirmation, "press Esc to
//! cancel") goes through [`select`]. It polls for keys, drops accidental
//! bursts, classifies the key and lets the caller's validator decide whether
//! that key answers the prompt.
//!
//! ```text
//!  no key ──▶ sleep(poll) ──▶ (cancel? → Err(Cancelled))
//!  key ──▶ sleep(debounce) ──▶ another key? ──▶ drain all, start over
//!                          └─▶ classify ──▶ validate ──▶ Some(v) → return v
//!                                                    └─▶ None    → keep polling
//! ```

use std::time::Duration;

use log::debug;
use tokio_util::sync::CancellationToken;

use crate::core::error::{MenuError, Result};
use crate::tui::terminal::{Key, Terminal};

/// The classified outcome of one keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Cancel,
    Accept,
    /// The raw character, case preserved. Validators lowercase it when comparing.
    Character(char),
}

impl Selection {
    fn classify(key: Key) -> Option<Self> {
        match key {
            Key::Escape => Some(Selection::Cancel),
            Key::Enter => Some(Selection::Accept),
            Key::Char(c) => Some(Selection::Character(c)),
            Key::Other => None,
        }
    }

    /// The lowercased character, if this is a character selection.
    pub fn lowercase(&self) -> Option<char> {
        match self {
            Selection::Character(c) => c.to_lowercase().next(),
            _ => None,
        }
    }
}

/// Poll and debounce timings for [`select`].
#[derive(Debug, Clone, Copy)]
pub struct InputTimings {
    pub poll_interval: Duration,
    pub debounce: Duration,
}

/// Writes `prompt` (if any) and waits until a key passes `validate`.
///
/// The validator returns `Some(value)` to accept a selection. An accepted
/// character is echoed, followed by a blank line, when a prompt was shown.
/// Fails with `Cancelled` once `cancel` fires.
pub async fn select<T, F>(
    terminal: &dyn Terminal,
    timings: InputTimings,
    prompt: Option<&str>,
    mut validate: F,
    cancel: &CancellationToken,
) -> Result<T>
where
    F: FnMut(Selection) -> Option<T>,
{
    if let Some(text) = prompt {
        terminal.write(text)?;
    }

    while !cancel.is_cancelled() {
        if !terminal.key_available()? {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(timings.poll_interval) => {}
            }
            continue;
        }

        let key = terminal.read_key()?;

        // A second key this soon means the first was probably a slip.
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(timings.debounce) => {}
        }
        if terminal.key_available()? {
            let mut discarded = 1;
            while !cancel.is_cancelled() && terminal.key_available()? {
                terminal.read_key()?;
                discarded += 1;
            }
            debug!("Discarded a burst of {} keys", discarded);
            continue;
        }

        let Some(selection) = Selection::classify(key) else {
            continue;
        };

        if let Some(value) = validate(selection) {
            if let (Selection::Character(c), Some(_)) = (selection, prompt) {
                terminal.write_line(&c.to_string())?;
                terminal.write_line("")?;
            }
            return Ok(value);
        }
    }

    Err(MenuError::Cancelled)
}

/// Blocks until Enter or Escape is pressed, ignoring every other key.
///
/// Used for the "press a key to continue" pause, which deliberately skips the
/// debounce and validation of [`select`].
pub async fn wait_for_dismiss(terminal: &dyn Terminal, poll_interval: Duration) -> Result<()> {
    loop {
        while terminal.key_available()? {
            if matches!(terminal.read_key()?, Key::Enter | Key::Escape) {
                return Ok(());
            }
        }
        tokio::time::sleep(poll_interval).await;
    }
}
