//! # User Interface
//!
//! The facade actions talk to: confirmations, free-text prompts, coloured
//! status lines, progress bars and the "press Esc to cancel" race.
//!
//! Each run-loop instance owns one `UserInterface`. Clones share its
//! "yes to all" flag, so an answer of `a` covers the rest of the current
//! render cycle in that menu and nowhere else.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::style::Color;
use log::{debug, error, info, warn};
use tokio_util::sync::CancellationToken;

use crate::core::config::Settings;
use crate::core::error::{MenuError, Result};
use crate::core::race;
use crate::tui::input::{self, InputTimings, Selection};
use crate::tui::progress::ProgressIndicator;
use crate::tui::terminal::{ColorScope, Terminal};

#[derive(Clone)]
pub struct UserInterface {
    terminal: Arc<dyn Terminal>,
    settings: Arc<Settings>,
    yes_to_all: Arc<AtomicBool>,
}

impl UserInterface {
    pub fn new(terminal: Arc<dyn Terminal>, settings: Settings) -> Self {
        Self::shared(terminal, Arc::new(settings))
    }

    pub(crate) fn shared(terminal: Arc<dyn Terminal>, settings: Arc<Settings>) -> Self {
        Self {
            terminal,
            settings,
            yes_to_all: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn reset_yes_to_all(&self) {
        self.yes_to_all.store(false, Ordering::SeqCst);
    }

    pub fn input_timings(&self) -> InputTimings {
        InputTimings {
            poll_interval: self.settings.poll_interval,
            debounce: self.settings.debounce,
        }
    }

    /// Asks a yes/no question. Escape counts as "no".
    ///
    /// Unless `force` is set, the user may also answer `a` (yes to all), after
    /// which later confirmations return true without asking until the menu is
    /// drawn again.
    pub async fn confirm(&self, message: &str, force: bool) -> Result<bool> {
        if !force && self.yes_to_all.load(Ordering::SeqCst) {
            debug!("Auto-confirming '{}'", message);
            return Ok(true);
        }

        let _colors = ColorScope::new(self.terminal.as_ref(), Color::Yellow, None);
        self.terminal.write_line("")?;

        let question = message.trim_end_matches([' ', '?']);
        let (choices, accepted) = if force { ("y/n", "yn") } else { ("y/n/a", "yna") };
        let prompt = format!("{question} ({choices}) ? ");

        let answer = self
            .select(
                Some(&prompt),
                |selection| match selection {
                    Selection::Cancel => Some('n'),
                    other => other.lowercase().filter(|c| accepted.contains(*c)),
                },
                &CancellationToken::new(),
            )
            .await?;

        if !force {
            self.yes_to_all.store(answer == 'a', Ordering::SeqCst);
        }
        debug!("Confirmation '{}' answered '{}'", question, answer);
        Ok(answer != 'n')
    }

    /// Reads one line of free text.
    pub async fn prompt(&self, message: &str) -> Result<String> {
        {
            let _colors = ColorScope::new(self.terminal.as_ref(), Color::Yellow, None);
            self.terminal.write(message)?;
        }
        let _colors = ColorScope::new(self.terminal.as_ref(), Color::White, None);
        let terminal = self.terminal.clone();
        let line = tokio::task::spawn_blocking(move || terminal.read_line())
            .await
            .map_err(|e| MenuError::Io(io::Error::other(e)))??;
        Ok(line)
    }

    pub fn debug(&self, message: &str) {
        debug!("{}", message);
        self.print_line(Color::Grey, message);
    }

    pub fn info(&self, message: &str) {
        info!("{}", message);
        self.print_line(Color::Green, message);
    }

    pub fn warning(&self, message: &str) {
        warn!("{}", message);
        self.print_line(Color::Magenta, message);
    }

    pub fn error(&self, message: &str) {
        error!("{}", message);
        self.print_line(Color::Red, message);
    }

    fn print_line(&self, color: Color, message: &str) {
        let _colors = ColorScope::new(self.terminal.as_ref(), color, None);
        if let Err(e) = self.terminal.write_line(message) {
            warn!("Failed to write status line: {}", e);
        }
    }

    /// Draws a progress bar on the current line. See [`ProgressIndicator`].
    pub fn start_progress(&self, label: &str) -> Result<ProgressIndicator> {
        ProgressIndicator::start(self.terminal.clone(), label, self.settings.animation_tick)
    }

    /// The input dispatcher with this interface's timings.
    pub async fn select<T, F>(
        &self,
        prompt: Option<&str>,
        validate: F,
        cancel: &CancellationToken,
    ) -> Result<T>
    where
        F: FnMut(Selection) -> Option<T>,
    {
        input::select(self.terminal.as_ref(), self.input_timings(), prompt, validate, cancel).await
    }

    /// Runs `op` until it finishes or the user presses Esc, whichever comes
    /// first. On Esc the token passed to `op` fires and its result (typically
    /// partial or empty) is returned once it winds down.
    pub async fn run_until_cancelled<T, Op, Fut>(&self, op: Op) -> T
    where
        Op: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = T>,
    {
        race::run_until_cancelled(op, |token| async move {
            let pressed = self
                .select(None, |s| (s == Selection::Cancel).then_some(()), &token)
                .await;
            match pressed {
                Ok(()) => info!("Background operation cancelled by the user"),
                Err(MenuError::Cancelled) => {}
                Err(e) => {
                    warn!("Cancel watcher stopped: {}", e);
                    token.cancelled().await;
                }
            }
        })
        .await
    }
}
