//! # Progress Indicator
//!
//! A one-line bar that is either determinate (a 0-100 value) or
//! indeterminate (a highlight window bouncing across the label). The
//! indeterminate mode runs as a background task; any other update stops that
//! task and waits for it first, so two renderers never race on the line.
//!
//! Call [`ProgressIndicator::finish`] when done. Dropping an unfinished
//! indicator still stops the animation and restores the cursor, but cannot
//! wait for the task to wind down.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::style::Color;
use log::debug;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::error::Result;
use crate::tui::terminal::{ColorScope, Terminal};

const HIGHLIGHT_WIDTH: u8 = 10;
const HIGHLIGHT_LIMIT: u8 = 90;

struct Animation {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct ProgressIndicator {
    terminal: Arc<dyn Terminal>,
    label: String,
    tick: Duration,
    animation: Option<Animation>,
    finished: bool,
}

impl ProgressIndicator {
    /// Hides the cursor and draws an empty bar at 0 %.
    pub fn start(terminal: Arc<dyn Terminal>, label: &str, tick: Duration) -> Result<Self> {
        terminal.set_cursor_visible(false)?;
        let indicator = Self {
            terminal,
            label: label.to_string(),
            tick,
            animation: None,
            finished: false,
        };
        indicator.render_value(0)?;
        Ok(indicator)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_indeterminate(&self) -> bool {
        self.animation.is_some()
    }

    /// Switches to determinate mode and shows `percentage` (clamped to 100).
    pub async fn set_progress(&mut self, percentage: u8) -> Result<()> {
        self.stop_animation().await;
        self.render_value(percentage.min(100))
    }

    pub async fn set_progress_with_label(&mut self, percentage: u8, label: &str) -> Result<()> {
        self.label = label.to_string();
        self.set_progress(percentage).await
    }

    /// Starts the bouncing animation. A no-op if it is already running.
    pub fn set_indeterminate(&mut self) {
        if self.animation.is_some() {
            return;
        }
        let token = CancellationToken::new();
        let handle = tokio::spawn(animate(
            self.terminal.clone(),
            self.label.clone(),
            self.tick,
            token.clone(),
        ));
        self.animation = Some(Animation { token, handle });
    }

    /// Restarts the animation with a new label.
    pub async fn set_indeterminate_with_label(&mut self, label: &str) {
        self.stop_animation().await;
        self.label = label.to_string();
        self.set_indeterminate();
    }

    /// Stops any animation and shows an empty bar.
    pub async fn clear(&mut self) -> Result<()> {
        self.stop_animation().await;
        render_bar(self.terminal.as_ref(), &self.label, 0, 0)?;
        Ok(())
    }

    pub async fn clear_with_label(&mut self, label: &str) -> Result<()> {
        self.label = label.to_string();
        self.clear().await
    }

    /// Stops the animation, waits for it, and restores the cursor.
    pub async fn finish(mut self) {
        self.stop_animation().await;
        self.restore();
    }

    async fn stop_animation(&mut self) {
        if let Some(animation) = self.animation.take() {
            animation.token.cancel();
            if let Err(e) = animation.handle.await {
                debug!("Progress animation ended abnormally: {}", e);
            }
        }
    }

    fn render_value(&self, percentage: u8) -> Result<()> {
        let text = format!("{} {} %", self.label, percentage);
        render_bar(self.terminal.as_ref(), &text, 0, percentage)?;
        Ok(())
    }

    fn restore(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        let _ = self.terminal.set_cursor_visible(true);
        let _ = self.terminal.write_line("");
    }
}

impl Drop for ProgressIndicator {
    fn drop(&mut self) {
        if let Some(animation) = self.animation.take() {
            animation.token.cancel();
            animation.handle.abort();
        }
        self.restore();
    }
}

/// Position of the highlight window, bouncing between 0 % and 90 %.
#[derive(Debug)]
struct Bounce {
    position: u8,
    forward: bool,
}

impl Default for Bounce {
    fn default() -> Self {
        Self {
            position: 0,
            forward: true,
        }
    }
}

impl Bounce {
    /// Returns the current (start, end) window and moves one step.
    fn advance(&mut self) -> (u8, u8) {
        let window = (self.position, self.position + HIGHLIGHT_WIDTH);
        if self.forward {
            self.position += 1;
        } else {
            self.position -= 1;
        }
        if self.position == 0 || self.position == HIGHLIGHT_LIMIT {
            self.forward = !self.forward;
        }
        window
    }
}

async fn animate(
    terminal: Arc<dyn Terminal>,
    label: String,
    tick: Duration,
    token: CancellationToken,
) {
    let mut bounce = Bounce::default();
    while !token.is_cancelled() {
        let (start, end) = bounce.advance();
        if let Err(e) = render_bar(terminal.as_ref(), &label, start, end) {
            debug!("Stopping progress animation: {}", e);
            break;
        }
        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(tick) => {}
        }
    }
}

/// Draws `label` across the line with the `start..end` percent span highlighted.
fn render_bar(terminal: &dyn Terminal, label: &str, start: u8, end: u8) -> io::Result<()> {
    terminal.move_to_column(1)?;

    let width = terminal.buffer_width().saturating_sub(2) as usize;
    let mut text: Vec<char> = format!("   {label}").chars().take(width).collect();
    text.resize(width, ' ');

    let len = text.len();
    let split = |percentage: u8| ((percentage as f64 * len as f64) / 100.0).round() as usize;
    let left = split(start).min(len);
    let right = split(end).clamp(left, len);

    let segment = |range: std::ops::Range<usize>| text[range].iter().collect::<String>();

    {
        let _colors = ColorScope::new(terminal, Color::Black, Some(Color::Grey));
        terminal.write(&segment(0..left))?;
    }
    {
        let _colors = ColorScope::new(terminal, Color::Black, Some(Color::White));
        terminal.write(&segment(left..right))?;
    }
    {
        let _colors = ColorScope::new(terminal, Color::Black, Some(Color::Grey));
        terminal.write(&segment(right..len))?;
    }
    Ok(())
}
