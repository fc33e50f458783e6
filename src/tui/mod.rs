//! # Terminal Layer
//!
//! Everything that reads a key or writes to the screen. The run loop lives
//! here because it is mostly about the terminal: rendering pages, prompting,
//! showing the loading indicator and pausing after actions.
//!
//! ```text
//!   MenuRunner ──▶ render   (page → screen)
//!       │     ├──▶ input    (keys → Selection, debounced)
//!       │     └──▶ progress (loading indicator)
//!       ▼
//!   RunContext ──▶ UserInterface (confirm, prompt, status lines, races)
//!       │
//!   Terminal (trait) ◀── CrosstermTerminal | ScriptedTerminal (tests)
//! ```
//!
//! Nothing outside this module touches crossterm, except for `Color` values
//! passed through the [`Terminal`] trait.

pub mod context;
pub mod input;
pub mod progress;
pub mod render;
pub mod runner;
pub mod terminal;
pub mod ui;

pub use context::RunContext;
pub use input::{InputTimings, Selection};
pub use progress::ProgressIndicator;
pub use runner::{MenuChoice, MenuRunner};
pub use terminal::{CrosstermTerminal, Key, RawModeGuard, Terminal};
pub use ui::UserInterface;
