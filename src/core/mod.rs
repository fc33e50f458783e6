//! # Core Engine
//!
//! The terminal-agnostic half of conmenu: pagination over lazy sources,
//! the cancel race, the error taxonomy and settings.
//! Nothing in here reads a key or writes a byte to the screen.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • PageBuffer / Page    │
//!                    │  • run_until_cancelled  │
//!                    │  • MenuError            │
//!                    │  • Settings             │
//!                    └───────────┬─────────────┘
//!                                │
//!                    ┌───────────┴───────────┐
//!                    ▼                       ▼
//!             ┌────────────┐          ┌────────────┐
//!             │    menu    │          │    TUI     │
//!             │ (Item/Menu │          │  (runner,  │
//!             │  builder)  │          │ crossterm) │
//!             └────────────┘          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`page`]: `PageBuffer` turns a lazy stream into cached pages
//! - [`race`]: `run_until_cancelled` races an op against a cancel watcher
//! - [`error`]: `MenuError` and the crate-wide `Result`
//! - [`config`]: `Settings` resolution from file, env and CLI

pub mod config;
pub mod error;
pub mod page;
pub mod race;
