//! # Menus
//!
//! The declarative side: what a menu shows and what its items do.
//!
//! ```text
//! Item
//! ├── Action(title, fn(&mut RunContext))    // leaf
//! └── Menu(Arc<dyn Menu>)                   // nested menu, itself an item
//!         ├── title / description
//!         ├── items()  → lazy stream of Item
//!         ├── enter()  → once per visit
//!         └── can_exit() → consulted on Esc
//! ```
//!
//! Implement [`Menu`] directly for full control, or assemble one with
//! [`MenuBuilder`].

mod builder;
mod item;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::core::page::Source;
use crate::tui::context::RunContext;

pub use builder::{MenuBuilder, SimpleMenu};
pub use item::{Action, ActionFn, Item};

/// A lazy sequence of menu items.
pub type ItemSource = Source<Item>;

#[async_trait]
pub trait Menu: Send + Sync {
    fn title(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }

    fn is_highlighted(&self) -> bool {
        false
    }

    /// If the menu turns out to hold exactly one item, run it instead of
    /// showing the menu.
    fn execute_if_single_item(&self) -> bool {
        false
    }

    /// Checked after each executed item; true leaves the menu.
    fn should_exit(&self) -> bool {
        false
    }

    /// A fresh source over this menu's items. Called on every visit and again
    /// whenever an action invalidates the menu.
    fn items(&self) -> ItemSource;

    /// Runs once each time the menu is entered, before the first page loads.
    async fn enter(&self, _ctx: &mut RunContext) -> Result<()> {
        Ok(())
    }

    /// Asked when the user presses Esc. Returning false keeps the menu open.
    async fn can_exit(&self, _ctx: &mut RunContext) -> bool {
        true
    }
}
