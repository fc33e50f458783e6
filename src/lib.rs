//! conmenu: keyboard-driven terminal menus over lazily loaded items.
//!
//! ```ignore
//! let menu = MenuBuilder::new("Main")
//!     .action("Greet", |ctx| Box::pin(async move {
//!         ctx.ui().info("Hello!");
//!         Ok(())
//!     }))
//!     .build();
//!
//! MenuRunner::new(Arc::new(CrosstermTerminal::new()), Settings::default())
//!     .run(menu)
//!     .await?;
//! ```

pub mod core;
pub mod menu;
pub mod tui;

#[cfg(test)]
pub mod test_support;

pub use crate::core::config::Settings;
pub use crate::core::error::{BoxError, MenuError, Result};
pub use crate::core::page::{Page, PageBuffer, Source};
pub use crate::core::race::run_until_cancelled;
pub use crate::menu::{Item, ItemSource, Menu, MenuBuilder, SimpleMenu};
pub use crate::tui::{MenuRunner, RunContext, UserInterface};
