//! # Items
//!
//! An item is either a leaf action or a whole menu. Items are cheap to clone
//! (titles plus `Arc`s) because pages hand out copies of cached items.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::core::error::{MenuError, Result};
use crate::menu::Menu;
use crate::tui::context::RunContext;

/// The body of an action. Receives the per-iteration context and may suspend.
pub type ActionFn =
    Arc<dyn for<'a> Fn(&'a mut RunContext) -> BoxFuture<'a, Result<()>> + Send + Sync>;

#[derive(Clone)]
pub struct Action {
    title: String,
    highlighted: bool,
    /// Rendered with the sub-menu marker even though it is a plain action.
    opens_menu: bool,
    run: ActionFn,
}

#[derive(Clone)]
pub enum Item {
    Action(Action),
    Menu(Arc<dyn Menu>),
}

impl Item {
    /// A leaf item running `run` when chosen.
    ///
    /// ```ignore
    /// Item::action("Greet", |ctx| Box::pin(async move {
    ///     ctx.ui().info("Hello!");
    ///     Ok(())
    /// }))
    /// ```
    pub fn action<F>(title: impl Into<String>, run: F) -> Self
    where
        F: for<'a> Fn(&'a mut RunContext) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
    {
        Item::Action(Action {
            title: title.into(),
            highlighted: false,
            opens_menu: false,
            run: Arc::new(run),
        })
    }

    pub fn menu(menu: Arc<dyn Menu>) -> Self {
        Item::Menu(menu)
    }

    /// An item that builds a fresh menu each time it is chosen and runs it.
    pub fn submenu<F>(title: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Menu> + Send + Sync + 'static,
    {
        let item = Item::action(title, move |ctx| {
            let menu = factory();
            ctx.run(menu)
        });
        match item {
            Item::Action(action) => Item::Action(Action {
                opens_menu: true,
                ..action
            }),
            other => other,
        }
    }

    /// Asks for confirmation; answering "no" aborts with `UserCancelled`.
    pub fn confirm(title: impl Into<String>, message: impl Into<String>) -> Self {
        let message: Arc<str> = message.into().into();
        Item::action(title, move |ctx| {
            let message = message.clone();
            Box::pin(async move {
                if ctx.ui().confirm(&message, false).await? {
                    Ok(())
                } else {
                    Err(MenuError::user_cancelled())
                }
            })
        })
    }

    /// Runs `items` one after another under the same context, stopping at the
    /// first failure.
    pub fn sequence(title: impl Into<String>, items: Vec<Item>) -> Self {
        let items = Arc::new(items);
        Item::action(title, move |ctx| {
            let items = items.clone();
            Box::pin(async move {
                for item in items.iter() {
                    item.execute(ctx).await?;
                }
                Ok(())
            })
        })
    }

    /// Marks an action to be drawn in bright white. Menus carry their own flag.
    pub fn highlighted(self) -> Self {
        match self {
            Item::Action(action) => Item::Action(Action {
                highlighted: true,
                ..action
            }),
            other => other,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Item::Action(action) => &action.title,
            Item::Menu(menu) => menu.title(),
        }
    }

    pub fn is_highlighted(&self) -> bool {
        match self {
            Item::Action(action) => action.highlighted,
            Item::Menu(menu) => menu.is_highlighted(),
        }
    }

    /// True if choosing this item leads into another menu.
    pub fn opens_menu(&self) -> bool {
        match self {
            Item::Action(action) => action.opens_menu,
            Item::Menu(_) => true,
        }
    }

    pub fn execute<'a>(&'a self, ctx: &'a mut RunContext) -> BoxFuture<'a, Result<()>> {
        match self {
            Item::Action(action) => (action.run)(ctx),
            Item::Menu(menu) => ctx.run(menu.clone()),
        }
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Action(action) => f.debug_tuple("Action").field(&action.title).finish(),
            Item::Menu(menu) => f.debug_tuple("Menu").field(&menu.title()).finish(),
        }
    }
}
