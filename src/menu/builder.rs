//! Explicit registration API for menus.
//!
//! ```ignore
//! let main = MenuBuilder::new("Main")
//!     .action("Do stuff", |ctx| Box::pin(async move {
//!         ctx.ui().info("Doing stuff...");
//!         Ok(())
//!     }))
//!     .submenu("Choose", choice_menu)
//!     .build();
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};

use crate::core::error::{BoxError, Result};
use crate::menu::{Item, ItemSource, Menu};
use crate::tui::context::RunContext;

type SourceFn = Arc<dyn Fn() -> ItemSource + Send + Sync>;
type EnterFn = Arc<dyn for<'a> Fn(&'a mut RunContext) -> BoxFuture<'a, Result<()>> + Send + Sync>;
type CanExitFn = Arc<dyn for<'a> Fn(&'a mut RunContext) -> BoxFuture<'a, bool> + Send + Sync>;

/// A menu assembled by [`MenuBuilder`]: fixed items first, then the lazy
/// source if one was given.
pub struct SimpleMenu {
    title: String,
    description: Option<String>,
    highlighted: bool,
    execute_if_single_item: bool,
    should_exit: bool,
    items: Vec<Item>,
    source: Option<SourceFn>,
    on_enter: Option<EnterFn>,
    can_exit: Option<CanExitFn>,
}

#[async_trait]
impl Menu for SimpleMenu {
    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    fn execute_if_single_item(&self) -> bool {
        self.execute_if_single_item
    }

    fn should_exit(&self) -> bool {
        self.should_exit
    }

    fn items(&self) -> ItemSource {
        let fixed = stream::iter(self.items.clone().into_iter().map(Ok));
        match &self.source {
            Some(source) => fixed.chain(source()).boxed(),
            None => fixed.boxed(),
        }
    }

    async fn enter(&self, ctx: &mut RunContext) -> Result<()> {
        match &self.on_enter {
            Some(hook) => hook(ctx).await,
            None => Ok(()),
        }
    }

    async fn can_exit(&self, ctx: &mut RunContext) -> bool {
        match &self.can_exit {
            Some(hook) => hook(ctx).await,
            None => true,
        }
    }
}

pub struct MenuBuilder {
    menu: SimpleMenu,
}

impl MenuBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            menu: SimpleMenu {
                title: title.into(),
                description: None,
                highlighted: false,
                execute_if_single_item: false,
                should_exit: false,
                items: Vec::new(),
                source: None,
                on_enter: None,
                can_exit: None,
            },
        }
    }

    /// Shown under the title; may span several lines.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.menu.description = Some(description.into());
        self
    }

    pub fn highlighted(mut self) -> Self {
        self.menu.highlighted = true;
        self
    }

    pub fn execute_if_single_item(mut self, enabled: bool) -> Self {
        self.menu.execute_if_single_item = enabled;
        self
    }

    /// Leave the menu after the first executed item.
    pub fn exit_after_choice(mut self, enabled: bool) -> Self {
        self.menu.should_exit = enabled;
        self
    }

    pub fn item(mut self, item: Item) -> Self {
        self.menu.items.push(item);
        self
    }

    pub fn action<F>(self, title: impl Into<String>, run: F) -> Self
    where
        F: for<'a> Fn(&'a mut RunContext) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
    {
        self.item(Item::action(title, run))
    }

    pub fn submenu<F>(self, title: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Menu> + Send + Sync + 'static,
    {
        self.item(Item::submenu(title, factory))
    }

    pub fn menu(self, menu: Arc<dyn Menu>) -> Self {
        self.item(Item::menu(menu))
    }

    /// Appends a lazy source after the fixed items. `source` is called again
    /// for every visit and every invalidation.
    pub fn items_from<F>(mut self, source: F) -> Self
    where
        F: Fn() -> ItemSource + Send + Sync + 'static,
    {
        self.menu.source = Some(Arc::new(source));
        self
    }

    /// Appends items produced by one async call. The call is deferred until
    /// the first page is loaded, so it is raced against the loading watcher
    /// and repeated after invalidation.
    pub fn load_with<F, Fut>(self, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Vec<Item>, BoxError>> + Send + 'static,
    {
        self.items_from(move || {
            stream::once(loader())
                .flat_map(|loaded| {
                    let items: Vec<std::result::Result<Item, BoxError>> = match loaded {
                        Ok(items) => items.into_iter().map(Ok).collect(),
                        Err(e) => vec![Err(e)],
                    };
                    stream::iter(items)
                })
                .boxed()
        })
    }

    pub fn on_enter<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a mut RunContext) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
    {
        self.menu.on_enter = Some(Arc::new(hook));
        self
    }

    pub fn can_exit<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a mut RunContext) -> BoxFuture<'a, bool> + Send + Sync + 'static,
    {
        self.menu.can_exit = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Arc<SimpleMenu> {
        Arc::new(self.menu)
    }
}
