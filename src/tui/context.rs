//! Per-iteration state handed to actions and menu hooks.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::core::error::Result;
use crate::menu::Menu;
use crate::tui::runner::MenuRunner;
use crate::tui::ui::UserInterface;

/// Created fresh for every executed item (and for the enter/exit hooks).
///
/// Whatever an action records here (pause suppression, invalidation, exit)
/// is read by the run loop once the action returns, then the context is
/// dropped.
pub struct RunContext {
    runner: MenuRunner,
    path: Vec<Arc<dyn Menu>>,
    ui: UserInterface,
    /// `None` until something decides; an undecided context pauses.
    should_pause: Option<bool>,
    menu_invalidated: bool,
    exit_requested: bool,
}

impl RunContext {
    pub(crate) fn new(runner: MenuRunner, path: Vec<Arc<dyn Menu>>, ui: UserInterface) -> Self {
        Self {
            runner,
            path,
            ui,
            should_pause: None,
            menu_invalidated: false,
            exit_requested: false,
        }
    }

    pub fn ui(&self) -> &UserInterface {
        &self.ui
    }

    /// Menus from the root down to the one being run.
    pub fn path(&self) -> &[Arc<dyn Menu>] {
        &self.path
    }

    /// Skips the "Press [Enter] to continue" pause after this action.
    pub fn suppress_pause(&mut self) {
        self.should_pause = Some(false);
    }

    /// Rebuilds the current menu's items once this action returns.
    pub fn invalidate_menu(&mut self) {
        self.menu_invalidated = true;
    }

    /// Leaves the current menu once this action returns, as if the user had
    /// pressed Esc and the menu agreed.
    pub fn exit_menu(&mut self) {
        self.exit_requested = true;
    }

    /// Runs `menu` as a child of the current one and returns when the user
    /// leaves it. Unless the action already decided otherwise, no pause
    /// follows a nested menu.
    pub fn run(&mut self, menu: Arc<dyn Menu>) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut path = self.path.clone();
            path.push(menu);
            self.runner.run_path(path).await?;
            if self.should_pause.is_none() {
                self.should_pause = Some(false);
            }
            Ok(())
        })
    }

    /// Shorthand for [`UserInterface::run_until_cancelled`].
    pub async fn run_until_cancelled<T, Op, Fut>(&self, op: Op) -> T
    where
        Op: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = T>,
    {
        self.ui.run_until_cancelled(op).await
    }

    pub fn should_pause(&self) -> bool {
        self.should_pause.unwrap_or(true)
    }

    pub fn is_menu_invalidated(&self) -> bool {
        self.menu_invalidated
    }

    pub fn is_exit_requested(&self) -> bool {
        self.exit_requested
    }
}
