//! # Menu Run Loop
//!
//! ```text
//!   Entering ──▶ Loading ──▶ Prompting ──┬─ Esc ─▶ can_exit? ─┬─ yes ─▶ Exiting
//!                  ▲                     │                    └─ no ──▶ Loading
//!                  │                     ├─ < / > ─▶ Paging ──▶ Loading
//!                  │                     └─ glyph ─▶ Executing
//!                  └─── (should_exit or exit_menu? ─▶ Exiting) ◀──┘
//! ```
//!
//! Loading races the page fetch against a watcher that, once the grace
//! period has passed, shows "Loading..." and lets Esc abort the fetch.
//! Executing an item that is a menu recurses through [`RunContext::run`];
//! the parent's page buffer is left untouched while the child runs.

use std::error::Error;
use std::sync::Arc;

use futures::future::BoxFuture;
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::core::config::Settings;
use crate::core::error::{MenuError, Result};
use crate::core::page::{Page, PageBuffer};
use crate::core::race;
use crate::menu::{Item, Menu};
use crate::tui::context::RunContext;
use crate::tui::input::{self, Selection};
use crate::tui::progress::ProgressIndicator;
use crate::tui::render::{self, MenuView};
use crate::tui::terminal::Terminal;
use crate::tui::ui::UserInterface;

const PROMPT: &str = "Pick an option or press [Esc] to exit: ";
const LOADING_LABEL: &str = "Loading... Press [Esc] to cancel";
const PAUSE_PROMPT: &str = "Press [Enter] to continue... ";

/// What the user picked at the menu prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Cancel,
    PreviousPage,
    NextPage,
    /// In-page index of the chosen item.
    Item(usize),
}

/// Drives menus on one terminal. Cheap to clone; nested menus run on a clone.
#[derive(Clone)]
pub struct MenuRunner {
    terminal: Arc<dyn Terminal>,
    settings: Arc<Settings>,
}

impl MenuRunner {
    pub fn new(terminal: Arc<dyn Terminal>, settings: Settings) -> Self {
        Self {
            terminal,
            settings: Arc::new(settings),
        }
    }

    /// Runs `menu` as the root until the user leaves it or it asks to exit.
    pub async fn run(&self, menu: Arc<dyn Menu>) -> Result<()> {
        self.run_path(vec![menu]).await
    }

    pub(crate) fn run_path(&self, path: Vec<Arc<dyn Menu>>) -> BoxFuture<'static, Result<()>> {
        let runner = self.clone();
        Box::pin(async move { runner.run_menu(path).await })
    }

    async fn run_menu(&self, path: Vec<Arc<dyn Menu>>) -> Result<()> {
        let Some(menu) = path.last().cloned() else {
            return Err(MenuError::InvalidArgument("menu path is empty".to_string()));
        };
        info!("Entering menu '{}' (depth {})", menu.title(), path.len());

        let ui = UserInterface::shared(self.terminal.clone(), self.settings.clone());
        {
            let mut ctx = RunContext::new(self.clone(), path.clone(), ui.clone());
            menu.enter(&mut ctx).await?;
        }

        let mut buffer = PageBuffer::new(menu.items());
        let result = self.drive(&menu, &path, &ui, &mut buffer).await;
        buffer.release();

        match &result {
            Ok(()) => debug!("Leaving menu '{}'", menu.title()),
            Err(e) => warn!("Menu '{}' stopped: {}", menu.title(), e),
        }
        result
    }

    async fn drive(
        &self,
        menu: &Arc<dyn Menu>,
        path: &[Arc<dyn Menu>],
        ui: &UserInterface,
        buffer: &mut PageBuffer<Item>,
    ) -> Result<()> {
        let mut page_number = 0;

        loop {
            let glyphs = render::option_glyphs(
                self.terminal.window_height(),
                self.settings.reserved_rows,
                self.settings.min_options,
            );

            let mut notice = None;
            let page = match self.load_page(buffer, page_number, glyphs.len()).await {
                Ok(page) => page,
                Err(MenuError::Cancelled) if page_number == 0 => {
                    info!("Loading of '{}' cancelled, leaving menu", menu.title());
                    return Ok(());
                }
                Err(MenuError::Cancelled) => {
                    info!("Loading of page {} cancelled, going back", page_number);
                    page_number -= 1;
                    continue;
                }
                Err(err @ MenuError::Source(_)) => {
                    notice = Some(err.to_string());
                    let (number, page) = cached_page(buffer, page_number, glyphs.len()).await?;
                    page_number = number;
                    page
                }
                Err(e) => return Err(e),
            };

            if menu.execute_if_single_item()
                && page.is_first_page()
                && page.is_last_page()
                && page.len() == 1
            {
                if let Some(item) = page.get(0) {
                    info!("'{}' holds a single item, running it directly", menu.title());
                    self.execute(item, menu, path, ui, buffer).await?;
                }
                return Ok(());
            }

            ui.reset_yes_to_all();
            self.render(menu, path, &page, &glyphs, None)?;
            if let Some(message) = notice {
                ui.error(&message);
            }

            match self.prompt_choice(ui, &page, &glyphs).await? {
                MenuChoice::Cancel => {
                    let mut ctx = RunContext::new(self.clone(), path.to_vec(), ui.clone());
                    if menu.can_exit(&mut ctx).await {
                        return Ok(());
                    }
                    debug!("'{}' declined to exit", menu.title());
                    continue;
                }
                MenuChoice::PreviousPage => {
                    page_number = page_number.saturating_sub(1);
                    continue;
                }
                MenuChoice::NextPage => {
                    page_number += 1;
                    continue;
                }
                MenuChoice::Item(index) => {
                    let Some(item) = page.get(index) else {
                        continue;
                    };
                    self.render(menu, path, &page, &glyphs, Some(index))?;
                    self.terminal.write_line("")?;
                    self.terminal.write_line("Running...")?;
                    self.terminal.write_line("")?;
                    if self.execute(item, menu, path, ui, buffer).await? {
                        debug!("An item closed '{}'", menu.title());
                        return Ok(());
                    }
                }
            }

            if menu.should_exit() {
                debug!("'{}' asked to exit after its choice", menu.title());
                return Ok(());
            }
        }
    }

    async fn load_page(
        &self,
        buffer: &mut PageBuffer<Item>,
        page_number: usize,
        page_size: usize,
    ) -> Result<Page<Item>> {
        debug!("Loading page {} (size {})", page_number, page_size);
        race::run_until_cancelled(
            |token| async move { buffer.get_page(page_number, page_size, &token).await },
            |token| self.watch_loading(token),
        )
        .await
    }

    /// Resolves when the user cancels the load. Shows nothing if the load
    /// finishes within the grace period.
    async fn watch_loading(&self, token: CancellationToken) {
        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(self.settings.loading_grace) => {}
        }

        let mut progress = match ProgressIndicator::start(
            self.terminal.clone(),
            LOADING_LABEL,
            self.settings.animation_tick,
        ) {
            Ok(progress) => progress,
            Err(e) => {
                warn!("Could not show loading indicator: {}", e);
                token.cancelled().await;
                return;
            }
        };
        progress.set_indeterminate();

        let timings = input::InputTimings {
            poll_interval: self.settings.poll_interval,
            debounce: self.settings.debounce,
        };
        let pressed = input::select(
            self.terminal.as_ref(),
            timings,
            None,
            |s| (s == Selection::Cancel).then_some(()),
            &token,
        )
        .await;
        progress.finish().await;

        match pressed {
            Ok(()) => info!("Loading cancelled by the user"),
            Err(MenuError::Cancelled) => {}
            Err(e) => {
                warn!("Loading watcher stopped: {}", e);
                token.cancelled().await;
            }
        }
    }

    fn render(
        &self,
        menu: &Arc<dyn Menu>,
        path: &[Arc<dyn Menu>],
        page: &Page<Item>,
        glyphs: &[char],
        selected: Option<usize>,
    ) -> Result<()> {
        let view = MenuView {
            titles: path.iter().map(|m| m.title()).collect(),
            description: menu.description(),
            page,
            glyphs,
            selected,
        };
        render::render_menu(self.terminal.as_ref(), &view)?;
        Ok(())
    }

    async fn prompt_choice(
        &self,
        ui: &UserInterface,
        page: &Page<Item>,
        glyphs: &[char],
    ) -> Result<MenuChoice> {
        self.terminal.write_line("")?;
        ui.select(
            Some(PROMPT),
            |selection| choice_for(selection, page, glyphs),
            &CancellationToken::new(),
        )
        .await
    }

    /// Runs `item`, shows any failure, pauses unless told not to, and rebuilds
    /// the buffer if the item invalidated the menu. Returns whether the item
    /// asked to leave the menu.
    async fn execute(
        &self,
        item: &Item,
        menu: &Arc<dyn Menu>,
        path: &[Arc<dyn Menu>],
        ui: &UserInterface,
        buffer: &mut PageBuffer<Item>,
    ) -> Result<bool> {
        let mut ctx = RunContext::new(self.clone(), path.to_vec(), ui.clone());
        debug!("Executing '{}'", item.title());

        match item.execute(&mut ctx).await {
            Ok(()) => debug!("'{}' finished", item.title()),
            Err(err) if err.is_cancellation() => {
                info!("'{}' cancelled: {}", item.title(), err);
                ui.error(&err.to_string());
            }
            Err(err) => {
                warn!("'{}' failed: {}", item.title(), err);
                ui.error(&failure_detail(&err));
            }
        }

        if ctx.should_pause() {
            self.terminal.write_line("")?;
            self.terminal.write(PAUSE_PROMPT)?;
            input::wait_for_dismiss(self.terminal.as_ref(), self.settings.poll_interval).await?;
        }

        if ctx.is_menu_invalidated() {
            info!("'{}' invalidated, reloading its items", menu.title());
            buffer.release();
            *buffer = PageBuffer::new(menu.items());
        }
        Ok(ctx.is_exit_requested())
    }
}

/// Maps a keypress at the menu prompt to a choice, or `None` to keep waiting.
pub fn choice_for<T>(selection: Selection, page: &Page<T>, glyphs: &[char]) -> Option<MenuChoice> {
    match selection {
        Selection::Cancel => Some(MenuChoice::Cancel),
        Selection::Accept => None,
        Selection::Character('<') => (!page.is_first_page()).then_some(MenuChoice::PreviousPage),
        Selection::Character('>') => (!page.is_last_page()).then_some(MenuChoice::NextPage),
        Selection::Character(c) => {
            let upper = c.to_uppercase().next()?;
            glyphs
                .iter()
                .position(|g| *g == upper)
                .filter(|index| *index < page.len())
                .map(MenuChoice::Item)
        }
    }
}

/// After a source failure, serves the closest page that still has cached
/// items. The buffer is exhausted by then, so this never touches the source.
async fn cached_page(
    buffer: &mut PageBuffer<Item>,
    mut page_number: usize,
    page_size: usize,
) -> Result<(usize, Page<Item>)> {
    let never = CancellationToken::new();
    loop {
        let page = buffer.get_page(page_number, page_size, &never).await?;
        if !page.is_empty() || page_number == 0 {
            return Ok((page_number, page));
        }
        page_number -= 1;
    }
}

fn failure_detail(err: &MenuError) -> String {
    match err.source() {
        Some(inner) => format!("{err}\n{inner:?}"),
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::BoxError;
    use crate::menu::MenuBuilder;
    use crate::test_support::{ScriptedTerminal, test_settings};
    use crate::tui::terminal::Key;
    use futures::StreamExt;
    use futures::stream;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::timeout;

    fn noop(title: &str) -> Item {
        Item::action(title, |_ctx| Box::pin(async { Ok(()) }))
    }

    fn counting(title: &str, calls: &Arc<AtomicUsize>) -> Item {
        let calls = calls.clone();
        Item::action(title, move |ctx| {
            calls.fetch_add(1, Ordering::SeqCst);
            ctx.suppress_pause();
            Box::pin(async { Ok(()) })
        })
    }

    async fn run(terminal: &Arc<ScriptedTerminal>, menu: Arc<dyn Menu>) -> Result<()> {
        let runner = MenuRunner::new(terminal.clone(), test_settings());
        timeout(Duration::from_secs(60), runner.run(menu))
            .await
            .expect("menu should finish")
    }

    fn page_of(len: usize, first: bool, last: bool) -> Page<usize> {
        Page::new((0..len).collect(), first, last)
    }

    #[test]
    fn test_choice_for_maps_keys() {
        let glyphs = ['1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'A', 'B'];
        let page = page_of(11, false, false);

        assert_eq!(choice_for(Selection::Cancel, &page, &glyphs), Some(MenuChoice::Cancel));
        assert_eq!(choice_for(Selection::Accept, &page, &glyphs), None);
        assert_eq!(
            choice_for(Selection::Character('1'), &page, &glyphs),
            Some(MenuChoice::Item(0))
        );
        assert_eq!(
            choice_for(Selection::Character('0'), &page, &glyphs),
            Some(MenuChoice::Item(9))
        );
        assert_eq!(
            choice_for(Selection::Character('a'), &page, &glyphs),
            Some(MenuChoice::Item(10))
        );
        // 'B' has a glyph but no item on this page.
        assert_eq!(choice_for(Selection::Character('b'), &page, &glyphs), None);
        assert_eq!(choice_for(Selection::Character('z'), &page, &glyphs), None);
        assert_eq!(
            choice_for(Selection::Character('<'), &page, &glyphs),
            Some(MenuChoice::PreviousPage)
        );
        assert_eq!(
            choice_for(Selection::Character('>'), &page, &glyphs),
            Some(MenuChoice::NextPage)
        );
    }

    #[test]
    fn test_choice_for_rejects_paging_past_the_ends() {
        let glyphs = ['1', '2', '3'];
        let only = page_of(2, true, true);
        assert_eq!(choice_for(Selection::Character('<'), &only, &glyphs), None);
        assert_eq!(choice_for(Selection::Character('>'), &only, &glyphs), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_item_runs_without_prompt() {
        let terminal = ScriptedTerminal::new().into_arc();
        let calls = Arc::new(AtomicUsize::new(0));
        let menu = MenuBuilder::new("Solo")
            .execute_if_single_item(true)
            .item(counting("Only", &calls))
            .build();

        run(&terminal, menu).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let output = terminal.output();
        assert!(!output.contains("Pick an option"));
        assert!(!output.contains("Loading..."));
        assert_eq!(terminal.keys_read(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_declined_exit_keeps_page() {
        let terminal = ScriptedTerminal::new()
            .with_size(80, 11)
            .char_at(0, '>')
            .key_at(300, Key::Escape)
            .key_at(600, Key::Escape)
            .into_arc();
        let asked = Arc::new(AtomicUsize::new(0));
        let counter = asked.clone();
        let menu = MenuBuilder::new("Letters")
            .item(noop("Alpha"))
            .item(noop("Bravo"))
            .item(noop("Charlie"))
            .item(noop("Delta"))
            .item(noop("Echo"))
            .can_exit(move |_ctx| {
                let counter = counter.clone();
                Box::pin(async move { counter.fetch_add(1, Ordering::SeqCst) >= 1 })
            })
            .build();

        run(&terminal, menu).await.unwrap();

        assert_eq!(asked.load(Ordering::SeqCst), 2);
        let screens = terminal.screens();
        // Page 1, then page 2 twice: the declined Esc redraws the same page.
        assert_eq!(screens.len(), 4);
        for screen in &screens[2..] {
            assert!(screen.contains("Delta"));
            assert!(screen.contains("Previous"));
            assert!(!screen.contains("Alpha"));
            assert!(!screen.contains("Next"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_nested_menu_runs_and_returns() {
        let terminal = ScriptedTerminal::new()
            .char_at(0, '1')
            .char_at(300, '1')
            .key_at(600, Key::Enter)
            .key_at(900, Key::Escape)
            .key_at(1200, Key::Escape)
            .into_arc();
        let leaf_calls = Arc::new(AtomicUsize::new(0));
        let calls = leaf_calls.clone();
        let menu = MenuBuilder::new("Main")
            .submenu("Sub", move || {
                let calls = calls.clone();
                MenuBuilder::new("Sub")
                    .action("Leaf", move |_ctx| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Box::pin(async { Ok(()) })
                    })
                    .build()
            })
            .build();

        run(&terminal, menu).await.unwrap();

        assert_eq!(leaf_calls.load(Ordering::SeqCst), 1);
        assert_eq!(terminal.keys_left(), 0);
        let output = terminal.output();
        assert!(output.contains("Main > Sub"));
        assert!(output.contains("Running..."));
        // The leaf pauses; leaving the sub-menu does not.
        assert_eq!(output.matches(PAUSE_PROMPT).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_action_failure_is_shown_and_loop_continues() {
        let terminal = ScriptedTerminal::new()
            .char_at(0, '1')
            .key_at(300, Key::Enter)
            .key_at(600, Key::Escape)
            .into_arc();
        let menu = MenuBuilder::new("Main")
            .action("Broken", |_ctx| {
                Box::pin(async { Err(MenuError::action("disk full")) })
            })
            .build();

        run(&terminal, menu).await.unwrap();

        let output = terminal.output();
        assert!(output.contains("action failed: disk full\n"));
        assert!(output.contains(PAUSE_PROMPT));
        assert_eq!(terminal.screens().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_declined_confirmation_shows_plain_message() {
        let terminal = ScriptedTerminal::new()
            .char_at(0, '1')
            .char_at(300, 'n')
            .key_at(600, Key::Enter)
            .key_at(900, Key::Escape)
            .into_arc();
        let menu = MenuBuilder::new("Main")
            .item(Item::confirm("Delete everything", "Delete everything?"))
            .build();

        run(&terminal, menu).await.unwrap();

        let output = terminal.output();
        assert!(output.contains("Delete everything (y/n/a) ? n"));
        assert!(output.contains("Cancelled by the user\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidation_reloads_items() {
        let terminal = ScriptedTerminal::new()
            .char_at(0, '1')
            .key_at(300, Key::Escape)
            .into_arc();
        let counter = Arc::new(AtomicUsize::new(0));
        let source_counter = counter.clone();
        let menu = MenuBuilder::new("Counter")
            .items_from(move || {
                let bump_counter = source_counter.clone();
                let bump = Item::action("Bump", move |ctx| {
                    bump_counter.fetch_add(1, Ordering::SeqCst);
                    ctx.invalidate_menu();
                    ctx.suppress_pause();
                    Box::pin(async { Ok(()) })
                });
                let shown = noop(&format!("Count {}", source_counter.load(Ordering::SeqCst)));
                stream::iter(vec![Ok(bump), Ok(shown)]).boxed()
            })
            .build();

        run(&terminal, menu).await.unwrap();

        let screens = terminal.screens();
        assert!(screens[1].contains("Count 0"));
        assert!(screens.last().unwrap().contains("Count 1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_escape_while_loading_leaves_menu() {
        let terminal = ScriptedTerminal::new()
            .key_at(500, Key::Escape)
            .into_arc();
        let menu = MenuBuilder::new("Stuck")
            .items_from(|| stream::pending().boxed())
            .build();

        run(&terminal, menu).await.unwrap();

        let output = terminal.output();
        assert!(output.contains(LOADING_LABEL));
        assert!(!output.contains("Pick an option"));
        assert!(terminal.cursor_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_source_failure_renders_cached_items() {
        let terminal = ScriptedTerminal::new()
            .key_at(0, Key::Escape)
            .into_arc();
        let menu = MenuBuilder::new("Flaky")
            .items_from(|| {
                stream::iter(vec![
                    Ok(noop("Alpha")),
                    Ok(noop("Bravo")),
                    Err::<Item, BoxError>("connection reset".into()),
                ])
                .boxed()
            })
            .build();

        run(&terminal, menu).await.unwrap();

        let output = terminal.output();
        assert!(output.contains("Alpha"));
        assert!(output.contains("Bravo"));
        assert!(output.contains("failed to load menu items: connection reset"));
        assert!(!output.contains("Next"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_load_shows_indicator_then_prompts() {
        let terminal = ScriptedTerminal::new()
            .char_at(2000, '2')
            .key_at(2300, Key::Escape)
            .into_arc();
        let calls = Arc::new(AtomicUsize::new(0));
        let source_calls = calls.clone();
        let menu = MenuBuilder::new("Catalogue")
            .items_from(move || {
                let calls = source_calls.clone();
                stream::iter(1..=10)
                    .then(move |n| {
                        let calls = calls.clone();
                        async move {
                            tokio::time::sleep(Duration::from_millis(150)).await;
                            Ok::<Item, BoxError>(counting(&format!("Product {n}"), &calls))
                        }
                    })
                    .boxed()
            })
            .build();

        run(&terminal, menu).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(terminal.keys_left(), 0);
        let screens = terminal.screens();
        // The indicator is drawn before the first render, then the page.
        assert!(screens[0].contains(LOADING_LABEL));
        assert!(screens[1].contains("Product 10"));
        assert!(screens[1].contains("Pick an option"));
        assert!(terminal.cursor_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_escape_while_loading_next_page_goes_back() {
        let terminal = ScriptedTerminal::new()
            .with_size(80, 11)
            .char_at(1000, '>')
            .key_at(1300, Key::Escape)
            .key_at(1600, Key::Escape)
            .into_arc();
        let menu = MenuBuilder::new("Pages")
            .items_from(|| {
                let first = (0..4).map(|n| Ok::<Item, BoxError>(noop(&format!("P{n}"))));
                stream::iter(first).chain(stream::pending()).boxed()
            })
            .build();

        run(&terminal, menu).await.unwrap();

        assert_eq!(terminal.keys_left(), 0);
        let screens = terminal.screens();
        assert_eq!(screens.len(), 3);
        assert!(screens[1].contains(LOADING_LABEL));
        for screen in &screens[1..] {
            assert!(screen.contains("P0"));
            assert!(screen.contains("P2"));
            assert!(!screen.contains("P3"));
            assert!(screen.contains("Next"));
            assert!(!screen.contains("Previous"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_yes_to_all_ends_with_the_render_cycle() {
        let terminal = ScriptedTerminal::new()
            .char_at(0, '1')
            .char_at(300, 'a')
            .key_at(600, Key::Enter)
            .char_at(900, '1')
            .char_at(1200, 'n')
            .key_at(1500, Key::Enter)
            .key_at(1800, Key::Escape)
            .into_arc();
        let purged = Arc::new(AtomicUsize::new(0));
        let counter = purged.clone();
        let menu = MenuBuilder::new("Maintenance")
            .action("Purge", move |ctx| {
                let counter = counter.clone();
                Box::pin(async move {
                    if !ctx.ui().confirm("Purge cache?", false).await? {
                        return Err(MenuError::user_cancelled());
                    }
                    if ctx.ui().confirm("Purge logs?", false).await? {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                    Ok(())
                })
            })
            .build();

        run(&terminal, menu).await.unwrap();

        assert_eq!(purged.load(Ordering::SeqCst), 1);
        assert_eq!(terminal.keys_left(), 0);
        let output = terminal.output();
        // "a" skips the second question; the next render asks again.
        assert_eq!(output.matches("Purge cache (y/n/a) ? ").count(), 2);
        assert_eq!(output.matches("Purge logs (y/n/a) ? ").count(), 0);
        assert!(output.contains("Cancelled by the user\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_item_can_close_its_menu() {
        let terminal = ScriptedTerminal::new()
            .char_at(0, '1')
            .char_at(300, '2')
            .key_at(600, Key::Escape)
            .into_arc();
        let asked = Arc::new(AtomicUsize::new(0));
        let counter = asked.clone();
        let menu = MenuBuilder::new("Main")
            .submenu("Wizard", move || {
                let counter = counter.clone();
                MenuBuilder::new("Wizard")
                    .item(noop("Step"))
                    .action("Done", |ctx| {
                        ctx.exit_menu();
                        ctx.suppress_pause();
                        Box::pin(async { Ok(()) })
                    })
                    .can_exit(move |_ctx| {
                        let counter = counter.clone();
                        Box::pin(async move {
                            counter.fetch_add(1, Ordering::SeqCst);
                            true
                        })
                    })
                    .build()
            })
            .build();

        run(&terminal, menu).await.unwrap();

        // Only the last Esc was needed, and it was spent on the main menu.
        assert_eq!(asked.load(Ordering::SeqCst), 0);
        assert_eq!(terminal.keys_left(), 0);
        let screens = terminal.screens();
        let last = screens.last().unwrap();
        assert!(last.contains("Main"));
        assert!(!last.contains("Main > Wizard"));
        assert!(!terminal.output().contains(PAUSE_PROMPT));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_after_choice() {
        let terminal = ScriptedTerminal::new().char_at(0, '2').into_arc();
        let calls = Arc::new(AtomicUsize::new(0));
        let menu = MenuBuilder::new("Choose")
            .exit_after_choice(true)
            .item(noop("One"))
            .item(counting("Two", &calls))
            .build();

        run(&terminal, menu).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(terminal.keys_left(), 0);
    }
}
