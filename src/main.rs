use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use clap::Parser;
use futures::stream::{self, StreamExt};
use log::{error, info, warn};
use simplelog::{ConfigBuilder, WriteLogger};

use conmenu::core::config::{self, CliOverrides};
use conmenu::tui::{CrosstermTerminal, RawModeGuard};
use conmenu::{BoxError, Item, Menu, MenuBuilder, MenuError, MenuRunner, RunContext};

#[derive(Parser)]
#[command(name = "conmenu", about = "Keyboard-driven terminal menus, with a sample menu tree")]
struct Args {
    /// Config file to use instead of ~/.conmenu/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long)]
    log_level: Option<String>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();

    let file_config = config::load_config(args.config.as_deref()).map_err(|e| {
        eprintln!("conmenu: {e}");
        io::Error::other(e)
    })?;
    let cli = CliOverrides {
        log_level: args.log_level,
        log_file: args.log_file,
    };
    let settings = config::resolve(&file_config, &cli);

    // The menu owns the terminal, so logs go to a file.
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    match File::create(&settings.log_file) {
        Ok(log_file) => {
            let _ = WriteLogger::init(settings.log_level, log_config, log_file);
        }
        Err(e) => eprintln!(
            "conmenu: cannot write log to {}: {e}",
            settings.log_file.display()
        ),
    }

    info!("conmenu starting up");
    let runner = MenuRunner::new(Arc::new(CrosstermTerminal::new()), settings);

    let result = {
        let _raw = RawModeGuard::new()?;
        runner.run(main_menu()).await
    };

    match result {
        Ok(()) => {
            info!("conmenu shutting down");
            Ok(())
        }
        Err(e) => {
            error!("Menu loop failed: {}", e);
            eprintln!("conmenu: {e}");
            Err(io::Error::other(e))
        }
    }
}

// ============================================================================
// Sample menus
// ============================================================================

fn main_menu() -> Arc<dyn Menu> {
    MenuBuilder::new("Main")
        .description("A tour of conmenu.\nPick an option by its number or letter, [Esc] goes back.")
        .action("Do stuff", |ctx| {
            Box::pin(async move {
                ctx.ui().debug("About to do stuff");
                ctx.ui().info("Doing stuff...");
                Ok(())
            })
        })
        .action("Greet", |ctx| Box::pin(greet(ctx)))
        .submenu("Choose", choice_menu)
        .submenu("Slow catalogue", slow_catalogue)
        .action("Long task", |ctx| Box::pin(long_task(ctx)))
        .action("Scan", |ctx| Box::pin(scan(ctx)))
        .item(Item::sequence(
            "Warm up",
            vec![
                Item::action("Stretch", |ctx| {
                    Box::pin(async move {
                        ctx.ui().info("Stretching...");
                        Ok(())
                    })
                }),
                Item::confirm("Jog", "Go for a jog?"),
                Item::action("Cool down", |ctx| {
                    Box::pin(async move {
                        ctx.ui().info("Cooling down...");
                        Ok(())
                    })
                }),
            ],
        ))
        .item(Item::confirm("Delete everything", "Really delete everything?").highlighted())
        .submenu("Counter", counter_menu)
        .action("Broken", |ctx| {
            Box::pin(async move {
                ctx.ui().warning("This one always fails");
                Err(MenuError::action(io::Error::other(
                    "the flux capacitor is out of flux",
                )))
            })
        })
        .submenu("Flaky source", flaky_menu)
        .can_exit(|ctx| {
            Box::pin(async move {
                match ctx.ui().confirm("Quit conmenu?", true).await {
                    Ok(quit) => quit,
                    Err(e) => {
                        warn!("Exit confirmation failed, quitting: {}", e);
                        true
                    }
                }
            })
        })
        .build()
}

async fn greet(ctx: &mut RunContext) -> conmenu::Result<()> {
    let name = ctx.ui().prompt("What's your name? ").await?;
    let name = name.trim();
    if name.is_empty() {
        return Err(MenuError::UserCancelled("No name, no greeting".to_string()));
    }
    ctx.ui().info(&format!("Hello, {name}!"));
    Ok(())
}

/// Exits after one choice. Choosing A also skips the pause.
fn choice_menu() -> Arc<dyn Menu> {
    MenuBuilder::new("Choose")
        .exit_after_choice(true)
        .action("Choose A", |ctx| {
            Box::pin(async move {
                ctx.suppress_pause();
                Ok(())
            })
        })
        .action("Choose B", |ctx| {
            Box::pin(async move {
                ctx.ui().info("You chose B");
                Ok(())
            })
        })
        .build()
}

fn slow_catalogue() -> Arc<dyn Menu> {
    MenuBuilder::new("Slow catalogue")
        .description("Products arrive one every 150 ms. Press [Esc] while loading to give up.")
        .items_from(|| {
            stream::iter(1..=40)
                .then(|n| async move {
                    tokio::time::sleep(Duration::from_millis(150)).await;
                    Ok::<Item, BoxError>(Item::action(format!("Product {n}"), move |ctx| {
                        Box::pin(async move {
                            ctx.ui().info(&format!("Product {n} added to the basket"));
                            Ok(())
                        })
                    }))
                })
                .boxed()
        })
        .build()
}

async fn long_task(ctx: &mut RunContext) -> conmenu::Result<()> {
    let mut progress = ctx.ui().start_progress("Crunching numbers")?;
    let bar = &mut progress;

    let reached = ctx
        .run_until_cancelled(|token| async move {
            for step in 0..=100u8 {
                let update = if step == 80 {
                    bar.set_progress_with_label(step, "Checking the results").await
                } else {
                    bar.set_progress(step).await
                };
                if let Err(e) = update {
                    warn!("Progress update failed: {}", e);
                }
                tokio::select! {
                    _ = token.cancelled() => return step,
                    _ = tokio::time::sleep(Duration::from_millis(50)) => {}
                }
            }
            100
        })
        .await;
    progress.finish().await;

    if reached < 100 {
        return Err(MenuError::UserCancelled(format!("Stopped at {reached} %")));
    }
    ctx.ui().info("All numbers crunched");
    Ok(())
}

async fn scan(ctx: &mut RunContext) -> conmenu::Result<()> {
    let mut progress = ctx.ui().start_progress("Scanning the network")?;
    progress.set_indeterminate();
    let bar = &mut progress;

    let found = ctx
        .run_until_cancelled(|token| async move {
            let mut found = 0;
            for round in 0..30 {
                if round == 15 {
                    bar.set_indeterminate_with_label("Scanning the second subnet")
                        .await;
                }
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(Duration::from_millis(100)) => found += 1,
                }
            }
            found
        })
        .await;

    progress.clear_with_label("Scan finished").await?;
    progress.finish().await;
    ctx.ui().info(&format!("Found {found} hosts"));
    Ok(())
}

/// Each increment invalidates the menu, so the title shows the new count.
/// "Done" closes the menu without Esc.
fn counter_menu() -> Arc<dyn Menu> {
    let count = Arc::new(AtomicUsize::new(0));
    MenuBuilder::new("Counter")
        .action("Done", |ctx| {
            ctx.exit_menu();
            ctx.suppress_pause();
            Box::pin(async { Ok(()) })
        })
        .on_enter(|ctx| {
            Box::pin(async move {
                ctx.ui().debug("Entering the counter");
                Ok(())
            })
        })
        .items_from(move || {
            let current = count.load(Ordering::SeqCst);
            let count = count.clone();
            let increment = Item::action(format!("Increment (now {current})"), move |ctx| {
                count.fetch_add(1, Ordering::SeqCst);
                ctx.invalidate_menu();
                ctx.suppress_pause();
                Box::pin(async { Ok(()) })
            });
            stream::iter(vec![Ok(increment)]).boxed()
        })
        .build()
}

/// The source breaks after three items; the menu still shows those three.
fn flaky_menu() -> Arc<dyn Menu> {
    MenuBuilder::new("Flaky source")
        .items_from(|| {
            let items = (1..=3).map(|n| {
                Ok(Item::action(format!("Survivor {n}"), |ctx| {
                    Box::pin(async move {
                        ctx.ui().info("Still here");
                        Ok(())
                    })
                }))
            });
            stream::iter(items)
                .chain(stream::once(async {
                    Err::<Item, BoxError>("connection reset by peer".into())
                }))
                .boxed()
        })
        .build()
}
