use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    style::Print,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use rand::{SeedableRng, rngs::StdRng};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use std::{fs::File, io, path::Path, sync::Mutex, time::Duration};
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

use token_discovery::app::{Action, App};
use token_discovery::clipboard::osc52_sequence;
use token_discovery::config::load_config;
use token_discovery::feed::LiveFeeds;
use token_discovery::generator::TokenCollections;
use token_discovery::ui::ui;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    init_tracing(config.args.log_file.as_deref())?;

    let settings = &config.settings;
    tracing::info!(?settings, "starting token discovery");

    // One explicitly owned data source for the whole session.
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let collections =
        TokenCollections::generate(settings.tokens_per_category, chrono::Utc::now(), &mut rng);
    let feeds = LiveFeeds::new(collections, settings.tick_interval(), &mut rng);
    let mut app = App::new(feeds, settings.app_options(), Instant::now());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = run_app(&mut terminal, &mut app).await;

    // Stop any running feed before the view goes away.
    let stopped = app.shutdown().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }
    stopped?;

    Ok(())
}

/// The terminal is owned by the UI, so tracing only goes to a file.
fn init_tracing(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    app.sync_feeds().await?;

    loop {
        app.on_frame(Instant::now());
        terminal.draw(|f| ui(f, app))?;

        if crossterm::event::poll(Duration::from_millis(100))? {
            let size = terminal.size()?;
            let area = Rect::new(0, 0, size.width, size.height);
            let action = match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse, area),
                _ => Action::None,
            };

            match action {
                Action::Quit => return Ok(()),
                Action::Copy(address) => {
                    execute!(io::stdout(), Print(osc52_sequence(&address)))?;
                }
                Action::None => {}
            }
        }

        app.sync_feeds().await?;
        if app.should_quit {
            return Ok(());
        }
    }
}
