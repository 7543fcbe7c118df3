//! Bold East Africa reader - the news site in your terminal
//!
//! A terminal UI that paints the last known front page from disk, then keeps
//! it fresh from the API in the background.

use std::io;
use std::panic;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use boldeast::api::{ApiClient, ReqwestTransport};
use boldeast::app::App;
use boldeast::cache::LocalCache;
use boldeast::cli::{Cli, StartupConfig};
use boldeast::config::Settings;
use boldeast::screens::ScreenContext;
use boldeast::{logging, ui};

/// Requests slower than this fail as transport errors
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Persistent cache in the configured directory, the XDG cache dir, or a temp dir
fn local_cache(settings: &Settings) -> LocalCache {
    match &settings.cache_dir {
        Some(dir) => LocalCache::with_dir(dir.clone()),
        None => LocalCache::new()
            .unwrap_or_else(|| LocalCache::with_dir(std::env::temp_dir().join("boldeast"))),
    }
}

/// Validated startup state, or an error message for stderr
fn prepare(cli: &Cli) -> Result<(Settings, StartupConfig), String> {
    let startup = StartupConfig::from_cli(cli).map_err(|e| e.to_string())?;
    let settings = Settings::from_cli(cli).map_err(|e| e.to_string())?;
    Ok((settings, startup))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Reject bad arguments before the terminal switches to raw mode
    let (settings, startup) = match prepare(&cli) {
        Ok(prepared) => prepared,
        Err(message) => {
            eprintln!("Error: {}", message);
            process::exit(1);
        }
    };

    let local = local_cache(&settings);
    let log_dir: PathBuf = local.cache_dir().to_path_buf();
    if let Err(err) = logging::init(&settings.log_level, &log_dir) {
        eprintln!("Warning: logging disabled: {}", err);
    }
    info!(api = %settings.api_base_url, route = ?startup.route, "starting reader");

    let transport = ReqwestTransport::with_timeout(REQUEST_TIMEOUT)?;
    let api = ApiClient::with_transport(
        &settings.api_base_url,
        &settings.storage_base_url,
        Arc::new(transport),
    );
    let ctx = ScreenContext::new(api, local);

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(ctx, startup);

    // Main event loop; screens update in the background between frames
    let result = loop {
        if let Err(err) = terminal.draw(|f| ui::render(f, &app)) {
            break Err(err);
        }

        // Poll for keyboard events with 100ms timeout
        match event::poll(Duration::from_millis(100)) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Ok(_) => {}
                Err(err) => break Err(err),
            },
            Ok(false) => {}
            Err(err) => break Err(err),
        }

        if app.should_quit {
            break Ok(());
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    if let Err(err) = &result {
        warn!(error = %err, "terminal error");
    }
    info!("reader closed");
    result?;
    Ok(())
}
