use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::LevelFilter;
use onote::{console, ui, App, Config};
use onote_core::EditCoordinator;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{env, io, path::PathBuf, time::Duration};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<()> {
    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Info);
        logger.filter_module("onote", LevelFilter::Debug);
        logger.filter_module("onote_core", LevelFilter::Debug);
    }
    logger.init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("-c") {
        return run_console().await;
    }

    // Put the terminal back before the panic message is printed
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    if let Err(e) = enable_raw_mode() {
        eprintln!("Failed to initialise the terminal: {}", e);
        return Err(e.into());
    }
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        eprintln!("Failed to configure the terminal: {}", e);
        return Err(e.into());
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = match App::new().await {
        Ok(app) => {
            log::info!("Application initialized successfully");
            app
        }
        Err(e) => {
            restore_terminal()?;
            eprintln!("Failed to start Onote: {}", e);
            return Err(e);
        }
    };

    match args.first() {
        Some(file) => {
            log::info!("Opening file from command line: {}", file);
            app.open_path(PathBuf::from(file)).await;
        }
        None => log::info!("No file specified, starting with empty buffer"),
    }

    let res = run_app(&mut terminal, app).await;

    restore_terminal()?;

    if let Err(err) = res {
        log::error!("Application error: {}", err);
        eprintln!("Onote stopped because of an error: {}", err);
    }

    Ok(())
}

async fn run_console() -> Result<()> {
    let config = Config::load().await.unwrap_or_else(|e| {
        log::warn!("Using default config: {}", e);
        Config::default()
    });
    let mut coordinator = EditCoordinator::new(config.coordinator_options());
    let mut stdout = tokio::io::stdout();

    console::run(BufReader::new(tokio::io::stdin()), &mut stdout, &mut coordinator).await?;
    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        if let Err(e) = terminal.draw(|f| ui::draw(f, &mut app)) {
            log::error!("Terminal draw error: {}", e);
        }

        app.update_status();

        if app.should_quit() {
            log::info!("Application shutdown requested");
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if let Err(e) = app.handle_key_event(key).await {
                        log::error!("Key event handling error: {}", e);
                        app.status.error(format!("Key handling error: {}", e));
                    }
                }
                Event::Resize(_, _) => log::debug!("Terminal resized"),
                _ => {}
            }
        }
    }

    log::info!("Application loop ended successfully");
    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;
    let _ = execute!(stdout, crossterm::cursor::Show);
    Ok(())
}
