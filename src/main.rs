use anyhow::Result;

mod app;
mod config;
mod handler;
mod ollama;
mod prompt;
mod reply;
mod session;
mod transcript;
mod tui;
mod ui;

use app::App;
use config::Config;
use tui::{EventHandler, Tui};

/// Drives the typing reveal and the loading ellipsis.
const TICK_RATE: std::time::Duration = std::time::Duration::from_millis(50);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|_| Config::default());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(TICK_RATE);
    let mut app = App::new(config);

    // Probe the backend in the background; failures land on the status line
    let ollama = app.ollama.clone();
    app.models_task = Some(tokio::spawn(async move { ollama.list_models().await }));

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut Tui, events: &mut EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}
