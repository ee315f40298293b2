mod config;
mod controller;
mod error;
mod library;
mod logging;
mod model;
mod player;
mod view;

#[cfg(test)]
mod test_support;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use config::Config;
use controller::{AppController, ControllerSettings, UiUpdate};
use library::{LibraryPort, SubsonicClient};
use model::AppModel;
use player::{MpvPlayer, PlayerPort};
use view::{AppView, ViewConfig, ViewState};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== navi-rs Starting ===");

    // Configuration problems are fatal and reported before the TUI starts
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Configuration error");
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let library = Arc::new(SubsonicClient::new(&config)?);
    match library.ping().await {
        Ok(()) => tracing::info!(server = %config.server.url, "Server reachable"),
        Err(e) => tracing::warn!(error = %e, "Server ping failed, continuing"),
    }

    let player = match MpvPlayer::spawn(&config.player.mpv_path).await {
        Ok(player) => Arc::new(player),
        Err(e) => {
            tracing::error!(error = %e, "Could not start mpv");
            eprintln!("Error: could not start mpv: {:#}", e);
            std::process::exit(1);
        }
    };

    let model = AppModel::new(config.ui.page_size);
    let cancel = CancellationToken::new();
    let (controller, updates) = AppController::new(
        model.clone(),
        library,
        player.clone(),
        ControllerSettings::default(),
        cancel.clone(),
    );

    let mut tasks = Vec::new();
    match player.event_channel().await {
        Some(events) => tasks.push(controller.start_player_event_listener(events)),
        None => tracing::warn!("Player event channel unavailable, auto-advance disabled"),
    }
    tasks.push(controller.start_progress_sampler());
    tasks.push(spawn_signal_listener(model.clone(), cancel.clone()));
    tasks.push(controller.load_music());

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let view_config = ViewConfig::from(&config.ui);
    let res = run_app(&mut terminal, &model, &controller, updates, &view_config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    controller.shutdown(tasks).await;

    tracing::info!("navi-rs shutting down");
    Ok(())
}

/// Turn SIGINT and SIGTERM into a quit request for the UI loop.
fn spawn_signal_listener(model: AppModel, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        #[cfg(unix)]
        let terminate = async {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Could not install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::signal::ctrl_c() => tracing::info!("SIGINT received"),
            _ = terminate => tracing::info!("SIGTERM received"),
        }
        model.set_should_quit(true).await;
    })
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: &AppModel,
    controller: &AppController,
    mut updates: mpsc::UnboundedReceiver<UiUpdate>,
    view_config: &ViewConfig,
) -> io::Result<()> {
    loop {
        // Auto-clear old errors (after 5 seconds)
        model.auto_clear_old_errors().await;

        while let Ok(update) = updates.try_recv() {
            controller.apply_ui_update(update).await;
        }

        let state = ViewState {
            now_playing: model.get_now_playing().await,
            progress: model.get_progress().await,
            listing: model.get_listing_view().await,
            ui_state: model.get_ui_state().await,
            playing_index: model.player_state().get_state().await.index(),
        };

        terminal.draw(|f| {
            AppView::render(f, &state, view_config);
        })?;

        // Short poll keeps progress updates smooth
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }

        if model.should_quit().await {
            break;
        }
    }

    Ok(())
}
