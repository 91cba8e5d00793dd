mod auth;
mod config;
mod controller;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use rspotify::{clients::OAuthClient, AuthCodeSpotify, Config, Token};

use view::AppView;
use config::AppConfig;
use controller::ReviewController;
use model::SpotifyClient;

const TOKEN_CHECK_INTERVAL: Duration = Duration::from_secs(60);
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = match logging::init_logging() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("=== Sift-RS Starting ===");

    let config = AppConfig::load();

    // Step 1: Get credentials
    let auth_result = auth::perform_oauth_flow().await?;

    // Step 2: Authenticate with rspotify
    let token = auth::rspotify_token(auth_result.access_token.clone(), auth_result.expires_at);
    let rspotify_client = setup_rspotify(token).await?;

    match rspotify_client.me().await {
        Ok(user) => tracing::info!(user_id = %user.id, "rspotify authorized successfully"),
        Err(e) => {
            tracing::error!(error = %e, "rspotify authentication failed");
            return Err(anyhow::anyhow!("rspotify init failed"));
        }
    }

    let spotify_client = Arc::new(SpotifyClient::new(
        rspotify_client,
        auth_result.refresh_token.clone(),
        Some(auth_result.expires_at),
    ));

    let mut controller = ReviewController::new(spotify_client.clone(), &config);
    controller.load_collections();

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut controller, spotify_client).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!(
        decisions = controller.session().decisions().len(),
        "Sift-RS shutting down"
    );
    Ok(())
}

async fn setup_rspotify(access_token: Token) -> Result<AuthCodeSpotify> {
    let spotify = AuthCodeSpotify::with_config(
        Default::default(),
        Default::default(),
        Config {
            token_cached: false,
            token_refreshing: false,
            ..Default::default()
        },
    );

    *spotify
        .token
        .lock()
        .await
        .map_err(|_| anyhow::anyhow!("rspotify token lock unavailable"))? = Some(access_token);
    tracing::debug!("rspotify token set");
    Ok(spotify)
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &mut ReviewController<SpotifyClient>,
    spotify: Arc<SpotifyClient>,
) -> io::Result<()> {
    let mut last_token_check = Instant::now();
    let mut last_frame = Instant::now();

    loop {
        // Periodically check and refresh token if needed
        if last_token_check.elapsed() >= TOKEN_CHECK_INTERVAL {
            last_token_check = Instant::now();

            let spotify = spotify.clone();
            tokio::spawn(async move {
                if let Err(e) = spotify.refresh_token_if_needed().await {
                    tracing::warn!("Token refresh check failed: {}", e);
                }
            });
        }

        let now = Instant::now();
        controller.tick(now - last_frame);
        last_frame = now;

        let snapshot = controller.snapshot();
        let transform = controller.gesture().transform();
        terminal.draw(|f| {
            AppView::render(f, &snapshot, controller.collections(), controller.ui_state(), &transform);
        })?;

        // Keep polling short while the card animates so frames stay smooth
        let poll = if controller.gesture().is_animating() {
            FRAME_INTERVAL
        } else {
            Duration::from_millis(50)
        };

        if event::poll(poll)? {
            match event::read()? {
                Event::Key(key) => controller.handle_key_event(key),
                Event::Mouse(mouse) => controller.handle_mouse_event(mouse),
                _ => {}
            }
        }

        if controller.ui_state().should_quit {
            break;
        }

        // Let spawned catalog calls make progress between frames
        tokio::task::yield_now().await;
    }

    Ok(())
}
