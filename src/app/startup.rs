//! Process startup: configuration, logging, runtime and server

use super::cli::{Args, Settings};
use crate::core::error_handling::{log_error_with_context, ContextualError};
use crate::core::logging::{flush_logs, init_logging};
use crate::core::shutdown::{wait_for_shutdown, ShutdownSignal};
use crate::queue::api::QueueManager;
use crate::server::rate_limit::RATE_LIMIT_WINDOW;
use crate::server::{build_router, AppState};
use clap::Parser;
use std::io::IsTerminal;
use std::net::SocketAddr;
use std::process::ExitCode;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("{message}")]
    Bind {
        addr: SocketAddr,
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server stopped unexpectedly: {0}")]
    Serve(#[source] std::io::Error),
}

impl ContextualError for StartupError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, StartupError::Bind { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            StartupError::Bind { message, .. } => Some(message),
            StartupError::Serve(_) => None,
        }
    }
}

/// Parse arguments, start logging and run the server until shutdown
pub fn startup() -> ExitCode {
    let args = Args::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: Could not start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let settings = match runtime.block_on(Settings::load(args)) {
        Ok(settings) => settings,
        Err(e) => {
            // Logging is configured from these settings, so report directly
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let use_color = settings
        .color
        .unwrap_or_else(|| std::io::stderr().is_terminal());
    let log_file = settings
        .log_file
        .as_ref()
        .map(|p| p.to_string_lossy().to_string());
    if let Err(e) = init_logging(
        Some(&settings.log_level),
        Some(&settings.log_format),
        log_file.as_deref(),
        use_color,
    ) {
        eprintln!("Error: Failed to initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    log::info!(
        "waitline {} (built {}, commit {})",
        env!("CARGO_PKG_VERSION"),
        crate::BUILD_TIME,
        crate::GIT_HASH
    );
    log::debug!("Settings: {settings:?}");

    let result = runtime.block_on(async {
        let shutdown = ShutdownSignal::new();
        shutdown.listen_for_signals();
        run_server(settings, shutdown).await
    });

    let code = match result {
        Ok(()) => {
            log::info!("Server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log_error_with_context(&e, "Server failed");
            ExitCode::FAILURE
        }
    };
    flush_logs();
    code
}

async fn run_server(
    settings: Settings,
    shutdown: ShutdownSignal,
) -> Result<(), StartupError> {
    let manager = QueueManager::with_options(settings.queue_options());
    let state = AppState::new(manager, &settings, shutdown.clone());
    let reset_task = state.rate_limiter.spawn_reset_task(RATE_LIMIT_WINDOW);

    if let Some(dir) = &settings.static_dir {
        log::info!("Serving static files from {}", dir.display());
    }
    let router = build_router(state, settings.static_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(settings.bind)
        .await
        .map_err(|source| StartupError::Bind {
            addr: settings.bind,
            message: format!("Cannot listen on {}: {source}", settings.bind),
            source,
        })?;
    log::info!("Listening on {}", settings.bind);

    let served = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(wait_for_shutdown(shutdown.subscribe()))
    .await
    .map_err(StartupError::Serve);

    reset_task.abort();
    served
}
