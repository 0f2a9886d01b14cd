//! Shutdown signalling
//!
//! One broadcast fans a stop request out to the HTTP server and every open
//! WebSocket. Process signals feed it; a second signal exits immediately.

use tokio::sync::broadcast;

/// Cloneable handle to the process-wide stop broadcast
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: broadcast::Sender<()>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(4);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Ask every listener to stop
    pub fn trigger(&self) {
        // No receivers just means nothing is running yet
        let _ = self.sender.send(());
    }

    /// Forward SIGINT/SIGTERM (Ctrl-C elsewhere) into this signal
    ///
    /// Must be called from within a tokio runtime.
    pub fn listen_for_signals(&self) {
        #[cfg(unix)]
        unsafe {
            // Broken client pipes surface as write errors, not process death
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }

        let signal = self.clone();
        tokio::spawn(async move {
            let mut received = 0u32;
            while wait_for_os_signal().await {
                received += 1;
                if received > 1 {
                    log::warn!("Second shutdown signal received; exiting");
                    std::process::exit(130);
                }
                log::info!("Shutdown signal received");
                signal.trigger();
            }
        });
    }
}

/// Resolve once a stop has been requested (or the signal is gone)
pub async fn wait_for_shutdown(mut receiver: broadcast::Receiver<()>) {
    let _ = receiver.recv().await;
    log::info!("Shutdown requested, draining connections");
}

#[cfg(unix)]
async fn wait_for_os_signal() -> bool {
    use tokio::signal::unix::{signal, SignalKind};

    let (Ok(mut interrupt), Ok(mut terminate)) = (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) else {
        log::warn!("Could not install signal handlers");
        return false;
    };
    tokio::select! {
        received = interrupt.recv() => received.is_some(),
        received = terminate.recv() => received.is_some(),
    }
}

#[cfg(not(unix))]
async fn wait_for_os_signal() -> bool {
    tokio::signal::ctrl_c().await.is_ok()
}
