use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Cancels a token on the first SIGINT or SIGTERM.
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    token: CancellationToken,
    received: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts listening in the background. Only long-running commands call this,
    /// so one-shot commands keep the default Ctrl+C behaviour.
    pub fn listen(&self) {
        let token = self.token.clone();
        let received = self.received.clone();

        tokio::spawn(async move {
            let signal_name = tokio::select! {
                _ = interrupt() => "SIGINT",
                _ = terminate() => "SIGTERM",
            };
            info!(signal = signal_name, "Stopping");
            received.store(true, Ordering::SeqCst);
            token.cancel();
        });
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn received(&self) -> bool {
        self.received.load(Ordering::SeqCst)
    }
}

async fn interrupt() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "SIGINT handler unavailable");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            warn!(error = %e, "SIGTERM handler unavailable");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

/// Process exit status of `pager`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success,
    Failure,
    Interrupted,
}

impl From<Exit> for std::process::ExitCode {
    fn from(exit: Exit) -> Self {
        match exit {
            Exit::Success => std::process::ExitCode::SUCCESS,
            Exit::Failure => std::process::ExitCode::FAILURE,
            // Conventional status for SIGINT
            Exit::Interrupted => std::process::ExitCode::from(130),
        }
    }
}
