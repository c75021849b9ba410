use std::io;

use actix_web::dev::ServerHandle;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

type ServerTask = JoinHandle<io::Result<()>>;

/// Drains the HTTP server and then releases the database pool once the process is asked to stop
pub struct ShutdownCoordinator {
    handle: ServerHandle,
    task: ServerTask,
    pool: PgPool,
}

impl ShutdownCoordinator {
    pub fn new(handle: ServerHandle, task: ServerTask, pool: PgPool) -> Self {
        Self { handle, task, pool }
    }

    pub async fn wait_for_shutdown(self) -> io::Result<()> {
        let signal = stop_signal().await?;
        info!(signal, "Stop requested; draining in-flight requests");

        // Graceful stop: the listener closes first, running handlers complete
        self.handle.stop(true).await;
        match self.task.await {
            Ok(Ok(())) => info!("HTTP server stopped"),
            Ok(Err(e)) => warn!("HTTP server stopped with an error: {}", e),
            Err(e) => error!("HTTP server task did not complete: {}", e),
        }

        self.pool.close().await;
        info!("Database pool closed; bye");
        Ok(())
    }
}

/// Resolves with the name of whichever stop signal arrives first
async fn stop_signal() -> io::Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.map(|_| "SIGINT"),
            _ = sigterm.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map(|_| "Ctrl-C")
    }
}
