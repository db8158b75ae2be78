//! Delayed process restart.

use std::time::Duration;

use {
    axum::{
        extract::State,
        response::{IntoResponse, Redirect},
    },
    tracing::{error, info},
};

use crate::state::AppState;

/// Time between a restart request and the actual re-exec. The refresh page
/// waits the same amount before reloading.
pub const RESTART_DELAY: Duration = Duration::from_secs(10);

/// Path of the page shown while the restart is pending.
pub const RESTART_REFRESH_PATH: &str = "/restartrefresh";

pub trait Restarter: Send + Sync {
    /// Arrange for the process to restart after `delay`. Must not block.
    fn schedule(&self, delay: Duration);
}

/// Re-runs the current binary with the same arguments.
///
/// On Unix the exec syscall replaces the current process. Elsewhere a new
/// process is spawned and the current one exits.
pub struct ExecRestarter;

impl Restarter for ExecRestarter {
    fn schedule(&self, delay: Duration) {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            reexec();
        });
    }
}

fn reexec() {
    let exe = match std::env::current_exe() {
        Ok(path) => path,
        Err(e) => {
            error!("failed to get current executable path: {e}");
            std::process::exit(1);
        },
    };
    let args: Vec<String> = std::env::args().skip(1).collect();
    info!(exe = %exe.display(), args = ?args, "re-executing");

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // Only returns on failure.
        let err = std::process::Command::new(&exe).args(&args).exec();
        error!("failed to exec: {err}");
        std::process::exit(1);
    }

    #[cfg(not(unix))]
    {
        match std::process::Command::new(&exe).args(&args).spawn() {
            Ok(_) => std::process::exit(0),
            Err(e) => {
                error!("failed to spawn new process: {e}");
                std::process::exit(1);
            },
        }
    }
}

/// `GET /restart`: schedule a restart and send the browser to the refresh
/// page.
pub async fn restart_handler(State(state): State<AppState>) -> impl IntoResponse {
    info!(delay_secs = RESTART_DELAY.as_secs(), "restart requested");
    state.gateway.restarter.schedule(RESTART_DELAY);
    Redirect::to(RESTART_REFRESH_PATH)
}
