//! Signal handling for graceful shutdown.
//!
//! SIGINT and SIGTERM on Unix, Ctrl+C elsewhere. The listener only flips the
//! shared [`ShutdownState`]; the tick loop notices it on its next tick.

use crate::shutdown::ShutdownState;
use tokio::signal;
use tracing::info;

/// Waits for a termination signal, then initiates shutdown on `shutdown_state`.
///
/// # Platform Support
///
/// * **Unix platforms**: SIGINT and SIGTERM
/// * **Other platforms**: Ctrl+C
///
/// # Arguments
///
/// * `shutdown_state` - State shared with the tick loop; flipped when a signal arrives
///
/// # Returns
///
/// `Ok(())` after shutdown has been initiated, or an error if the signal
/// handlers could not be installed.
///
/// # Example
///
/// ```rust,no_run
/// use lib_proximity_sim::shutdown::ShutdownState;
/// use lib_proximity_sim::signals::setup_signal_handlers;
///
/// # async fn demo() {
/// let shutdown_state = ShutdownState::new();
/// let listener = tokio::spawn(setup_signal_handlers(shutdown_state.clone()));
///
/// while !shutdown_state.is_shutdown_initiated() {
///     // run a tick
///     tokio::time::sleep(std::time::Duration::from_millis(50)).await;
/// }
/// listener.abort();
/// # }
/// ```
pub async fn setup_signal_handlers(shutdown_state: ShutdownState) -> std::io::Result<()> {
    wait_for_signal().await?;
    info!("📡 Received shutdown signal - initiating graceful shutdown");
    shutdown_state.initiate_shutdown();
    Ok(())
}

async fn wait_for_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => (),
            _ = sigterm.recv() => ()
        }
    }

    #[cfg(not(unix))]
    signal::ctrl_c().await?;

    Ok(())
}
