//! Coordination helpers for long-running passes

pub mod shutdown;

pub use shutdown::{install_signal_handlers, GracefulShutdown, ShutdownListener};
