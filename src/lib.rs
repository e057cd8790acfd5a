//! Client-side core of a prontuário (clinical records) system.
//!
//! The crate covers everything between the forms and the wire: a typed client
//! for the records API, the per-step validation schemas, the treatment-status
//! state machine, and the controllers that drive record creation, editing and
//! the tabbed detail view with its append/refresh protocol. Rendering, page
//! routing and credential storage belong to the embedding application.

pub mod client;
pub mod config;
pub mod create;
pub mod detail;
pub mod edit;
pub mod forms;
pub mod models;
pub mod status;
pub mod validation;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries and test harnesses embedding this crate.
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}
