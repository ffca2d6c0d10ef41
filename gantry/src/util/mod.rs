//! Runtime support utilities.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the process-wide tracing subscriber.
///
/// Filter directives come from `GANTRY_LOG` (defaulting to `info`).
/// Safe to call more than once; only the first install wins, so
/// embedders and test binaries can both call it unconditionally.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("GANTRY_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}
