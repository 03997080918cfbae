//! Tracing setup
//!
//! The subscriber is installed before configuration is read, so messages
//! from config loading are not lost. The configured level is applied
//! afterwards through a reload handle, unless `RUST_LOG` pins the filter.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Level used until the configuration has been read
pub const STARTUP_LEVEL: &str = "info";

/// Filter directives for a configured level
pub fn filter_directives(level: &str) -> String {
    format!("deckhand_session={level},deckhand_common={level},tower_http=info")
}

/// Handle for changing the log level after startup
pub struct LogLevelHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    pinned: bool,
}

impl LogLevelHandle {
    /// Apply `level`; no effect when the filter came from `RUST_LOG`
    pub fn set_level(&self, level: &str) -> Result<(), reload::Error> {
        if self.pinned {
            return Ok(());
        }
        self.handle.reload(EnvFilter::new(filter_directives(level)))
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }
}

/// Build the reloadable filter layer
///
/// `env_filter` is the filter parsed from the environment, if any; it
/// takes priority over `default_level` and is never replaced.
pub fn reloadable_filter(
    env_filter: Option<EnvFilter>,
    default_level: &str,
) -> (reload::Layer<EnvFilter, Registry>, LogLevelHandle) {
    let pinned = env_filter.is_some();
    let filter = env_filter.unwrap_or_else(|| EnvFilter::new(filter_directives(default_level)));
    let (layer, handle) = reload::Layer::new(filter);
    (layer, LogLevelHandle { handle, pinned })
}

/// Install the global subscriber at [`STARTUP_LEVEL`]
pub fn init() -> LogLevelHandle {
    let (filter, handle) =
        reloadable_filter(EnvFilter::try_from_default_env().ok(), STARTUP_LEVEL);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    handle
}
