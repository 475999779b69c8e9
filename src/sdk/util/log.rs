use env_logger::{Builder, Env};

// The HTTP stack is chatty at debug; keep it quiet unless asked for by name.
const DEFAULT_FILTER: &str = "info,reqwest=warn,hyper_util=warn";

/// Logs to stderr so stdout stays free for command output. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .init();
}
