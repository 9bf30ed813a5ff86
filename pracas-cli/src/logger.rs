//! Logging setup for the `pracas` binary

use std::path::Path;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "pracas=info,pracas_client=info";
const VERBOSE_FILTER: &str = "pracas=debug,pracas_client=debug";

/// Initialize the logger
///
/// `RUST_LOG` wins over the defaults. When `log_dir` names an existing
/// directory, output goes to a daily-rolling file there instead of stderr.
pub fn init_logger(verbose: bool, log_dir: Option<&str>) {
    let default = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir() {
            let file_appender = tracing_appender::rolling::daily(log_path, "pracas");
            subscriber.with_ansi(false).with_writer(file_appender).init();
            return;
        }
    }

    subscriber.with_writer(std::io::stderr).init();
}
