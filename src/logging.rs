//! Diagnostic logging for the command-line tool.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Install a compact stderr subscriber. `RUST_LOG` takes precedence over
/// `level`. Calling this twice keeps the first subscriber.
pub fn init(level: &str) -> Result<(), ParseError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .try_init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_level() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(init("modbound=verbose").is_err());
        }
    }
}
