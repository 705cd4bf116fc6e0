// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is unset: this crate at info (debug with `--verbose`),
/// HTTP and PDF dependencies only when they warn.
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "warn,labsheet=debug"
    } else {
        "warn,labsheet=info"
    }
}

/// Installs the tracing subscriber. `RUST_LOG` wins over `--verbose` when set.
/// Logs go to stderr so the record table on stdout can be piped.
pub fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Logging setup complete.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        for verbose in [false, true] {
            let directives = default_directives(verbose);
            assert!(directives.parse::<EnvFilter>().is_ok(), "bad filter {:?}", directives);
        }
        assert!(default_directives(true).contains("labsheet=debug"));
        assert!(default_directives(false).contains("labsheet=info"));
    }
}
