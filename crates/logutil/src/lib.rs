//! Utilities for logging.

use tracing::Level;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

/// Output format for the global subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggingMode {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Map a `-v` count to the default log level.
///
/// Zero is info, one is debug, anything higher is trace.
pub fn level_for_verbosity(verbose: u8) -> Level {
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Dependencies that are very chatty below info.
const CAPPED_TARGETS: [&str; 4] = ["h2", "hyper", "hyper_util", "reqwest"];

/// Whether a `RUST_LOG` style directive string sets a level for `target` or
/// one of its modules.
fn names_target(directives: &str, target: &str) -> bool {
    directives.split(',').any(|directive| {
        let name = directive.split(['=', '[']).next().unwrap_or_default().trim();
        name == target
            || name
                .strip_prefix(target)
                .is_some_and(|rest| rest.starts_with("::"))
    })
}

/// Capped targets that `directives` doesn't already mention.
fn targets_to_cap(directives: Option<&str>) -> Vec<&'static str> {
    CAPPED_TARGETS
        .into_iter()
        .filter(|target| !directives.is_some_and(|d| names_target(d, target)))
        .collect()
}

/// Build the env filter used by the global subscriber.
///
/// `RUST_LOG` takes precedence over the default level. HTTP internals are
/// capped at info unless `RUST_LOG` names them.
pub fn env_filter(level: Level) -> EnvFilter {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let mut filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    for target in targets_to_cap(rust_log.as_deref()) {
        if let Ok(directive) = format!("{target}=info").parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }

    filter
}

/// Configure the global logger.
///
/// Does nothing if a global subscriber has already been set.
pub fn init(verbose: u8, mode: LoggingMode) {
    let _ = try_init(verbose, mode);
}

/// Configure the global logger, returning an error if one is already set.
pub fn try_init(verbose: u8, mode: LoggingMode) -> Result<(), SetGlobalDefaultError> {
    let filter = env_filter(level_for_verbosity(verbose));

    match mode {
        LoggingMode::Pretty => {
            let subscriber = tracing_subscriber::FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_file(true)
                .with_line_number(true)
                .pretty()
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        LoggingMode::Json => {
            let subscriber = tracing_subscriber::FmtSubscriber::builder()
                .with_env_filter(filter)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        LoggingMode::Compact => {
            let subscriber = tracing_subscriber::FmtSubscriber::builder()
                .with_env_filter(filter)
                .compact()
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(Level::INFO, level_for_verbosity(0));
        assert_eq!(Level::DEBUG, level_for_verbosity(1));
        assert_eq!(Level::TRACE, level_for_verbosity(2));
        assert_eq!(Level::TRACE, level_for_verbosity(7));
    }

    #[test]
    fn caps_unnamed_targets() {
        assert_eq!(CAPPED_TARGETS.to_vec(), targets_to_cap(None));
        assert_eq!(CAPPED_TARGETS.to_vec(), targets_to_cap(Some("debug,tracker=trace")));
    }

    #[test]
    fn rust_log_overrides_caps() {
        assert_eq!(
            vec!["h2", "hyper_util"],
            targets_to_cap(Some("debug, hyper=trace,reqwest::connect=debug"))
        );
        assert_eq!(
            vec!["h2", "hyper_util", "reqwest"],
            targets_to_cap(Some("hyper[request]=debug"))
        );
        // Sharing a prefix with a capped crate isn't a match.
        assert_eq!(
            vec!["h2", "hyper", "hyper_util", "reqwest"],
            targets_to_cap(Some("hyperion=debug"))
        );
    }

    #[test]
    fn second_init_is_rejected() {
        let _ = try_init(0, LoggingMode::Compact);
        assert!(try_init(0, LoggingMode::Compact).is_err());
    }
}
