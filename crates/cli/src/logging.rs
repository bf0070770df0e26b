use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const DEFAULT_FILTER: &str = "oapi_split=info,oapi_split_cli=info,oapi_split_core=warn";

/// Install the stderr subscriber.
///
/// `OAPI_SPLIT_LOG` takes a plain level ("debug") applied to this tool's
/// crates, or a full filter spec like "oapi_split_core=trace". A spec that
/// does not parse falls back to the default filter with a warning.
pub fn init_tracing() {
    let spec = filter_spec(std::env::var("OAPI_SPLIT_LOG").ok().as_deref());
    let (filter, rejected) = env_filter(&spec);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(filter);

    if tracing_subscriber::registry().with(fmt_layer).try_init().is_err() {
        eprintln!("Warning: tracing subscriber already initialized");
        return;
    }
    if let Some(err) = rejected {
        tracing::warn!(%spec, %err, "ignoring invalid OAPI_SPLIT_LOG filter");
    }
}

fn filter_spec(var: Option<&str>) -> String {
    match var {
        Some(level) if is_plain_level(level) => {
            format!("oapi_split={level},oapi_split_cli={level},oapi_split_core={level}")
        }
        Some(spec) => spec.to_string(),
        None => DEFAULT_FILTER.to_string(),
    }
}

/// Parse `spec`, falling back to [`DEFAULT_FILTER`] and returning the parse
/// error alongside.
fn env_filter(spec: &str) -> (EnvFilter, Option<String>) {
    match EnvFilter::try_new(spec) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new(DEFAULT_FILTER), Some(err.to_string())),
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_level_expands_to_crates() {
        assert_eq!(
            filter_spec(Some("DEBUG")),
            "oapi_split=DEBUG,oapi_split_cli=DEBUG,oapi_split_core=DEBUG"
        );
    }

    #[test]
    fn test_full_spec_passes_through() {
        assert_eq!(filter_spec(Some("oapi_split_core=trace")), "oapi_split_core=trace");
        assert_eq!(filter_spec(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_invalid_spec_falls_back_to_default() {
        let (_, rejected) = env_filter("oapi_split_core=loud");
        assert!(rejected.is_some());
        let (_, accepted) = env_filter(&filter_spec(Some("debug")));
        assert!(accepted.is_none());
    }
}
