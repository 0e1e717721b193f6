use std::io::Write;

use tickwise::load_config;
use tickwise::models::{ProviderKind, TickwiseConfig};

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, TickwiseConfig::default());
}

#[test]
fn partial_file_keeps_other_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[data]
default_ticker = "AAPL"
retry_backoff_ms = 250

[llm]
primary = "openai"
max_tool_rounds = 5
"#
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.data.default_ticker, "AAPL");
    assert_eq!(config.data.retry_backoff_ms, 250);
    assert_eq!(config.data.benchmark, "SPY");
    assert_eq!(config.data.history_sessions, 60);
    assert_eq!(config.llm.primary, ProviderKind::OpenAi);
    assert_eq!(config.llm.secondary, ProviderKind::OpenAi);
    assert_eq!(config.llm.max_tool_rounds, 5);
    assert_eq!(config.report.reasoning_max_chars, 1024);
}

#[test]
fn malformed_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[llm]\nprimary = \"gemini\"").unwrap();

    let err = load_config(file.path()).unwrap_err();

    assert!(format!("{err:#}").contains("Failed to parse config"));
}

#[test]
fn sample_config_parses() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/tickwise.toml");
    let config = load_config(path).unwrap();
    assert_eq!(config, TickwiseConfig::default());
}
