use std::collections::HashMap;
use std::io::Write;
use stock_signal::config::EngineConfig;
use stock_signal::config_loader::{ConfigError, ConfigFormat, ConfigLoader};
use tempfile::{Builder, NamedTempFile};

fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_toml_file_round_trip() {
    let mut config = EngineConfig::default();
    config.cd.lookback = 40;
    config.ladder.long_window = 55;
    config.screener.batch_size = 5;

    let file = Builder::new().suffix(".toml").tempfile().unwrap();
    ConfigLoader::save_to_file(&config, file.path(), ConfigFormat::Auto).unwrap();

    let loaded: EngineConfig =
        ConfigLoader::load_from_file(file.path(), ConfigFormat::Auto).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_file_round_trip() {
    let mut config = EngineConfig::default();
    config.advanced_chan.zigzag_pct = 2.5;

    let file = Builder::new().suffix(".json").tempfile().unwrap();
    ConfigLoader::save_to_file(&config, file.path(), ConfigFormat::Auto).unwrap();

    let loaded: EngineConfig =
        ConfigLoader::load_from_file(file.path(), ConfigFormat::Auto).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_partial_file_uses_defaults() {
    let file = temp_file(".toml", "[macd]\nfast_period = 8\n");
    let loaded: EngineConfig =
        ConfigLoader::load_from_file(file.path(), ConfigFormat::Auto).unwrap();

    assert_eq!(loaded.macd.fast_period, 8);
    assert_eq!(loaded.macd.slow_period, 26);
    assert_eq!(loaded.momentum, EngineConfig::default().momentum);
}

#[test]
fn test_validation_failure() {
    let file = temp_file(".json", r#"{"macd": {"fast_period": 30, "slow_period": 26}}"#);
    let result: Result<EngineConfig, _> =
        ConfigLoader::load_from_file(file.path(), ConfigFormat::Auto);
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_parse_failure() {
    let file = temp_file(".toml", "[macd\nfast_period = ");
    let result: Result<EngineConfig, _> =
        ConfigLoader::load_from_file(file.path(), ConfigFormat::Auto);
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_unknown_extension() {
    let file = temp_file(".yaml", "macd: {}");
    let result: Result<EngineConfig, _> =
        ConfigLoader::load_from_file(file.path(), ConfigFormat::Auto);
    assert!(matches!(result, Err(ConfigError::FileError(_))));
}

#[test]
fn test_missing_file() {
    let result: Result<EngineConfig, _> = ConfigLoader::load_from_file(
        std::path::Path::new("/nonexistent/engine.toml"),
        ConfigFormat::Toml,
    );
    assert!(matches!(result, Err(ConfigError::FileError(_))));
}

#[test]
fn test_string_auto_detects_format() {
    let json: EngineConfig =
        ConfigLoader::load_from_string(r#"{"cd": {"lookback": 20}}"#, ConfigFormat::Auto).unwrap();
    assert_eq!(json.cd.lookback, 20);

    let toml: EngineConfig =
        ConfigLoader::load_from_string("[cd]\nlookback = 25\n", ConfigFormat::Auto).unwrap();
    assert_eq!(toml.cd.lookback, 25);
}

#[test]
fn test_load_from_map() {
    let mut map = HashMap::new();
    map.insert(
        "screener".to_string(),
        serde_json::json!({"batch_size": 3}),
    );
    let config: EngineConfig = ConfigLoader::load_from_map(&map).unwrap();
    assert_eq!(config.screener.batch_size, 3);
    assert_eq!(config.screener.min_candles, 30);

    map.insert("screener".to_string(), serde_json::json!({"batch_size": 0}));
    let result: Result<EngineConfig, _> = ConfigLoader::load_from_map(&map);
    assert!(result.is_err());
}
