use common_test_utils::*;

use stock_signal::analyzer::cd_analyzer::cd_label;
use stock_signal::analyzer::{CdConfig, calculate_cd_divergence_signals, calculate_cd_signals};
use stock_signal::indicator::macd::MacdParams;
use stock_signal::model::SignalType;

#[test]
fn test_short_series_is_empty() {
    let candles = create_peak_candles(29, 14, 100.0, 1.0);
    let signals = calculate_cd_signals(&candles, &MacdParams::default(), &CdConfig::default());
    assert!(signals.is_empty());
}

#[test]
fn test_peak_produces_sell_signal() {
    let candles = create_peak_candles(80, 40, 100.0, 1.0);
    let signals = calculate_cd_signals(&candles, &MacdParams::default(), &CdConfig::default());

    assert!(signals.iter().any(|s| s.signal_type == SignalType::Sell));
}

#[test]
fn test_signal_fields_are_consistent() {
    let candles = create_wave_candles(120, 12, 100.0, 1.0);
    let signals = calculate_cd_signals(&candles, &MacdParams::default(), &CdConfig::default());
    assert!(!signals.is_empty());

    let last_time = candles.last().unwrap().time;
    for signal in &signals {
        // 마지막 봉에는 신호가 없음
        assert_ne!(signal.time, last_time);
        assert_eq!(signal.label, cd_label(signal.signal_type, signal.strength));

        let histogram = signal.macd_value.unwrap();
        match signal.signal_type {
            SignalType::Buy => assert!(histogram < 0.0),
            SignalType::Sell => assert!(histogram > 0.0),
        }
    }

    assert!(signals.windows(2).all(|w| w[0].time < w[1].time));
}

#[test]
fn test_flat_series_has_no_signals() {
    let candles = create_flat_candles(50, 10.0);
    let signals = calculate_cd_signals(&candles, &MacdParams::default(), &CdConfig::default());
    assert!(signals.is_empty());
}

#[test]
fn test_idempotent() {
    let candles = create_wave_candles(90, 10, 50.0, 0.5);
    let params = MacdParams::default();
    let config = CdConfig::default();
    assert_eq!(
        calculate_cd_signals(&candles, &params, &config),
        calculate_cd_signals(&candles, &params, &config)
    );
}

#[test]
fn test_divergence_variant_short_series() {
    let candles = create_uptrend_candles(10, 100.0, 1.0);
    let signals =
        calculate_cd_divergence_signals(&candles, &MacdParams::default(), &CdConfig::default());
    assert!(signals.is_empty());
}

#[test]
fn test_divergence_fixtures_fire_once() {
    let (params, config) = (MacdParams::default(), CdConfig::default());

    let bottom = calculate_cd_divergence_signals(
        &create_bottom_divergence_candles(),
        &params,
        &config,
    );
    assert_eq!(bottom.len(), 1);
    assert_eq!(bar_index(bottom[0].time), 46);
    assert_eq!(bottom[0].signal_type, SignalType::Buy);
    assert_eq!(bottom[0].label, "抄底");

    let top =
        calculate_cd_divergence_signals(&create_top_divergence_candles(), &params, &config);
    assert_eq!(top.len(), 1);
    assert_eq!(bar_index(top[0].time), 37);
    assert_eq!(top[0].signal_type, SignalType::Sell);
    assert_eq!(top[0].label, "卖出");
}
