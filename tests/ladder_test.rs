use common_test_utils::*;

use stock_signal::indicator::ladder::{LadderConfig, calculate_ladder, is_ladder_strong};

#[test]
fn test_ladder_length() {
    let config = LadderConfig::default();
    assert!(calculate_ladder(&create_uptrend_candles(33, 10.0, 0.5), &config).is_empty());

    let candles = create_uptrend_candles(50, 10.0, 0.5);
    let ladder = calculate_ladder(&candles, &config);
    assert_eq!(ladder.len(), 50);
    assert!(ladder.iter().zip(&candles).all(|(l, c)| l.time == c.time));
}

#[test]
fn test_band_ordering() {
    let candles = create_wave_candles(100, 10, 50.0, 1.0);
    let ladder = calculate_ladder(&candles, &LadderConfig::default());
    for level in &ladder {
        assert!(level.blue_up >= level.blue_dn);
        assert!(level.yellow_up >= level.yellow_dn);
        // 장기 구간 밴드가 단기 구간 밴드를 감쌈
        assert!(level.blue_up + 1e-9 >= level.yellow_up);
        assert!(level.blue_dn <= level.yellow_dn + 1e-9);
    }
}

#[test]
fn test_uptrend_is_strong() {
    let candles = create_uptrend_candles(80, 10.0, 0.5);
    assert!(is_ladder_strong(&candles, &LadderConfig::default()));
}

#[test]
fn test_downtrend_is_not_strong() {
    let candles = create_downtrend_candles(80, 100.0, 0.5);
    assert!(!is_ladder_strong(&candles, &LadderConfig::default()));
}

#[test]
fn test_strong_requires_history() {
    let candles = create_uptrend_candles(59, 10.0, 0.5);
    assert!(!is_ladder_strong(&candles, &LadderConfig::default()));
}
