use crate::indicator::utils::{is_plunge, is_surge, safe_div};
use crate::model::{BuySellPressure, Candle, PressureSignal};
use log::debug;
use serde::{Deserialize, Serialize};

/// 매수/매도 압력 오실레이터 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureConfig {
    /// 계산에 필요한 최소 캔들 수
    pub min_candles: usize,
}

impl Default for PressureConfig {
    fn default() -> Self {
        PressureConfig { min_candles: 20 }
    }
}

/// 캔들 하나의 부호 있는 압력
///
/// 종가가 봉 범위의 어디에 있는지(-1..1)에 거래량을 곱합니다.
/// 고가와 저가가 같으면 0.0
pub fn bar_pressure(candle: &Candle) -> f64 {
    let range = candle.range();
    if range <= 0.0 {
        return 0.0;
    }
    let location = 2.0 * (candle.close - candle.low) / range - 1.0;
    candle.volume_f64() * location
}

/// 캔들 시리즈의 매수/매도 압력 계산
///
/// # Arguments
/// * `candles` - 캔들 데이터 (시간 오름차순)
/// * `config` - 압력 설정
///
/// # Returns
/// * `Vec<BuySellPressure>` - 캔들당 하나. 최소 캔들 수 미만이면 빈 벡터
pub fn calculate_buy_sell_pressure(
    candles: &[Candle],
    config: &PressureConfig,
) -> Vec<BuySellPressure> {
    if candles.len() < config.min_candles {
        debug!(
            "압력 계산 데이터 부족: 필요 {}개, 제공 {}개",
            config.min_candles,
            candles.len()
        );
        return Vec::new();
    }

    let times: Vec<i64> = candles.iter().map(|c| c.time).collect();
    let values: Vec<f64> = candles.iter().map(bar_pressure).collect();
    classify_pressures(&times, &values)
}

/// 미리 계산된 압력 값으로 레코드 생성
///
/// 변화율과 급증/급락 신호를 붙입니다. 길이가 다르면 짧은 쪽에 맞춥니다.
pub fn classify_pressures(times: &[i64], values: &[f64]) -> Vec<BuySellPressure> {
    times
        .iter()
        .zip(values)
        .enumerate()
        .map(|(i, (&time, &pressure))| {
            let prev = if i > 0 { values[i - 1] } else { 0.0 };
            let change_rate = if i == 0 {
                0.0
            } else {
                safe_div(pressure - prev, prev.abs()) * 100.0
            };

            let signal = if i == 0 {
                None
            } else if is_surge(pressure, prev) {
                Some(PressureSignal::StrongUp)
            } else if is_plunge(pressure, prev) {
                Some(PressureSignal::StrongDown)
            } else {
                None
            };

            BuySellPressure {
                time,
                pressure,
                change_rate,
                signal,
            }
        })
        .collect()
}
