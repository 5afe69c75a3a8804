use crate::indicator::ma::ema;
use crate::indicator::utils::{is_plunge, is_surge, safe_div};
use crate::model::{Candle, MomentumSignal, MomentumSignalType};
use log::debug;
use serde::{Deserialize, Serialize};

/// 모멘텀 오실레이터 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    /// 계산에 필요한 최소 캔들 수
    pub min_candles: usize,
    /// 원시 모멘텀 평활 EMA 기간 (19 → α = 0.1)
    pub smoothing_period: usize,
    /// double_digit 신호 임계값
    pub double_digit_threshold: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        MomentumConfig {
            min_candles: 20,
            smoothing_period: 19,
            double_digit_threshold: 10.0,
        }
    }
}

/// 봉 하나의 원시 매수/매도 모멘텀
///
/// 양봉은 매수 쪽, 음봉은 매도 쪽에만 값을 가집니다.
fn raw_momentum(candle: &Candle) -> (f64, f64) {
    let change = candle.close - candle.open;
    let weight = candle.volume.max(1) as f64;
    let value = safe_div(change, candle.open).abs() * weight * 1000.0;
    if change > 0.0 {
        (value, 0.0)
    } else if change < 0.0 {
        (0.0, value)
    } else {
        (0.0, 0.0)
    }
}

/// 시리즈 최대값으로 0..100 정규화
fn normalize(values: &[f64]) -> Vec<f64> {
    let max = values.iter().fold(0.0_f64, |a, &b| a.max(b));
    values.iter().map(|&v| safe_div(v, max) * 100.0).collect()
}

/// 매수/매도 모멘텀 계산
///
/// # Arguments
/// * `candles` - 캔들 데이터
/// * `config` - 모멘텀 설정
///
/// # Returns
/// * `Vec<MomentumSignal>` - 캔들당 하나. 최소 캔들 수 미만이면 빈 벡터
pub fn calculate_momentum(candles: &[Candle], config: &MomentumConfig) -> Vec<MomentumSignal> {
    if candles.len() < config.min_candles {
        debug!(
            "모멘텀 계산 데이터 부족: 필요 {}개, 제공 {}개",
            config.min_candles,
            candles.len()
        );
        return Vec::new();
    }

    let (buy_raw, sell_raw): (Vec<f64>, Vec<f64>) = candles.iter().map(raw_momentum).unzip();
    let buy_smooth = ema(&buy_raw, config.smoothing_period);
    let sell_smooth = ema(&sell_raw, config.smoothing_period);

    let diff_raw: Vec<f64> = buy_smooth
        .iter()
        .zip(&sell_smooth)
        .map(|(b, s)| b - s)
        .collect();
    let max_abs_diff = diff_raw.iter().fold(0.0_f64, |a, &b| a.max(b.abs()));

    let buy = normalize(&buy_smooth);
    let sell = normalize(&sell_smooth);
    let diff: Vec<f64> = diff_raw
        .iter()
        .map(|&d| safe_div(d, max_abs_diff) * 100.0)
        .collect();

    let threshold = config.double_digit_threshold;

    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let mut record = MomentumSignal {
                time: c.time,
                buy_momentum: buy[i],
                sell_momentum: sell[i],
                diff: diff[i],
                signal: None,
                weak_to_strong: false,
                strong_to_weak: false,
            };
            if i == 0 {
                return record;
            }

            let cross_up = buy[i - 1] <= sell[i - 1] && buy[i] > sell[i];
            let cross_down = buy[i - 1] >= sell[i - 1] && buy[i] < sell[i];
            let surge = is_surge(diff[i], diff[i - 1]);

            record.signal = if diff[i - 1] <= threshold && diff[i] > threshold {
                Some(MomentumSignalType::DoubleDigitUp)
            } else if diff[i - 1] >= -threshold && diff[i] < -threshold {
                Some(MomentumSignalType::DoubleDigitDown)
            } else if cross_up {
                Some(MomentumSignalType::YellowCrossGreen)
            } else if cross_down {
                Some(MomentumSignalType::GreenToRed)
            } else if surge {
                Some(MomentumSignalType::StrongBuy)
            } else {
                None
            };
            record.weak_to_strong = cross_up && surge;
            record.strong_to_weak = cross_down && is_plunge(diff[i], diff[i - 1]);
            record
        })
        .collect()
}
