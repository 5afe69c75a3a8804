// 고전 CD 공식 (DXDX 抄底 / DBJGXC 卖出)
//
// 히스토그램 골든/데드 크로스 이후 경과 봉 수로 현재 및 이전 두 구간을 나누고,
// 구간별 종가와 DIFF 극값을 비교하여 바닥/천장 다이버전스를 찾습니다.
// 다이버전스가 "닫히기" 시작하는 첫 봉에서 신호가 발생합니다.

use crate::analyzer::cd_analyzer::CdConfig;
use crate::indicator::closes;
use crate::indicator::macd::{MacdParams, calculate_macd};
use crate::indicator::max::highest;
use crate::indicator::min::lowest;
use crate::indicator::utils::{bars_last, ref_value};
use crate::model::{CDSignal, Candle, SignalType, Strength};
use log::debug;

/// 한 구간 기준 레벨 묶음 (현재, 이전, 그 이전)
struct Legs {
    first: Vec<f64>,
    second: Vec<f64>,
    third: Vec<f64>,
}

impl Legs {
    /// 현재 구간 값 시리즈를 `shift + 1` 봉씩 두 번 거슬러 올라가 이전 구간 값을 구함
    fn build(current: Vec<f64>, shift: &[usize]) -> Legs {
        let n = current.len();
        let second: Vec<f64> = (0..n)
            .map(|i| ref_value(&current, i, shift[i] + 1))
            .collect();
        let third: Vec<f64> = (0..n)
            .map(|i| ref_value(&second, i, shift[i] + 1))
            .collect();
        Legs {
            first: current,
            second,
            third,
        }
    }
}

/// 상승 에지 (직전 false, 현재 true)
fn rising_edges(flags: &[bool]) -> Vec<bool> {
    (0..flags.len())
        .map(|i| i > 0 && !flags[i - 1] && flags[i])
        .collect()
}

/// 고전 CD 다이버전스 신호 계산
///
/// # Arguments
/// * `candles` - 캔들 데이터
/// * `macd_params` - MACD 파라미터
/// * `config` - 최소 캔들 수에 사용되는 CD 설정
///
/// # Returns
/// * `Vec<CDSignal>` - `抄底`(매수) / `卖出`(매도), 강도는 항상 strong
pub fn calculate_cd_divergence_signals(
    candles: &[Candle],
    macd_params: &MacdParams,
    config: &CdConfig,
) -> Vec<CDSignal> {
    let n = candles.len();
    if n < config.min_candles {
        return Vec::new();
    }

    let series = calculate_macd(candles, macd_params);
    let (diff, dea, macd) = (&series.diff, &series.dea, &series.macd);
    let close = closes(candles);

    let death_cross: Vec<bool> = (0..n)
        .map(|i| i > 0 && macd[i - 1] >= 0.0 && macd[i] < 0.0)
        .collect();
    let golden_cross: Vec<bool> = (0..n)
        .map(|i| i > 0 && macd[i - 1] <= 0.0 && macd[i] > 0.0)
        .collect();

    // 데드 크로스/골든 크로스 이후 경과 봉 수
    let since_death: Vec<usize> = (0..n).map(|i| bars_last(&death_cross, i)).collect();
    let since_golden: Vec<usize> = (0..n).map(|i| bars_last(&golden_cross, i)).collect();

    let close_low = Legs::build(
        (0..n).map(|i| lowest(&close, i, since_death[i] + 1)).collect(),
        &since_golden,
    );
    let diff_low = Legs::build(
        (0..n).map(|i| lowest(diff, i, since_death[i] + 1)).collect(),
        &since_golden,
    );
    let close_high = Legs::build(
        (0..n).map(|i| highest(&close, i, since_golden[i] + 1)).collect(),
        &since_death,
    );
    let diff_high = Legs::build(
        (0..n).map(|i| highest(diff, i, since_golden[i] + 1)).collect(),
        &since_death,
    );

    // 바닥 다이버전스: 가격은 신저가, DIFF 저점은 상승
    let bottom_divergence: Vec<bool> = (0..n)
        .map(|i| {
            if i == 0 || macd[i - 1] >= 0.0 || diff[i] >= 0.0 {
                return false;
            }
            let direct = close_low.first[i] < close_low.second[i]
                && diff_low.first[i] > diff_low.second[i];
            let skipped = close_low.first[i] < close_low.third[i]
                && diff_low.first[i] < diff_low.second[i]
                && diff_low.first[i] > diff_low.third[i];
            direct || skipped
        })
        .collect();

    // 천장 다이버전스: 가격은 신고가, DIFF 고점은 하락
    let top_divergence: Vec<bool> = (0..n)
        .map(|i| {
            if i == 0 || macd[i - 1] <= 0.0 || diff[i] <= 0.0 {
                return false;
            }
            let direct = close_high.first[i] > close_high.second[i]
                && diff_high.first[i] < diff_high.second[i];
            let skipped = close_high.first[i] > close_high.third[i]
                && diff_high.first[i] > diff_high.second[i]
                && diff_high.first[i] < diff_high.third[i];
            direct || skipped
        })
        .collect();

    // 다이버전스 상태에서 DIFF 절대값이 줄어들기 시작한 봉
    let bottom_closing: Vec<bool> = (0..n)
        .map(|i| i > 0 && bottom_divergence[i - 1] && diff[i - 1].abs() >= diff[i].abs() * 1.01)
        .collect();
    let top_closing: Vec<bool> = (0..n)
        .map(|i| i > 0 && top_divergence[i - 1] && diff[i - 1].abs() <= diff[i].abs() * 0.99)
        .collect();

    let buy = rising_edges(&bottom_closing);
    let sell = rising_edges(&top_closing);

    let signals: Vec<CDSignal> = (0..n)
        .filter_map(|i| {
            let (signal_type, label) = if buy[i] {
                (SignalType::Buy, "抄底")
            } else if sell[i] {
                (SignalType::Sell, "卖出")
            } else {
                return None;
            };
            Some(CDSignal {
                time: candles[i].time,
                signal_type,
                strength: Strength::Strong,
                label: label.to_owned(),
                diff_value: Some(diff[i]),
                dea_value: Some(dea[i]),
                macd_value: Some(macd[i]),
            })
        })
        .collect();

    debug!("고전 CD 신호 {}개 탐지", signals.len());
    signals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rising_edges() {
        assert_eq!(
            rising_edges(&[true, true, false, true, true]),
            vec![false, false, false, true, false]
        );
    }

    #[test]
    fn test_short_series_is_empty() {
        let candles: Vec<Candle> = (0..29)
            .map(|i| Candle::new(i, 10.0, 11.0, 9.0, 10.0, 1))
            .collect();
        assert!(
            calculate_cd_divergence_signals(&candles, &MacdParams::default(), &CdConfig::default())
                .is_empty()
        );
    }

    #[test]
    fn test_signals_have_classic_labels() {
        let candles: Vec<Candle> = (0..200)
            .map(|i| {
                let t = i as f64;
                let close = 50.0 + 10.0 * (t / 9.0).sin() - t * 0.05;
                Candle::new(i, close, close + 0.5, close - 0.5, close, 100)
            })
            .collect();
        let signals =
            calculate_cd_divergence_signals(&candles, &MacdParams::default(), &CdConfig::default());
        assert!(!signals.is_empty());
        for s in &signals {
            match s.signal_type {
                SignalType::Buy => assert_eq!(s.label, "抄底"),
                SignalType::Sell => assert_eq!(s.label, "卖出"),
            }
            assert_eq!(s.strength, Strength::Strong);
        }
    }
}
