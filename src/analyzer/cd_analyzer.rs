use crate::indicator::macd::{MacdParams, MacdSeries, calculate_macd};
use crate::indicator::utils::moving_average;
use crate::model::{CDSignal, Candle, SignalType, Strength};
use log::debug;
use serde::{Deserialize, Serialize};

/// CD(抄底/逃顶) 신호 탐지 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdConfig {
    /// 계산에 필요한 최소 캔들 수
    pub min_candles: usize,
    /// 강도 계산에 쓰는 히스토그램 표준편차 구간
    pub lookback: usize,
    /// 강한 신호 z-score 기준
    pub strong_z: f64,
    /// 보통 신호 z-score 기준
    pub medium_z: f64,
}

impl Default for CdConfig {
    fn default() -> Self {
        CdConfig {
            min_candles: 30,
            lookback: 30,
            strong_z: 2.0,
            medium_z: 1.0,
        }
    }
}

impl CdConfig {
    /// z-score를 신호 강도로 변환
    pub fn classify(&self, z: f64) -> Strength {
        if z >= self.strong_z {
            Strength::Strong
        } else if z >= self.medium_z {
            Strength::Medium
        } else {
            Strength::Weak
        }
    }
}

/// 신호 종류와 강도에 맞는 라벨
pub fn cd_label(signal_type: SignalType, strength: Strength) -> &'static str {
    match (signal_type, strength) {
        (SignalType::Buy, Strength::Strong) => "强抄底",
        (SignalType::Buy, Strength::Medium) => "抄底",
        (SignalType::Buy, Strength::Weak) => "弱抄底",
        (SignalType::Sell, Strength::Strong) => "强逃顶",
        (SignalType::Sell, Strength::Medium) => "逃顶",
        (SignalType::Sell, Strength::Weak) => "弱逃顶",
    }
}

/// 히스토그램 지역 극값 판정
///
/// 음수 구간의 지역 최저점은 매수, 양수 구간의 지역 최고점은 매도 후보입니다.
/// 양옆 값이 모두 필요하므로 첫 봉과 마지막 봉은 후보가 될 수 없습니다.
fn turning_point(macd: &[f64], index: usize) -> Option<SignalType> {
    if index == 0 || index + 1 >= macd.len() {
        return None;
    }
    let (prev, curr, next) = (macd[index - 1], macd[index], macd[index + 1]);
    if curr < 0.0 && prev > curr && curr < next {
        Some(SignalType::Buy)
    } else if curr > 0.0 && prev < curr && curr > next {
        Some(SignalType::Sell)
    } else {
        None
    }
}

/// 인덱스 `index`에서 끝나는 구간의 히스토그램 z-score
fn histogram_z_score(macd: &[f64], index: usize, lookback: usize) -> f64 {
    let start = (index + 1).saturating_sub(lookback.max(1));
    let std = moving_average::std_dev(&macd[start..=index]);
    if std > 0.0 { macd[index].abs() / std } else { 0.0 }
}

/// MACD 히스토그램에서 CD 신호 탐지
///
/// # Arguments
/// * `candles` - 캔들 데이터 (시간 오름차순)
/// * `macd_params` - MACD 파라미터
/// * `config` - CD 설정
///
/// # Returns
/// * `Vec<CDSignal>` - 시간 오름차순 신호. 최소 캔들 수 미만이면 빈 벡터
pub fn calculate_cd_signals(
    candles: &[Candle],
    macd_params: &MacdParams,
    config: &CdConfig,
) -> Vec<CDSignal> {
    if candles.len() < config.min_candles {
        debug!(
            "CD 계산 데이터 부족: 필요 {}개, 제공 {}개",
            config.min_candles,
            candles.len()
        );
        return Vec::new();
    }

    let series = calculate_macd(candles, macd_params);
    detect_cd_signals(candles, &series, config)
}

/// 미리 계산된 MACD 시리즈로 CD 신호 탐지
pub fn detect_cd_signals(
    candles: &[Candle],
    series: &MacdSeries,
    config: &CdConfig,
) -> Vec<CDSignal> {
    let n = candles.len().min(series.len());
    let macd = &series.macd[..n];

    (1..n.saturating_sub(1))
        .filter_map(|i| {
            let signal_type = turning_point(macd, i)?;
            let z = histogram_z_score(macd, i, config.lookback);
            let strength = config.classify(z);
            debug!(
                "CD 신호: t={}, {:?}, z={:.2}, 강도={}",
                candles[i].time, signal_type, z, strength
            );
            Some(CDSignal {
                time: candles[i].time,
                signal_type,
                strength,
                label: cd_label(signal_type, strength).to_owned(),
                diff_value: Some(series.diff[i]),
                dea_value: Some(series.dea[i]),
                macd_value: Some(series.macd[i]),
            })
        })
        .collect()
}
