use crate::indicator::closes;
use crate::indicator::ma::ema;
use crate::model::{Candle, NXSignal, SignalType};
use log::debug;
use serde::{Deserialize, Serialize};

/// NX(EMA 교차 + 거래량 확인) 신호 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NxConfig {
    /// 계산에 필요한 최소 캔들 수
    pub min_candles: usize,
    /// 빠른 EMA 기간
    pub fast_period: usize,
    /// 느린 EMA 기간
    pub slow_period: usize,
    /// 거래량 EMA 기간
    pub volume_period: usize,
    /// 매수 교차에 필요한 거래량 배수
    pub volume_ratio: f64,
    /// 스크리닝 시 확인할 최근 봉 수
    pub recent_bars: usize,
}

impl Default for NxConfig {
    fn default() -> Self {
        NxConfig {
            min_candles: 20,
            fast_period: 5,
            slow_period: 10,
            volume_period: 10,
            volume_ratio: 1.5,
            recent_bars: 5,
        }
    }
}

/// NX 신호 라벨
pub fn nx_label(signal_type: SignalType) -> &'static str {
    match signal_type {
        SignalType::Buy => "买入",
        SignalType::Sell => "卖出",
    }
}

/// 빠른 EMA/느린 EMA 교차로 NX 신호 탐지
///
/// 상향 교차는 거래량이 거래량 EMA의 `volume_ratio`배를 넘을 때만 매수이고,
/// 하향 교차는 거래량과 무관하게 매도입니다.
///
/// # Arguments
/// * `candles` - 캔들 데이터 (시간 오름차순)
/// * `config` - NX 설정
///
/// # Returns
/// * `Vec<NXSignal>` - 시간 오름차순 신호. 최소 캔들 수 미만이면 빈 벡터
pub fn calculate_nx_signals(candles: &[Candle], config: &NxConfig) -> Vec<NXSignal> {
    if candles.len() < config.min_candles {
        debug!(
            "NX 계산 데이터 부족: 필요 {}개, 제공 {}개",
            config.min_candles,
            candles.len()
        );
        return Vec::new();
    }

    let closes = closes(candles);
    let volumes: Vec<f64> = candles.iter().map(Candle::volume_f64).collect();
    let fast = ema(&closes, config.fast_period);
    let slow = ema(&closes, config.slow_period);
    let volume_ema = ema(&volumes, config.volume_period);

    let signals: Vec<NXSignal> = (1..candles.len())
        .filter_map(|i| {
            let crossed_up = fast[i] > slow[i] && fast[i - 1] <= slow[i - 1];
            let crossed_down = fast[i] < slow[i] && fast[i - 1] >= slow[i - 1];

            let signal_type = if crossed_up && volumes[i] > volume_ema[i] * config.volume_ratio {
                SignalType::Buy
            } else if crossed_down {
                SignalType::Sell
            } else {
                return None;
            };
            Some(NXSignal {
                time: candles[i].time,
                signal_type,
                label: nx_label(signal_type).to_owned(),
            })
        })
        .collect();

    debug!("NX 신호 {}개 탐지", signals.len());
    signals
}
