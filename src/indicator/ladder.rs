use crate::indicator::ma::ema;
use crate::indicator::max::rolling_max;
use crate::indicator::min::rolling_min;
use crate::indicator::{highs, lows};
use crate::model::{Candle, LadderLevel};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// 黄蓝梯子 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderConfig {
    /// 파란 밴드 구간 (장기)
    pub long_window: usize,
    /// 노란 밴드 구간 (단기)
    pub short_window: usize,
    /// 밴드 평활 EMA 기간 (1이면 평활하지 않음)
    pub smoothing: usize,
    /// 강세 판정에 필요한 연속 봉 수
    pub strong_run: usize,
    /// 강세 판정에 필요한 최소 캔들 수
    pub strong_min_candles: usize,
}

impl Default for LadderConfig {
    fn default() -> Self {
        LadderConfig {
            long_window: 34,
            short_window: 13,
            smoothing: 3,
            strong_run: 3,
            strong_min_candles: 60,
        }
    }
}

/// 梯子 레벨 계산
///
/// 파란 밴드는 장기 구간의 최고가/최저가, 노란 밴드는 단기 구간의 최고가/최저가이며
/// 네 밴드 모두 같은 EMA로 평활합니다.
///
/// # Arguments
/// * `candles` - 캔들 데이터
/// * `config` - 梯子 설정
///
/// # Returns
/// * `Vec<LadderLevel>` - 캔들당 하나. `long_window`보다 짧으면 빈 벡터
pub fn calculate_ladder(candles: &[Candle], config: &LadderConfig) -> Vec<LadderLevel> {
    if candles.is_empty() || candles.len() < config.long_window {
        debug!(
            "梯子 계산 데이터 부족: 필요 {}개, 제공 {}개",
            config.long_window,
            candles.len()
        );
        return Vec::new();
    }

    let highs = highs(candles);
    let lows = lows(candles);
    let smooth = |series: Vec<f64>| ema(&series, config.smoothing);

    let blue_up = smooth(rolling_max(&highs, config.long_window));
    let blue_dn = smooth(rolling_min(&lows, config.long_window));
    let yellow_up = smooth(rolling_max(&highs, config.short_window));
    let yellow_dn = smooth(rolling_min(&lows, config.short_window));

    candles
        .iter()
        .enumerate()
        .map(|(i, c)| LadderLevel {
            time: c.time,
            blue_up: blue_up[i],
            blue_dn: blue_dn[i],
            yellow_up: yellow_up[i],
            yellow_dn: yellow_dn[i],
        })
        .collect()
}

/// 梯子 강세 여부
///
/// 노란 중간선이 최근 `strong_run`개 봉 연속으로 파란 중간선 위에 있고
/// 최신 종가가 파란 밴드 하단 위에 있으면 true
pub fn is_ladder_strong(candles: &[Candle], config: &LadderConfig) -> bool {
    if candles.len() < config.strong_min_candles {
        return false;
    }

    let ladder = calculate_ladder(candles, config);
    let run = config.strong_run.max(1);
    if ladder.len() < run {
        return false;
    }

    let Some((last_level, last_candle)) = ladder.last().zip(candles.last()) else {
        return false;
    };

    let yellow_leads = ladder[ladder.len() - run..]
        .iter()
        .all(|level| level.yellow_mid() > level.blue_mid());
    let close_above_floor = last_candle.close > last_level.blue_dn;

    trace!(
        "梯子 강세 확인: yellow_leads={}, close_above_floor={}",
        yellow_leads, close_above_floor
    );
    yellow_leads && close_above_floor
}
