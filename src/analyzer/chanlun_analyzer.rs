use crate::analyzer::kline_merge::{Fractal, MergedSeries};
use crate::indicator::macd::{MacdParams, calculate_macd};
use crate::model::{Candle, ChanLunSignal, FractalType, SignalType, Strength};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// 缠论 분형/다이버전스 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChanConfig {
    /// 계산에 필요한 최소 캔들 수
    pub min_candles: usize,
    /// 강한 다이버전스 가격 변화 기준 (비율)
    pub strong_price_move: f64,
    /// 강한 다이버전스 히스토그램 변화 기준 (비율)
    pub strong_macd_change: f64,
    /// 보통 다이버전스 가격 변화 기준 (비율)
    pub medium_price_move: f64,
    /// 보통 다이버전스 히스토그램 변화 기준 (비율)
    pub medium_macd_change: f64,
}

impl Default for ChanConfig {
    fn default() -> Self {
        ChanConfig {
            min_candles: 10,
            strong_price_move: 0.05,
            strong_macd_change: 0.30,
            medium_price_move: 0.02,
            medium_macd_change: 0.15,
        }
    }
}

impl ChanConfig {
    /// 가격 변화율과 히스토그램 변화율로 다이버전스 강도 판정
    pub fn classify(&self, price_move: f64, macd_change: f64) -> Strength {
        if price_move > self.strong_price_move && macd_change > self.strong_macd_change {
            Strength::Strong
        } else if price_move > self.medium_price_move || macd_change > self.medium_macd_change {
            Strength::Medium
        } else {
            Strength::Weak
        }
    }
}

/// 분형 하나와 그 주변 히스토그램 극값
struct FractalContext<'a> {
    fractal: &'a Fractal,
    /// 바닥은 최저 히스토그램, 꼭대기는 최고 히스토그램
    histogram: f64,
}

/// 분형을 이루는 세 병합 봉 구간의 히스토그램 극값
fn histogram_extreme(
    merged: &MergedSeries,
    fractal: &Fractal,
    macd: &[f64],
) -> Option<f64> {
    let (from, to) = merged.candle_span(fractal.merged_index - 1, fractal.merged_index + 1)?;
    let window = macd.get(from..=to)?;
    let extreme = match fractal.fractal_type {
        FractalType::Bottom => window.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
        FractalType::Top => window.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
    };
    Some(extreme)
}

/// 직전 같은 종류 분형 대비 다이버전스 판정
///
/// 바닥: 저점은 더 낮고 히스토그램 골은 더 얕음 (직전 골은 음수)
/// 꼭대기: 고점은 더 높고 히스토그램 봉우리는 더 낮음 (직전 봉우리는 양수)
fn divergence_strength(
    prev: &FractalContext,
    curr: &FractalContext,
    config: &ChanConfig,
) -> Option<Strength> {
    let (prev_price, curr_price) = (prev.fractal.price, curr.fractal.price);
    let (prev_hist, curr_hist) = (prev.histogram, curr.histogram);

    let diverges = match curr.fractal.fractal_type {
        FractalType::Bottom => curr_price < prev_price && curr_hist > prev_hist && prev_hist < 0.0,
        FractalType::Top => curr_price > prev_price && curr_hist < prev_hist && prev_hist > 0.0,
    };
    if !diverges || prev_price == 0.0 {
        return None;
    }

    let price_move = ((curr_price - prev_price) / prev_price).abs();
    let macd_change = ((curr_hist - prev_hist) / prev_hist.abs()).abs();
    Some(config.classify(price_move, macd_change))
}

fn label(fractal_type: FractalType, divergence: Option<Strength>) -> &'static str {
    match (fractal_type, divergence) {
        (FractalType::Bottom, None) => "底",
        (FractalType::Bottom, Some(Strength::Strong)) => "强买",
        (FractalType::Bottom, Some(Strength::Medium)) => "买",
        (FractalType::Bottom, Some(Strength::Weak)) => "底背离",
        (FractalType::Top, None) => "顶",
        (FractalType::Top, Some(Strength::Strong)) => "强卖",
        (FractalType::Top, Some(Strength::Medium)) => "卖",
        (FractalType::Top, Some(Strength::Weak)) => "顶背离",
    }
}

/// 缠论 분형 신호 계산
///
/// 포함 관계를 처리한 뒤 분형을 찾고, 직전 같은 종류 분형과 비교하여 MACD 다이버전스를 확인합니다.
///
/// # Arguments
/// * `candles` - 캔들 데이터 (시간 오름차순)
/// * `macd_params` - MACD 파라미터
/// * `config` - 缠论 설정
///
/// # Returns
/// * `Vec<ChanLunSignal>` - 분형마다 하나. 최소 캔들 수 미만이면 빈 벡터
pub fn calculate_chan_lun_signals(
    candles: &[Candle],
    macd_params: &MacdParams,
    config: &ChanConfig,
) -> Vec<ChanLunSignal> {
    if candles.len() < config.min_candles {
        debug!(
            "缠论 계산 데이터 부족: 필요 {}개, 제공 {}개",
            config.min_candles,
            candles.len()
        );
        return Vec::new();
    }

    let merged = MergedSeries::merge(candles);
    let fractals = merged.fractals(candles);
    if fractals.is_empty() {
        return Vec::new();
    }

    let series = calculate_macd(candles, macd_params);
    let contexts: Vec<FractalContext> = fractals
        .iter()
        .map(|fractal| FractalContext {
            fractal,
            histogram: histogram_extreme(&merged, fractal, &series.macd).unwrap_or(0.0),
        })
        .collect();

    let mut last_bottom: Option<usize> = None;
    let mut last_top: Option<usize> = None;
    let mut signals = Vec::with_capacity(contexts.len());

    for (i, ctx) in contexts.iter().enumerate() {
        let slot = match ctx.fractal.fractal_type {
            FractalType::Bottom => &mut last_bottom,
            FractalType::Top => &mut last_top,
        };
        let divergence = slot.and_then(|prev| divergence_strength(&contexts[prev], ctx, config));
        *slot = Some(i);

        let signal_type = divergence.map(|_| match ctx.fractal.fractal_type {
            FractalType::Bottom => SignalType::Buy,
            FractalType::Top => SignalType::Sell,
        });

        let candle = &candles[ctx.fractal.candle_index];
        trace!(
            "분형: t={}, {:?}, 가격={:.2}, 다이버전스={:?}",
            candle.time, ctx.fractal.fractal_type, ctx.fractal.price, divergence
        );

        signals.push(ChanLunSignal {
            time: candle.time,
            fractal_type: ctx.fractal.fractal_type,
            signal_type,
            label: label(ctx.fractal.fractal_type, divergence).to_owned(),
            strength: divergence.unwrap_or(Strength::Weak),
            divergence: divergence.is_some(),
        });
    }

    signals
}

/// 가장 최근 분형이 확정된 매수 신호인지 확인
pub fn check_chan_lun_buy_signal(
    candles: &[Candle],
    macd_params: &MacdParams,
    config: &ChanConfig,
) -> bool {
    latest_is(candles, macd_params, config, SignalType::Buy)
}

/// 가장 최근 분형이 확정된 매도 신호인지 확인
pub fn check_chan_lun_sell_signal(
    candles: &[Candle],
    macd_params: &MacdParams,
    config: &ChanConfig,
) -> bool {
    latest_is(candles, macd_params, config, SignalType::Sell)
}

fn latest_is(
    candles: &[Candle],
    macd_params: &MacdParams,
    config: &ChanConfig,
    signal_type: SignalType,
) -> bool {
    calculate_chan_lun_signals(candles, macd_params, config)
        .last()
        .is_some_and(|s| s.divergence && s.signal_type == Some(signal_type))
}
