use crate::analyzer::base::has_recent_signal;
use crate::analyzer::kline_merge::{Fractal, MergedSeries};
use crate::indicator::ma::{ema, sma, wma};
use crate::indicator::macd::{MacdParams, calculate_macd};
use crate::indicator::utils::{refx, relative_distance, safe_div};
use crate::indicator::zigzag::zigzag_close;
use crate::indicator::{closes, highs, lows};
use crate::model::{
    AdvancedChanData, AdvancedChanSignal, BiPoint, BiPointType, Candle, ChanCategory,
    FractalType, PivotDirection, SignalType, Strength, Trend, ZhongShu,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 고급 禅动 파이프라인 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedChanConfig {
    /// 지표 데이터 계산에 필요한 최소 캔들 수
    pub min_candles: usize,
    /// 笔 탐색에 필요한 최소 캔들 수
    pub bi_min_candles: usize,
    /// 반대 분형 사이에 필요한 최소 병합 봉 간격
    pub min_bi_gap: usize,
    /// 1类 매매점 히스토그램 축소 비율
    pub b1_divergence_ratio: f64,
    /// 3类 매매점 탐색 시 중추 이후 확인할 최대 端点 수
    pub b3_max_points: usize,
    /// 买线 지그재그 전환 임계값 (%)
    pub zigzag_pct: f64,
    /// 卖线 EMA 기간
    pub sell_line_period: usize,
    /// D90 가중이동평균 기간
    pub d90_wma_period: usize,
    /// D90 EMA 기간
    pub d90_ema_period: usize,
    /// 중추 채널 기간
    pub pivot_period: usize,
    /// 추세 판정 여유 비율
    pub trend_margin: f64,
    /// D90 상/하단 근접 신호 비율
    pub band_proximity: f64,
    /// 중추 중간선 근접 신호 비율
    pub zhongshu_proximity: f64,
    /// 매수/매도 신호를 확인할 최근 봉 수
    pub recent_bars: usize,
    /// 황금 지지선 근접 허용 오차
    pub support_tolerance: f64,
    /// 중추 근접 허용 오차
    pub zhongshu_tolerance: f64,
}

impl Default for AdvancedChanConfig {
    fn default() -> Self {
        AdvancedChanConfig {
            min_candles: 30,
            bi_min_candles: 10,
            min_bi_gap: 4,
            b1_divergence_ratio: 0.8,
            b3_max_points: 6,
            zigzag_pct: 1.0,
            sell_line_period: 3,
            d90_wma_period: 20,
            d90_ema_period: 90,
            pivot_period: 25,
            trend_margin: 0.01,
            band_proximity: 0.02,
            zhongshu_proximity: 0.015,
            recent_bars: 5,
            support_tolerance: 0.02,
            zhongshu_tolerance: 0.015,
        }
    }
}

/// 같은 종류 분형 중 `a`가 `b`보다 극단적인지 확인
fn more_extreme(a: &Fractal, b: &Fractal) -> bool {
    match a.fractal_type {
        FractalType::Top => a.price > b.price,
        FractalType::Bottom => a.price < b.price,
    }
}

/// 직전 端点에서 새 분형으로 이어지는 가격 관계가 유효한지 확인
fn valid_stroke(last: &Fractal, next: &Fractal) -> bool {
    match last.fractal_type {
        FractalType::Top => last.price > next.price,
        FractalType::Bottom => last.price < next.price,
    }
}

/// 笔 端点 탐색
///
/// 분형을 꼭대기/바닥이 엄격히 번갈아 나오는 수열로 걸러냅니다.
/// * 같은 종류가 연속되면 더 극단적인 쪽을 남깁니다.
/// * 반대 종류는 병합 봉 간격이 `min_bi_gap` 이상이고 가격 관계가 유효해야 추가됩니다.
/// * 간격이 부족한 반대 분형이 그 이전 같은 종류 端点보다 극단적이면,
///   마지막 端点을 버리고 이전 笔을 연장합니다.
///
/// # Returns
/// * `Vec<BiPoint>` - 최소 캔들 수 미만이면 빈 벡터
pub fn find_bi_points(candles: &[Candle], config: &AdvancedChanConfig) -> Vec<BiPoint> {
    if candles.len() < config.bi_min_candles {
        return Vec::new();
    }

    let merged = MergedSeries::merge(candles);
    let fractals = merged.fractals(candles);
    if fractals.len() < 2 {
        return Vec::new();
    }

    let mut points: Vec<Fractal> = Vec::with_capacity(fractals.len());
    for fractal in fractals {
        let Some(last) = points.last() else {
            points.push(fractal);
            continue;
        };

        if last.fractal_type == fractal.fractal_type {
            if more_extreme(&fractal, last) {
                let len = points.len();
                points[len - 1] = fractal;
            }
            continue;
        }

        let gap = fractal.merged_index.saturating_sub(last.merged_index);
        if gap >= config.min_bi_gap {
            if valid_stroke(last, &fractal) {
                points.push(fractal);
            }
            continue;
        }

        let len = points.len();
        if len >= 2 && more_extreme(&fractal, &points[len - 2]) {
            points.pop();
            points[len - 2] = fractal;
        }
    }

    points
        .into_iter()
        .map(|f| BiPoint {
            index: f.candle_index,
            time: candles[f.candle_index].time,
            price: f.price,
            point_type: match f.fractal_type {
                FractalType::Top => BiPointType::High,
                FractalType::Bottom => BiPointType::Low,
            },
        })
        .collect()
}

/// 中枢 탐색
///
/// 연속된 세 笔(네 端点)의 공통 겹침 구간을 중추로 보고,
/// 이후 端点이 범위 안에 머무는 동안 중추를 연장합니다.
///
/// # Returns
/// * `Vec<ZhongShu>` - 端点이 4개 미만이면 빈 벡터
pub fn find_zhong_shu(bi_points: &[BiPoint]) -> Vec<ZhongShu> {
    let mut result = Vec::new();
    if bi_points.len() < 4 {
        return result;
    }

    let mut i = 0;
    while i + 3 < bi_points.len() {
        let (p1, p2, p3, p4) = (
            &bi_points[i],
            &bi_points[i + 1],
            &bi_points[i + 2],
            &bi_points[i + 3],
        );
        let high = p1.price.max(p2.price).min(p3.price.max(p4.price));
        let low = p1.price.min(p2.price).max(p3.price.min(p4.price));

        if high <= low {
            i += 1;
            continue;
        }

        let end = bi_points[i + 4..]
            .iter()
            .take_while(|p| p.price >= low && p.price <= high)
            .count()
            + i
            + 3;

        result.push(ZhongShu {
            start_time: p1.time,
            end_time: bi_points[end].time,
            start_index: p1.index,
            end_index: bi_points[end].index,
            high,
            low,
            direction: match p1.point_type {
                BiPointType::Low => PivotDirection::Up,
                BiPointType::High => PivotDirection::Down,
            },
        });
        i = end;
    }
    result
}

/// 1/2/3类 매매점 탐색
///
/// * 1类: 두 端点 전보다 새 극값이지만 히스토그램 크기는 `b1_divergence_ratio` 미만으로 축소
/// * 2类: 1类 이후 다음 같은 종류 端点이 1类 극값을 넘지 못함
/// * 3类: 중추 이후 최대 `b3_max_points`개 端点 중 처음으로 중추 밖에 머무는 端点
///
/// # Returns
/// * `Vec<AdvancedChanSignal>` - 시간 오름차순, 시각당 하나. 端点이 5개 미만이면 빈 벡터
pub fn find_chan_buy_sell_points(
    bi_points: &[BiPoint],
    zhong_shus: &[ZhongShu],
    candles: &[Candle],
    macd_params: &MacdParams,
    config: &AdvancedChanConfig,
) -> Vec<AdvancedChanSignal> {
    if bi_points.len() < 5 {
        return Vec::new();
    }

    let series = calculate_macd(candles, macd_params);
    let hist_at = |index: usize| series.macd.get(index).map(|v| v.abs()).unwrap_or(0.0);

    let mut signals: Vec<AdvancedChanSignal> = Vec::new();
    let mut seen: HashSet<i64> = HashSet::new();
    // (端点 인덱스, 분류)
    let mut first_class: Vec<(usize, ChanCategory)> = Vec::new();

    for i in 4..bi_points.len() {
        let (curr, prev) = (&bi_points[i], &bi_points[i - 2]);
        if curr.point_type != prev.point_type {
            continue;
        }
        let new_extreme = match curr.point_type {
            BiPointType::Low => curr.price <= prev.price,
            BiPointType::High => curr.price >= prev.price,
        };
        let (curr_m, prev_m) = (hist_at(curr.index), hist_at(prev.index));
        if !new_extreme || prev_m <= 0.0 || curr_m >= prev_m * config.b1_divergence_ratio {
            continue;
        }
        if !seen.insert(curr.time) {
            continue;
        }

        let signal = match curr.point_type {
            BiPointType::Low => AdvancedChanSignal::new(
                curr.time,
                SignalType::Buy,
                "1买",
                Strength::Strong,
                ChanCategory::B1,
            ),
            BiPointType::High => AdvancedChanSignal::new(
                curr.time,
                SignalType::Sell,
                "1卖",
                Strength::Strong,
                ChanCategory::S1,
            ),
        };
        first_class.push((i, signal.category));
        signals.push(signal);
    }

    for (i, category) in first_class {
        let Some(next) = bi_points.get(i + 2) else {
            continue;
        };
        let anchor = &bi_points[i];
        let signal = match category {
            ChanCategory::B1
                if next.point_type == BiPointType::Low && next.price > anchor.price =>
            {
                AdvancedChanSignal::new(
                    next.time,
                    SignalType::Buy,
                    "2买",
                    Strength::Medium,
                    ChanCategory::B2,
                )
            }
            ChanCategory::S1
                if next.point_type == BiPointType::High && next.price < anchor.price =>
            {
                AdvancedChanSignal::new(
                    next.time,
                    SignalType::Sell,
                    "2卖",
                    Strength::Medium,
                    ChanCategory::S2,
                )
            }
            _ => continue,
        };
        if seen.insert(signal.time) {
            signals.push(signal);
        }
    }

    for zs in zhong_shus {
        let after = bi_points
            .iter()
            .filter(|p| p.index > zs.end_index)
            .take(config.b3_max_points);
        for p in after {
            let signal = match p.point_type {
                BiPointType::Low if p.price > zs.high => AdvancedChanSignal::new(
                    p.time,
                    SignalType::Buy,
                    "3买",
                    Strength::Medium,
                    ChanCategory::B3,
                ),
                BiPointType::High if p.price < zs.low => AdvancedChanSignal::new(
                    p.time,
                    SignalType::Sell,
                    "3卖",
                    Strength::Medium,
                    ChanCategory::S3,
                ),
                _ => continue,
            };
            if seen.insert(signal.time) {
                signals.push(signal);
                break;
            }
        }
    }

    signals.sort_by_key(|s| s.time);
    debug!("缠论 매매점 {}개 탐지", signals.len());
    signals
}

/// 고급 禅动 지표 데이터 계산
///
/// # Arguments
/// * `candles` - 캔들 데이터
/// * `config` - 고급 禅动 설정
///
/// # Returns
/// * `Vec<AdvancedChanData>` - 캔들당 하나. 최소 캔들 수 미만이면 빈 벡터
pub fn calculate_advanced_chan_data(
    candles: &[Candle],
    config: &AdvancedChanConfig,
) -> Vec<AdvancedChanData> {
    if candles.len() < config.min_candles {
        debug!(
            "고급 禅动 계산 데이터 부족: 필요 {}개, 제공 {}개",
            config.min_candles,
            candles.len()
        );
        return Vec::new();
    }

    let closes = closes(candles);
    let highs = highs(candles);
    let lows = lows(candles);

    let buy_line = zigzag_close(&closes, config.zigzag_pct);
    let sell_line = ema(&buy_line, config.sell_line_period);

    let d90_h = ema(&wma(&highs, config.d90_wma_period), config.d90_ema_period);
    let d90_l = ema(&wma(&lows, config.d90_wma_period), config.d90_ema_period);

    let period = config.pivot_period;
    let half = period / 2;
    let channel = |series: &[f64]| refx(&sma(&refx(&sma(series, period), half), period), half);
    let xxh25 = channel(&highs);
    let xxl25 = channel(&lows);

    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let spread = d90_h[i] - d90_l[i];
            let long_line = (xxh25[i] + xxl25[i]) / 2.0;
            let short_line = (d90_h[i] + d90_l[i]) / 2.0;
            let trend = if long_line > short_line * (1.0 + config.trend_margin) {
                Trend::Bull
            } else if long_line < short_line * (1.0 - config.trend_margin) {
                Trend::Bear
            } else {
                Trend::Range
            };

            AdvancedChanData {
                time: c.time,
                buy_line: buy_line[i],
                sell_line: sell_line[i],
                xxh25: xxh25[i],
                xxl25: xxl25[i],
                zhongshu_high: 2.0 * xxh25[i] - xxl25[i],
                zhongshu_low: 2.0 * xxl25[i] - xxh25[i],
                d90_top: d90_h[i] + 2.0 * spread,
                d90_bottom: d90_l[i] - 2.0 * spread,
                d90_h: d90_h[i],
                d90_l: d90_l[i],
                long_line,
                short_line,
                trend,
            }
        })
        .collect()
}

/// 고급 禅动 봉별 신호 계산
///
/// * 저가가 `zhongshu_low`를 위로 통과: 강세면 trend_buy, 횡보면 range_buy
/// * 고가가 `zhongshu_high`를 위로 통과: 약세면 trend_sell, 횡보면 range_sell
/// * D90 하단/상단 근접: near_support / near_resistance
/// * 중추 중간선 근접: near_zhongshu
pub fn calculate_advanced_chan_signals(
    candles: &[Candle],
    data: &[AdvancedChanData],
    config: &AdvancedChanConfig,
) -> Vec<AdvancedChanSignal> {
    let n = candles.len().min(data.len());
    if n < 5 {
        return Vec::new();
    }

    let mut signals = Vec::new();
    for i in 1..n {
        let (prev, curr) = (&data[i - 1], &data[i]);
        let (prev_candle, candle) = (&candles[i - 1], &candles[i]);
        let time = candle.time;

        let cross_long = prev.zhongshu_low > prev_candle.low && curr.zhongshu_low <= candle.low;
        let cross_short =
            prev_candle.high < prev.zhongshu_high && candle.high >= curr.zhongshu_high;

        if cross_long {
            match curr.trend {
                Trend::Bull => signals.push(AdvancedChanSignal::new(
                    time,
                    SignalType::Buy,
                    "多头买",
                    Strength::Strong,
                    ChanCategory::TrendBuy,
                )),
                Trend::Range => signals.push(AdvancedChanSignal::new(
                    time,
                    SignalType::Buy,
                    "震荡买",
                    Strength::Medium,
                    ChanCategory::RangeBuy,
                )),
                Trend::Bear => {}
            }
        }

        if cross_short {
            match curr.trend {
                Trend::Bear => signals.push(AdvancedChanSignal::new(
                    time,
                    SignalType::Sell,
                    "空头卖",
                    Strength::Strong,
                    ChanCategory::TrendSell,
                )),
                Trend::Range => signals.push(AdvancedChanSignal::new(
                    time,
                    SignalType::Sell,
                    "震荡卖",
                    Strength::Medium,
                    ChanCategory::RangeSell,
                )),
                Trend::Bull => {}
            }
        }

        let to_support = safe_div((candle.low - curr.d90_bottom).abs(), candle.close);
        if to_support < config.band_proximity
            && candle.low <= curr.d90_bottom * (1.0 + config.band_proximity)
        {
            signals.push(AdvancedChanSignal::new(
                time,
                SignalType::Buy,
                "近支撑",
                Strength::Medium,
                ChanCategory::NearSupport,
            ));
        }

        let to_resistance = safe_div((candle.high - curr.d90_top).abs(), candle.close);
        if to_resistance < config.band_proximity
            && candle.high >= curr.d90_top * (1.0 - config.band_proximity)
        {
            signals.push(AdvancedChanSignal::new(
                time,
                SignalType::Sell,
                "近压力",
                Strength::Medium,
                ChanCategory::NearResistance,
            ));
        }

        let mid = curr.long_line;
        if safe_div((candle.close - mid).abs(), candle.close) < config.zhongshu_proximity {
            let signal_type = if candle.close > mid {
                SignalType::Sell
            } else {
                SignalType::Buy
            };
            signals.push(AdvancedChanSignal::new(
                time,
                signal_type,
                "近中枢",
                Strength::Weak,
                ChanCategory::NearZhongshu,
            ));
        }
    }
    signals
}

fn recent_category(
    candles: &[Candle],
    config: &AdvancedChanConfig,
    categories: &[ChanCategory],
) -> bool {
    let data = calculate_advanced_chan_data(candles, config);
    if data.is_empty() {
        return false;
    }
    let signals = calculate_advanced_chan_signals(candles, &data, config);
    has_recent_signal(&signals, candles, config.recent_bars, |s| {
        categories.contains(&s.category)
    })
}

/// 최근 `recent_bars`개 봉 안에 추세/횡보 매수 신호가 있는지 확인
pub fn check_advanced_chan_buy_signal(candles: &[Candle], config: &AdvancedChanConfig) -> bool {
    recent_category(
        candles,
        config,
        &[ChanCategory::TrendBuy, ChanCategory::RangeBuy],
    )
}

/// 최근 `recent_bars`개 봉 안에 추세/횡보 매도 신호가 있는지 확인
pub fn check_advanced_chan_sell_signal(candles: &[Candle], config: &AdvancedChanConfig) -> bool {
    recent_category(
        candles,
        config,
        &[ChanCategory::TrendSell, ChanCategory::RangeSell],
    )
}

/// 최신 종가가 최신 D90 하단(황금 지지선)에 근접했는지 확인
pub fn check_near_golden_support(candles: &[Candle], config: &AdvancedChanConfig) -> bool {
    let data = calculate_advanced_chan_data(candles, config);
    let (Some(last), Some(candle)) = (data.last(), candles.last()) else {
        return false;
    };
    relative_distance(candle.close, last.d90_bottom) <= config.support_tolerance
}

/// 최신 종가가 최근 중추 범위 안(허용 오차 포함)에 있는지 확인
///
/// 笔 중추가 없으면 중추 채널(`xxl25..xxh25`)을 사용합니다.
pub fn check_near_zhongshu(candles: &[Candle], config: &AdvancedChanConfig) -> bool {
    let data = calculate_advanced_chan_data(candles, config);
    let (Some(last), Some(candle)) = (data.last(), candles.last()) else {
        return false;
    };

    let bi_points = find_bi_points(candles, config);
    let tolerance = config.zhongshu_tolerance;
    match find_zhong_shu(&bi_points).last() {
        Some(zs) => zs.contains(candle.close, tolerance),
        None => {
            let low = last.xxl25.min(last.xxh25);
            let high = last.xxl25.max(last.xxh25);
            candle.close >= low * (1.0 - tolerance) && candle.close <= high * (1.0 + tolerance)
        }
    }
}
