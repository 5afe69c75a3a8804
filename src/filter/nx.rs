use super::ScreenCondition;
use crate::analyzer::base::has_recent_signal;
use crate::analyzer::nx_analyzer::calculate_nx_signals;
use crate::config::EngineConfig;
use crate::model::{Candle, SignalType};
use anyhow::{Result, bail};

/// 최근 봉 구간의 NX 교차 신호 필터
pub fn filter_nx(
    symbol: &str,
    condition: ScreenCondition,
    candles: &[Candle],
    config: &EngineConfig,
) -> Result<bool> {
    let signal_type = match condition {
        ScreenCondition::NxBuy => SignalType::Buy,
        ScreenCondition::NxSell => SignalType::Sell,
        other => bail!("NX 필터가 처리할 수 없는 조건: {other}"),
    };

    let signals = calculate_nx_signals(candles, &config.nx);
    let recent_bars = config.nx.recent_bars;
    let matched = has_recent_signal(&signals, candles, recent_bars, |s| {
        s.signal_type == signal_type
    });

    log::debug!("종목 {symbol} NX 필터 - 최근 {recent_bars}봉 {signal_type:?} 여부: {matched}");
    Ok(matched)
}
