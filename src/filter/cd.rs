use super::ScreenCondition;
use crate::analyzer::base::has_recent_signal;
use crate::analyzer::cd_analyzer::calculate_cd_signals;
use crate::config::EngineConfig;
use crate::model::{Candle, SignalType};
use anyhow::{Result, bail};

/// 최근 봉 구간의 CD 신호 필터
pub fn filter_cd(
    symbol: &str,
    condition: ScreenCondition,
    candles: &[Candle],
    config: &EngineConfig,
) -> Result<bool> {
    let signal_type = match condition {
        ScreenCondition::CdBuy => SignalType::Buy,
        ScreenCondition::CdSell => SignalType::Sell,
        other => bail!("CD 필터가 처리할 수 없는 조건: {other}"),
    };

    let signals = calculate_cd_signals(candles, &config.macd, &config.cd);
    let recent_bars = config.screener.cd_recent_bars;
    let matched = has_recent_signal(&signals, candles, recent_bars, |s| {
        s.signal_type == signal_type
    });

    log::debug!(
        "종목 {symbol} CD 필터 - 신호 {}개, 최근 {recent_bars}봉 {signal_type:?} 여부: {matched}",
        signals.len()
    );
    Ok(matched)
}
