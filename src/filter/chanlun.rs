use super::ScreenCondition;
use crate::analyzer::chanlun_analyzer::{check_chan_lun_buy_signal, check_chan_lun_sell_signal};
use crate::config::EngineConfig;
use crate::model::Candle;
use anyhow::{Result, bail};

/// 缠论 분형 다이버전스 필터
pub fn filter_chanlun(
    symbol: &str,
    condition: ScreenCondition,
    candles: &[Candle],
    config: &EngineConfig,
) -> Result<bool> {
    let matched = match condition {
        ScreenCondition::ChanlunBuy => {
            check_chan_lun_buy_signal(candles, &config.macd, &config.chan)
        }
        ScreenCondition::ChanlunSell => {
            check_chan_lun_sell_signal(candles, &config.macd, &config.chan)
        }
        other => bail!("缠论 필터가 처리할 수 없는 조건: {other}"),
    };
    log::debug!("종목 {symbol} 缠论 필터 - {condition}: {matched}");
    Ok(matched)
}
