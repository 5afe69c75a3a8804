use super::ScreenCondition;
use crate::analyzer::advanced_chan_analyzer::{
    check_advanced_chan_buy_signal, check_advanced_chan_sell_signal, check_near_golden_support,
    check_near_zhongshu,
};
use crate::config::EngineConfig;
use crate::model::Candle;
use anyhow::{Result, bail};

/// 고급 禅动 필터
pub fn filter_advanced_chan(
    symbol: &str,
    condition: ScreenCondition,
    candles: &[Candle],
    config: &EngineConfig,
) -> Result<bool> {
    let adv = &config.advanced_chan;
    let matched = match condition {
        ScreenCondition::AdvancedChanBuy => check_advanced_chan_buy_signal(candles, adv),
        ScreenCondition::AdvancedChanSell => check_advanced_chan_sell_signal(candles, adv),
        ScreenCondition::NearGoldenSupport => check_near_golden_support(candles, adv),
        ScreenCondition::NearZhongshu => check_near_zhongshu(candles, adv),
        other => bail!("고급 禅动 필터가 처리할 수 없는 조건: {other}"),
    };
    log::debug!("종목 {symbol} 고급 禅动 필터 - {condition}: {matched}");
    Ok(matched)
}
