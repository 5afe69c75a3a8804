use crate::config::EngineConfig;
use crate::indicator::ladder::is_ladder_strong;
use crate::model::Candle;
use anyhow::Result;

/// 梯子 강세 필터
pub fn filter_ladder(symbol: &str, candles: &[Candle], config: &EngineConfig) -> Result<bool> {
    let strong = is_ladder_strong(candles, &config.ladder);
    log::debug!("종목 {symbol} 梯子 필터 - 강세: {strong}");
    Ok(strong)
}
