use super::ScreenCondition;
use crate::config::EngineConfig;
use crate::indicator::pressure::calculate_buy_sell_pressure;
use crate::model::{Candle, PressureSignal};
use anyhow::{Result, bail};

/// 최신 봉의 압력 급증/급락 필터
pub fn filter_pressure(
    symbol: &str,
    condition: ScreenCondition,
    candles: &[Candle],
    config: &EngineConfig,
) -> Result<bool> {
    let expected = match condition {
        ScreenCondition::PressureStrongUp => PressureSignal::StrongUp,
        ScreenCondition::PressureStrongDown => PressureSignal::StrongDown,
        other => bail!("압력 필터가 처리할 수 없는 조건: {other}"),
    };

    let pressures = calculate_buy_sell_pressure(candles, &config.pressure);
    let latest = pressures.last().and_then(|p| p.signal);

    log::debug!("종목 {symbol} 압력 필터 - 최신 신호: {latest:?}");
    Ok(latest == Some(expected))
}
