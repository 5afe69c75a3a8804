use super::ScreenCondition;
use crate::analyzer::base::latest_matching;
use crate::config::EngineConfig;
use crate::indicator::momentum::calculate_momentum;
use crate::model::{Candle, MomentumSignalType};
use anyhow::{Result, bail};

/// 가장 최근 모멘텀 신호 필터
///
/// 신호가 있는 가장 최근 봉을 기준으로 판정합니다.
/// 강한 매수 조건은 double_digit_up 신호도 인정합니다.
pub fn filter_momentum(
    symbol: &str,
    condition: ScreenCondition,
    candles: &[Candle],
    config: &EngineConfig,
) -> Result<bool> {
    let accepted: &[MomentumSignalType] = match condition {
        ScreenCondition::MomentumStrongBuy => &[
            MomentumSignalType::StrongBuy,
            MomentumSignalType::DoubleDigitUp,
        ],
        ScreenCondition::MomentumDoubleDigitUp => &[MomentumSignalType::DoubleDigitUp],
        ScreenCondition::MomentumYellowCrossGreen => &[MomentumSignalType::YellowCrossGreen],
        ScreenCondition::MomentumGreenToRed => &[MomentumSignalType::GreenToRed],
        other => bail!("모멘텀 필터가 처리할 수 없는 조건: {other}"),
    };

    let momentum = calculate_momentum(candles, &config.momentum);
    let latest = latest_matching(&momentum, |m| m.signal.is_some()).and_then(|m| m.signal);

    log::debug!("종목 {symbol} 모멘텀 필터 - 최근 신호: {latest:?}");
    Ok(latest.is_some_and(|s| accepted.contains(&s)))
}
