// 기술적 지표 모듈
// 캔들 시리즈를 같은 길이의 수치 시리즈로 변환하는 순수 함수들을 제공합니다.

pub mod ladder;
pub mod ma;
pub mod macd;
pub mod max;
pub mod min;
pub mod momentum;
pub mod pressure;
pub mod utils;
pub mod zigzag;

use crate::model::Candle;
use thiserror::Error;

/// 지표 파라미터/입력 오류
///
/// 데이터 부족은 계산 함수에서 빈 결과로 처리되며, 이 타입은 파라미터 검증에 사용됩니다.
#[derive(Debug, Error, PartialEq)]
pub enum IndicatorError {
    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),
}

/// 지표 계산 결과 타입
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 기간 파라미터가 0보다 큰지 검증
pub fn validate_period(period: usize, name: &str) -> IndicatorResult<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "{name}: 기간은 0보다 커야 합니다"
        )));
    }
    Ok(())
}

/// 종가 시리즈
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// 고가 시리즈
pub fn highs(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.high).collect()
}

/// 저가 시리즈
pub fn lows(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.low).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_period() {
        assert!(validate_period(1, "ema").is_ok());
        assert_eq!(
            validate_period(0, "ema"),
            Err(IndicatorError::InvalidParameter(
                "ema: 기간은 0보다 커야 합니다".to_owned()
            ))
        );
    }

    #[test]
    fn test_price_extractors() {
        let candles = vec![
            Candle::new(1, 10.0, 12.0, 9.0, 11.0, 10),
            Candle::new(2, 11.0, 13.0, 10.0, 12.0, 10),
        ];
        assert_eq!(closes(&candles), vec![11.0, 12.0]);
        assert_eq!(highs(&candles), vec![12.0, 13.0]);
        assert_eq!(lows(&candles), vec![9.0, 10.0]);
    }
}
