use crate::indicator::ma::ema;
use crate::indicator::{IndicatorResult, closes, validate_period};
use crate::model::Candle;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// MACD 파라미터
///
/// 기본값은 통상적인 12/26/9 입니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdParams {
    /// 빠른 EMA 기간 (일반적으로 12)
    pub fast_period: usize,
    /// 느린 EMA 기간 (일반적으로 26)
    pub slow_period: usize,
    /// 시그널(DEA) 기간 (일반적으로 9)
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        MacdParams {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Display for MacdParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MACD({},{},{})",
            self.fast_period, self.slow_period, self.signal_period
        )
    }
}

impl MacdParams {
    /// 파라미터 유효성 검증
    pub fn validate(&self) -> IndicatorResult<()> {
        validate_period(self.fast_period, "macd.fast_period")?;
        validate_period(self.slow_period, "macd.slow_period")?;
        validate_period(self.signal_period, "macd.signal_period")?;
        if self.fast_period >= self.slow_period {
            return Err(crate::indicator::IndicatorError::InvalidParameter(format!(
                "macd: 빠른 기간({})은 느린 기간({})보다 작아야 합니다",
                self.fast_period, self.slow_period
            )));
        }
        Ok(())
    }
}

/// MACD 시리즈 (입력과 같은 길이의 세 병렬 배열)
///
/// * `diff` - 빠른 EMA - 느린 EMA (DIF)
/// * `dea` - DIFF의 EMA (시그널 라인)
/// * `macd` - 2 * (DIFF - DEA) 히스토그램
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdSeries {
    pub diff: Vec<f64>,
    pub dea: Vec<f64>,
    pub macd: Vec<f64>,
}

impl MacdSeries {
    pub fn len(&self) -> usize {
        self.macd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macd.is_empty()
    }

    /// 히스토그램 막대가 같은 부호로 길어지고 있는지 확인
    ///
    /// 첫 번째 인덱스와 범위를 벗어난 인덱스는 false
    pub fn is_strengthening(&self, index: usize) -> bool {
        if index == 0 || index >= self.macd.len() {
            return false;
        }
        let curr = self.macd[index];
        let prev = self.macd[index - 1];
        curr * prev > 0.0 && curr.abs() > prev.abs()
    }
}

/// 종가 기반 MACD 계산
///
/// # Arguments
/// * `candles` - 캔들 데이터 (시간 오름차순)
/// * `params` - MACD 파라미터
///
/// # Returns
/// * `MacdSeries` - 빈 입력이면 빈 시리즈
pub fn calculate_macd(candles: &[Candle], params: &MacdParams) -> MacdSeries {
    calculate_macd_from_values(&closes(candles), params)
}

/// 임의의 가격 시리즈에 대한 MACD 계산
pub fn calculate_macd_from_values(values: &[f64], params: &MacdParams) -> MacdSeries {
    if values.is_empty() {
        return MacdSeries::default();
    }

    let fast = ema(values, params.fast_period);
    let slow = ema(values, params.slow_period);
    let diff: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let dea = ema(&diff, params.signal_period);
    let macd = diff.iter().zip(&dea).map(|(d, s)| 2.0 * (d - s)).collect();

    MacdSeries { diff, dea, macd }
}
