use crate::model::{
    AdvancedChanData, AdvancedChanSignal, BuySellPressure, CDSignal, Candle, ChanLunSignal,
    LadderLevel, MomentumSignal, NXSignal,
};

/// 시각을 가진 분석 결과에 접근하기 위한 트레이트
pub trait TimedSignal {
    /// 결과가 속한 캔들 시각 (ms)
    fn time(&self) -> i64;
}

macro_rules! impl_timed_signal {
    ($($t:ty),* $(,)?) => {
        $(
            impl TimedSignal for $t {
                fn time(&self) -> i64 {
                    self.time
                }
            }
        )*
    };
}

impl_timed_signal!(
    Candle,
    CDSignal,
    NXSignal,
    BuySellPressure,
    LadderLevel,
    MomentumSignal,
    ChanLunSignal,
    AdvancedChanData,
    AdvancedChanSignal,
);

/// 최근 `bars`개 캔들 구간이 시작되는 시각
///
/// # Arguments
/// * `candles` - 캔들 데이터
/// * `bars` - 확인할 봉 개수
///
/// # Returns
/// * `Option<i64>` - 캔들이 없거나 `bars`가 0이면 None
pub fn window_start_time(candles: &[Candle], bars: usize) -> Option<i64> {
    if bars == 0 || candles.is_empty() {
        return None;
    }
    let start = candles.len().saturating_sub(bars);
    Some(candles[start].time)
}

/// 최근 `bars`개 캔들 안에서 조건을 만족하는 신호가 있는지 확인
///
/// # Arguments
/// * `signals` - 시각 오름차순 신호 목록
/// * `candles` - 신호를 만든 캔들 데이터
/// * `bars` - 확인할 봉 개수
/// * `predicate` - 신호 조건
///
/// # Returns
/// * `bool` - 조건을 만족하는 신호가 구간 안에 있으면 true
pub fn has_recent_signal<S: TimedSignal>(
    signals: &[S],
    candles: &[Candle],
    bars: usize,
    predicate: impl Fn(&S) -> bool,
) -> bool {
    let Some(since) = window_start_time(candles, bars) else {
        return false;
    };
    signals
        .iter()
        .rev()
        .take_while(|s| s.time() >= since)
        .any(predicate)
}

/// 조건을 만족하는 가장 최근 항목
pub fn latest_matching<S>(items: &[S], predicate: impl Fn(&S) -> bool) -> Option<&S> {
    items.iter().rev().find(|item| predicate(item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SignalType, Strength};

    fn candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle::new(i as i64 * 10, 10.0, 11.0, 9.0, 10.0, 1))
            .collect()
    }

    fn cd(time: i64, signal_type: SignalType) -> CDSignal {
        CDSignal {
            time,
            signal_type,
            strength: Strength::Weak,
            label: String::new(),
            diff_value: None,
            dea_value: None,
            macd_value: None,
        }
    }

    #[test]
    fn test_window_start_time() {
        let data = candles(20);
        assert_eq!(window_start_time(&data, 10), Some(100));
        assert_eq!(window_start_time(&data, 50), Some(0));
        assert_eq!(window_start_time(&data, 0), None);
        assert_eq!(window_start_time(&[], 5), None);
    }

    #[test]
    fn test_has_recent_signal() {
        let data = candles(20);
        let signals = vec![cd(20, SignalType::Buy), cd(150, SignalType::Sell)];
        assert!(has_recent_signal(&signals, &data, 10, |s| s.signal_type == SignalType::Sell));
        assert!(!has_recent_signal(&signals, &data, 10, |s| s.signal_type == SignalType::Buy));
        assert!(has_recent_signal(&signals, &data, 20, |s| s.signal_type == SignalType::Buy));
    }
}
