use crate::model::Candle;
use thiserror::Error;

/// 캔들 시리즈 검증 오류
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    /// 시간 순서가 오름차순이 아님
    #[error("캔들 시간이 오름차순이 아닙니다: index {index}")]
    NotAscending { index: usize },
    /// 같은 시간의 캔들이 중복됨
    #[error("중복된 캔들 시간: {time}")]
    DuplicateTime { time: i64 },
    /// OHLC 불변식 위반
    #[error("잘못된 캔들: index {index}")]
    InvalidBar { index: usize },
}

/// 지표 계산 전에 캔들 시리즈가 지켜야 하는 조건을 검사합니다.
///
/// # Arguments
/// * `candles` - 검사할 캔들 시리즈
///
/// # Returns
/// * `Result<(), SeriesError>` - 첫 번째 위반 사항
pub fn validate_series(candles: &[Candle]) -> Result<(), SeriesError> {
    for (index, candle) in candles.iter().enumerate() {
        if !candle.is_valid() {
            return Err(SeriesError::InvalidBar { index });
        }
        if index > 0 {
            let prev = &candles[index - 1];
            if prev.time == candle.time {
                return Err(SeriesError::DuplicateTime { time: candle.time });
            }
            if prev.time > candle.time {
                return Err(SeriesError::NotAscending { index });
            }
        }
    }
    Ok(())
}

/// 캔들 하나를 불변식에 맞게 보정합니다. 가격이 유한하지 않으면 None.
fn repair(candle: Candle) -> Option<Candle> {
    let prices = [candle.open, candle.high, candle.low, candle.close];
    if !prices.iter().all(|p| p.is_finite()) {
        return None;
    }

    let high = prices.iter().fold(f64::MIN, |a, &b| a.max(b));
    let low = prices.iter().fold(f64::MAX, |a, &b| a.min(b));
    Some(Candle { high, low, ..candle })
}

/// 제한된 크기의 캔들 저장소
///
/// 지표 엔진에 넘기기 전의 방어 경계입니다.
/// 데이터는 시간 오름차순으로 유지되며 (가장 최신 캔들이 마지막), 같은 시간의 캔들은
/// 나중에 들어온 것으로 교체됩니다. 최대 크기를 넘으면 가장 오래된 캔들이 제거됩니다.
#[derive(Debug, Clone)]
pub struct CandleStore {
    items: Vec<Candle>,
    pub max_size: usize,
}

impl CandleStore {
    /// 새로운 CandleStore 인스턴스를 생성합니다.
    ///
    /// 입력은 정렬/중복 제거/보정을 거칩니다.
    ///
    /// # Arguments
    /// * `items` - 초기 캔들 목록 (순서 무관)
    /// * `max_size` - 저장소의 최대 크기
    pub fn new(items: Vec<Candle>, max_size: usize) -> CandleStore {
        let mut store = CandleStore {
            items: Vec::with_capacity(items.len().min(max_size)),
            max_size,
        };

        let total = items.len();
        for item in items {
            store.add(item);
        }

        if store.items.len() < total {
            log::debug!(
                "캔들 정리: 입력 {}개 -> 유지 {}개",
                total,
                store.items.len()
            );
        }

        store
    }

    /// 캔들을 시간 순서 위치에 삽입합니다.
    ///
    /// 같은 시간이 이미 있으면 교체하고, 보정할 수 없는 캔들은 버립니다.
    ///
    /// # Arguments
    /// * `data` - 삽입할 캔들
    pub fn add(&mut self, data: Candle) {
        let Some(candle) = repair(data) else {
            log::trace!("유효하지 않은 캔들 무시: t={}", data.time);
            return;
        };

        match self
            .items
            .binary_search_by(|item| item.time.cmp(&candle.time))
        {
            Ok(idx) => self.items[idx] = candle,
            Err(idx) => self.items.insert(idx, candle),
        }

        if self.items.len() > self.max_size {
            let excess = self.items.len() - self.max_size;
            self.items.drain(0..excess);
        }
    }

    /// 저장소에 있는 캔들 수
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 저장소가 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 가장 최신 캔들
    pub fn last(&self) -> Option<&Candle> {
        self.items.last()
    }

    /// 시간 오름차순 캔들 슬라이스
    pub fn items(&self) -> &[Candle] {
        &self.items
    }

    /// 캔들 벡터로 변환
    pub fn into_items(self) -> Vec<Candle> {
        self.items
    }

    /// 지정한 시각(포함) 이전의 캔들만 반환합니다. 백테스트 선별에 사용됩니다.
    ///
    /// # Arguments
    /// * `cutoff` - 기준 시각 (ms)
    pub fn items_until(&self, cutoff: i64) -> &[Candle] {
        let end = self.items.partition_point(|c| c.time <= cutoff);
        &self.items[..end]
    }

    /// 최근 n개 캔들의 종가가 연속적으로 상승하는지 확인합니다.
    pub fn is_rise(&self, n: usize) -> bool {
        let count = self.items.len().min(n);
        if count < 2 {
            return false;
        }

        let tail = &self.items[self.items.len() - count..];
        let result = tail.windows(2).all(|w| w[1].close > w[0].close);
        if result {
            log::trace!("RISE: true");
        }
        result
    }

    /// 최근 n개 캔들의 종가가 연속적으로 하락하는지 확인합니다.
    pub fn is_fall(&self, n: usize) -> bool {
        let count = self.items.len().min(n);
        if count < 2 {
            return false;
        }

        let tail = &self.items[self.items.len() - count..];
        let result = tail.windows(2).all(|w| w[1].close < w[0].close);
        if result {
            log::trace!("FALL: true");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(time: i64, close: f64) -> Candle {
        Candle::new(time, close, close + 1.0, close - 1.0, close, 100)
    }

    #[test]
    fn test_validate_series() {
        assert_eq!(validate_series(&[candle(1, 10.0), candle(2, 11.0)]), Ok(()));
        assert_eq!(
            validate_series(&[candle(2, 10.0), candle(1, 11.0)]),
            Err(SeriesError::NotAscending { index: 1 })
        );
        assert_eq!(
            validate_series(&[candle(1, 10.0), candle(1, 11.0)]),
            Err(SeriesError::DuplicateTime { time: 1 })
        );
    }

    #[test]
    fn test_repair_swaps_inverted_range() {
        let bad = Candle::new(1, 10.0, 9.0, 11.0, 10.5, 100);
        let fixed = repair(bad).unwrap();
        assert_eq!(fixed.high, 11.0);
        assert_eq!(fixed.low, 9.0);
        assert!(fixed.is_valid());
    }

    #[test]
    fn test_items_until() {
        let store = CandleStore::new((1..=5).map(|t| candle(t, 10.0)).collect(), 10);
        assert_eq!(store.items_until(3).len(), 3);
        assert_eq!(store.items_until(0).len(), 0);
        assert_eq!(store.items_until(99).len(), 5);
    }
}
