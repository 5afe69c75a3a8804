use crate::model::{Candle, FractalType};
use log::trace;

/// 포함 관계 병합 후의 봉
///
/// `members`는 이 봉을 구성한 원본 캔들 인덱스 목록입니다 (오름차순).
#[derive(Debug, Clone, PartialEq)]
pub struct MergedBar {
    pub high: f64,
    pub low: f64,
    pub members: Vec<usize>,
}

impl MergedBar {
    fn from_candle(index: usize, candle: &Candle) -> MergedBar {
        MergedBar {
            high: candle.high,
            low: candle.low,
            members: vec![index],
        }
    }

    /// 두 봉 중 하나가 다른 하나를 포함하는지 확인
    fn is_inclusive(&self, candle: &Candle) -> bool {
        let containing = candle.high >= self.high && candle.low <= self.low;
        let contained = candle.high <= self.high && candle.low >= self.low;
        containing || contained
    }

    /// 이 봉의 멤버 중 최고가를 가진 원본 인덱스
    pub fn highest_member(&self, candles: &[Candle]) -> usize {
        self.members
            .iter()
            .copied()
            .fold(None, |best: Option<usize>, i| match best {
                Some(b) if candles[b].high >= candles[i].high => Some(b),
                _ => Some(i),
            })
            .unwrap_or_default()
    }

    /// 이 봉의 멤버 중 최저가를 가진 원본 인덱스
    pub fn lowest_member(&self, candles: &[Candle]) -> usize {
        self.members
            .iter()
            .copied()
            .fold(None, |best: Option<usize>, i| match best {
                Some(b) if candles[b].low <= candles[i].low => Some(b),
                _ => Some(i),
            })
            .unwrap_or_default()
    }
}

/// 병합 시리즈에서 찾은 분형
#[derive(Debug, Clone, PartialEq)]
pub struct Fractal {
    pub fractal_type: FractalType,
    /// 병합 시리즈에서의 인덱스
    pub merged_index: usize,
    /// 극값을 가진 원본 캔들 인덱스
    pub candle_index: usize,
    /// 분형 가격 (꼭대기는 고가, 바닥은 저가)
    pub price: f64,
}

/// K선 포함 관계 처리 결과 (병합 봉 아레나)
///
/// 분형, 笔, 다이버전스 계산이 모두 같은 병합 결과를 공유합니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedSeries {
    pub bars: Vec<MergedBar>,
}

impl MergedSeries {
    /// 포함 관계를 처리하여 병합 시리즈 생성
    ///
    /// 방향은 직전 병합 봉의 고가와 비교하여 정하고, 병합 봉이 하나뿐이면
    /// 들어오는 캔들의 양봉 여부로 정합니다. 상승이면 고가/저가 모두 큰 값,
    /// 하락이면 모두 작은 값을 취합니다.
    pub fn merge(candles: &[Candle]) -> MergedSeries {
        let mut bars: Vec<MergedBar> = Vec::with_capacity(candles.len());

        for (i, candle) in candles.iter().enumerate() {
            let len = bars.len();
            let Some(last) = bars.last() else {
                bars.push(MergedBar::from_candle(i, candle));
                continue;
            };

            if !last.is_inclusive(candle) {
                bars.push(MergedBar::from_candle(i, candle));
                continue;
            }

            let is_up = if len >= 2 {
                last.high > bars[len - 2].high
            } else {
                candle.close > candle.open
            };

            let last = &mut bars[len - 1];
            if is_up {
                last.high = last.high.max(candle.high);
                last.low = last.low.max(candle.low);
            } else {
                last.high = last.high.min(candle.high);
                last.low = last.low.min(candle.low);
            }
            last.members.push(i);
        }

        trace!("K선 병합: {}개 → {}개", candles.len(), bars.len());
        MergedSeries { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 꼭대기/바닥 분형 탐색
    ///
    /// 가운데 봉의 고가가 양옆보다 엄격히 높으면 꼭대기, 저가가 엄격히 낮으면 바닥입니다.
    /// 분형 위치는 해당 병합 봉에서 극값을 가진 원본 캔들입니다.
    pub fn fractals(&self, candles: &[Candle]) -> Vec<Fractal> {
        if self.bars.len() < 3 {
            return Vec::new();
        }

        self.bars
            .windows(3)
            .enumerate()
            .filter_map(|(offset, window)| {
                let (prev, curr, next) = (&window[0], &window[1], &window[2]);
                let merged_index = offset + 1;
                if curr.high > prev.high && curr.high > next.high {
                    Some(Fractal {
                        fractal_type: FractalType::Top,
                        merged_index,
                        candle_index: curr.highest_member(candles),
                        price: curr.high,
                    })
                } else if curr.low < prev.low && curr.low < next.low {
                    Some(Fractal {
                        fractal_type: FractalType::Bottom,
                        merged_index,
                        candle_index: curr.lowest_member(candles),
                        price: curr.low,
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// 병합 봉 구간 `[from, to]`에 속한 원본 캔들 인덱스 범위
    pub fn candle_span(&self, from: usize, to: usize) -> Option<(usize, usize)> {
        let first = self.bars.get(from)?.members.first()?;
        let last = self.bars.get(to)?.members.last()?;
        Some((*first, *last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(i: i64, high: f64, low: f64) -> Candle {
        Candle::new(i, low, high, low, high, 10)
    }

    #[test]
    fn test_merge_contained_bar_in_uptrend() {
        let candles = vec![bar(0, 10.0, 8.0), bar(1, 12.0, 9.0), bar(2, 11.5, 9.5)];
        let merged = MergedSeries::merge(&candles);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.bars[1].high, 12.0);
        assert_eq!(merged.bars[1].low, 9.5);
        assert_eq!(merged.bars[1].members, vec![1, 2]);
    }

    #[test]
    fn test_merge_contained_bar_in_downtrend() {
        let candles = vec![bar(0, 12.0, 10.0), bar(1, 11.0, 8.0), bar(2, 10.5, 8.5)];
        let merged = MergedSeries::merge(&candles);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.bars[1].high, 10.5);
        assert_eq!(merged.bars[1].low, 8.0);
    }

    #[test]
    fn test_first_pair_uses_candle_direction() {
        // 두 번째 캔들이 첫 캔들을 포함하고 음봉 → 하락 병합
        let candles = vec![
            bar(0, 10.0, 9.0),
            Candle::new(1, 10.5, 10.5, 8.5, 8.6, 10),
        ];
        let merged = MergedSeries::merge(&candles);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.bars[0].high, 10.0);
        assert_eq!(merged.bars[0].low, 8.5);
    }

    #[test]
    fn test_fractals_strict_extremes() {
        let candles = vec![
            bar(0, 10.0, 9.0),
            bar(1, 11.0, 10.0),
            bar(2, 12.0, 11.0),
            bar(3, 11.0, 10.0),
            bar(4, 10.0, 9.0),
            bar(5, 11.0, 10.0),
        ];
        let merged = MergedSeries::merge(&candles);
        let fractals = merged.fractals(&candles);
        assert_eq!(fractals.len(), 2);
        assert_eq!(fractals[0].fractal_type, FractalType::Top);
        assert_eq!(fractals[0].candle_index, 2);
        assert_eq!(fractals[1].fractal_type, FractalType::Bottom);
        assert_eq!(fractals[1].candle_index, 4);
    }

    #[test]
    fn test_candle_span() {
        let candles = vec![bar(0, 10.0, 8.0), bar(1, 12.0, 9.0), bar(2, 11.5, 9.5)];
        let merged = MergedSeries::merge(&candles);
        assert_eq!(merged.candle_span(0, 1), Some((0, 2)));
        assert_eq!(merged.candle_span(0, 5), None);
    }
}
