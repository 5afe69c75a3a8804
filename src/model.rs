use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// OHLCV 캔들
///
/// 시간은 밀리초 단위 유닉스 타임스탬프이며, 시리즈는 시간 오름차순으로 정렬되어 있다고 가정합니다.
/// 불변식: `low <= min(open, close) <= max(open, close) <= high`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// 캔들 시작 시각 (ms)
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// 거래량
    pub volume: u64,
}

impl Candle {
    /// 새 캔들 생성
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Candle {
        Candle {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 캔들 시각을 UTC 시간으로 변환
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.time).unwrap_or_default()
    }

    /// 고가 - 저가
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// 거래량을 실수로 반환
    pub fn volume_f64(&self) -> f64 {
        self.volume as f64
    }

    /// OHLC 불변식을 만족하는지 확인
    pub fn is_valid(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        prices.iter().all(|p| p.is_finite())
            && self.low <= self.open.min(self.close)
            && self.open.max(self.close) <= self.high
    }
}

impl Display for Candle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Candle(t={}, o={:.2}, h={:.2}, l={:.2}, c={:.2}, v={})",
            self.time, self.open, self.high, self.low, self.close, self.volume
        )
    }
}

/// 매수/매도 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    /// 매수
    Buy,
    /// 매도
    Sell,
}

/// 신호 강도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Weak,
    Medium,
    Strong,
}

impl Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strength::Strong => write!(f, "strong"),
            Strength::Medium => write!(f, "medium"),
            Strength::Weak => write!(f, "weak"),
        }
    }
}

/// CD(抄底/逃顶) 신호
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CDSignal {
    pub time: i64,
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub strength: Strength,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dea_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd_value: Option<f64>,
}

impl Display for CDSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CD({}: {} {})", self.time, self.label, self.strength)
    }
}

/// NX(이동평균 교차) 신호
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NXSignal {
    pub time: i64,
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub label: String,
}

/// 매수/매도 압력 급변 신호
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureSignal {
    /// 양(+)의 압력이 두 배 이상 증가
    StrongUp,
    /// 음(-)의 압력이 두 배 이상 증가
    StrongDown,
}

/// 캔들 하나에 대한 매수/매도 압력
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuySellPressure {
    pub time: i64,
    pub pressure: f64,
    /// 직전 대비 변화율 (%)
    pub change_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<PressureSignal>,
}

/// 黄蓝梯子 레벨 (캔들당 하나)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderLevel {
    pub time: i64,
    pub blue_up: f64,
    pub blue_dn: f64,
    pub yellow_up: f64,
    pub yellow_dn: f64,
}

impl LadderLevel {
    /// 파란 밴드 중간값
    pub fn blue_mid(&self) -> f64 {
        (self.blue_up + self.blue_dn) / 2.0
    }

    /// 노란 밴드 중간값
    pub fn yellow_mid(&self) -> f64 {
        (self.yellow_up + self.yellow_dn) / 2.0
    }

    /// 종가가 파란 밴드를 벗어나 있으면 밴드를 그린다
    pub fn show_blue(&self, close: f64) -> bool {
        close > self.blue_up || close < self.blue_dn
    }

    /// 종가가 노란 밴드를 벗어나 있으면 밴드를 그린다
    pub fn show_yellow(&self, close: f64) -> bool {
        close > self.yellow_up || close < self.yellow_dn
    }
}

/// 모멘텀 신호 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentumSignalType {
    /// diff가 +임계값을 상향 돌파
    DoubleDigitUp,
    /// diff가 -임계값을 하향 돌파
    DoubleDigitDown,
    /// 매수 모멘텀(노란선)이 매도 모멘텀(녹색선)을 상향 돌파
    YellowCrossGreen,
    /// 매수 모멘텀이 매도 모멘텀 아래로 하향 돌파
    GreenToRed,
    /// diff가 양수 구간에서 두 배 이상 증가
    StrongBuy,
}

/// 캔들 하나에 대한 매수/매도 모멘텀
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentumSignal {
    pub time: i64,
    pub buy_momentum: f64,
    pub sell_momentum: f64,
    pub diff: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<MomentumSignalType>,
    /// 弱转强: 상향 돌파와 diff 급증이 같은 봉에서 동시에 발생
    pub weak_to_strong: bool,
    /// 强转弱: 하향 돌파와 diff 급락이 같은 봉에서 동시에 발생
    pub strong_to_weak: bool,
}

/// 분형(分型) 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FractalType {
    Top,
    Bottom,
}

/// 缠论 분형 신호
///
/// `signal_type`은 MACD 다이버전스가 확인된 분형에만 존재합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChanLunSignal {
    pub time: i64,
    #[serde(rename = "type")]
    pub fractal_type: FractalType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_type: Option<SignalType>,
    pub label: String,
    pub strength: Strength,
    pub divergence: bool,
}

/// 笔 端点 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiPointType {
    High,
    Low,
}

/// 笔(스트로크) 端点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiPoint {
    /// 원본 캔들 인덱스
    pub index: usize,
    pub time: i64,
    pub price: f64,
    #[serde(rename = "type")]
    pub point_type: BiPointType,
}

/// 중추 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotDirection {
    Up,
    Down,
}

/// 中枢 (겹치는 笔들이 만드는 횡보 가격대)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZhongShu {
    pub start_time: i64,
    pub end_time: i64,
    pub start_index: usize,
    pub end_index: usize,
    pub high: f64,
    pub low: f64,
    pub direction: PivotDirection,
}

impl ZhongShu {
    /// 가격이 중추 범위(허용 오차 포함) 안에 있는지 확인
    pub fn contains(&self, price: f64, tolerance: f64) -> bool {
        price >= self.low * (1.0 - tolerance) && price <= self.high * (1.0 + tolerance)
    }
}

/// 추세 판정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Bull,
    Bear,
    Range,
}

/// 고급 禅动 지표 (캔들당 하나)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedChanData {
    pub time: i64,
    /// 买线 (ZIGZAG)
    pub buy_line: f64,
    /// 卖线 (买线의 EMA)
    pub sell_line: f64,
    /// 중추 채널 상단
    pub xxh25: f64,
    /// 중추 채널 하단
    pub xxl25: f64,
    /// 확장 상단 (高0, 做空 기준선)
    pub zhongshu_high: f64,
    /// 확장 하단 (低0, 做多 기준선)
    pub zhongshu_low: f64,
    pub d90_top: f64,
    pub d90_bottom: f64,
    #[serde(rename = "d90H")]
    pub d90_h: f64,
    #[serde(rename = "d90L")]
    pub d90_l: f64,
    /// 중추 채널 중간선
    pub long_line: f64,
    /// D90 중간선
    pub short_line: f64,
    pub trend: Trend,
}

/// 고급 禅动 신호 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChanCategory {
    B1,
    B2,
    B3,
    S1,
    S2,
    S3,
    TrendBuy,
    TrendSell,
    RangeBuy,
    RangeSell,
    NearSupport,
    NearResistance,
    NearZhongshu,
}

/// 고급 禅动 매수/매도 신호
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedChanSignal {
    pub time: i64,
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub label: String,
    pub strength: Strength,
    pub category: ChanCategory,
}

impl AdvancedChanSignal {
    pub fn new(
        time: i64,
        signal_type: SignalType,
        label: &str,
        strength: Strength,
        category: ChanCategory,
    ) -> AdvancedChanSignal {
        AdvancedChanSignal {
            time,
            signal_type,
            label: label.to_owned(),
            strength,
            category,
        }
    }
}
