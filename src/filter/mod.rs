use crate::config::{DEFAULT_ENGINE_CONFIG, EngineConfig};
use crate::model::Candle;
use anyhow::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::str::FromStr;

// 각 필터 모듈 가져오기
mod advanced_chan;
mod cd;
mod chanlun;
mod ladder;
mod momentum;
mod nx;
mod pressure;

/// 필터 공통 유틸리티 함수
pub mod utils {
    /// 경계 조건 체크 (캔들 데이터 부족 확인)
    pub fn check_sufficient_candles(
        candles_len: usize,
        required_length: usize,
        symbol: &str,
    ) -> bool {
        if candles_len < required_length {
            log::debug!(
                "종목 {} 캔들 데이터 부족: {} < {}",
                symbol,
                candles_len,
                required_length
            );
            return false;
        }
        true
    }
}

/// 스크리닝 조건
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ScreenCondition {
    /// 최근 CD 매수 신호
    CdBuy,
    /// 최근 CD 매도 신호
    CdSell,
    /// 최신 봉 압력 급증
    PressureStrongUp,
    /// 최신 봉 압력 급락
    PressureStrongDown,
    /// 梯子 강세
    BlueLadderStrong,
    /// 모멘텀 강한 매수
    MomentumStrongBuy,
    /// 모멘텀 diff 상향 돌파
    MomentumDoubleDigitUp,
    /// 매수 모멘텀이 매도 모멘텀 상향 돌파
    MomentumYellowCrossGreen,
    /// 매수 모멘텀이 매도 모멘텀 하향 돌파
    MomentumGreenToRed,
    /// 缠论 매수 (최근 분형이 바닥 다이버전스)
    ChanlunBuy,
    /// 缠论 매도 (최근 분형이 천장 다이버전스)
    ChanlunSell,
    /// 고급 禅动 매수
    AdvancedChanBuy,
    /// 고급 禅动 매도
    AdvancedChanSell,
    /// 황금 지지선 근접
    NearGoldenSupport,
    /// 중추 근접
    NearZhongshu,
    /// 최근 NX 매수 (거래량 동반 상향 교차)
    NxBuy,
    /// 최근 NX 매도 (하향 교차)
    NxSell,
}

impl ScreenCondition {
    /// 모든 조건 목록
    pub const ALL: [ScreenCondition; 17] = [
        ScreenCondition::CdBuy,
        ScreenCondition::CdSell,
        ScreenCondition::PressureStrongUp,
        ScreenCondition::PressureStrongDown,
        ScreenCondition::BlueLadderStrong,
        ScreenCondition::MomentumStrongBuy,
        ScreenCondition::MomentumDoubleDigitUp,
        ScreenCondition::MomentumYellowCrossGreen,
        ScreenCondition::MomentumGreenToRed,
        ScreenCondition::ChanlunBuy,
        ScreenCondition::ChanlunSell,
        ScreenCondition::AdvancedChanBuy,
        ScreenCondition::AdvancedChanSell,
        ScreenCondition::NearGoldenSupport,
        ScreenCondition::NearZhongshu,
        ScreenCondition::NxBuy,
        ScreenCondition::NxSell,
    ];

    /// 조건 이름 (직렬화 이름과 동일)
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenCondition::CdBuy => "cd_buy",
            ScreenCondition::CdSell => "cd_sell",
            ScreenCondition::PressureStrongUp => "pressure_strong_up",
            ScreenCondition::PressureStrongDown => "pressure_strong_down",
            ScreenCondition::BlueLadderStrong => "blue_ladder_strong",
            ScreenCondition::MomentumStrongBuy => "momentum_strong_buy",
            ScreenCondition::MomentumDoubleDigitUp => "momentum_double_digit_up",
            ScreenCondition::MomentumYellowCrossGreen => "momentum_yellow_cross_green",
            ScreenCondition::MomentumGreenToRed => "momentum_green_to_red",
            ScreenCondition::ChanlunBuy => "chanlun_buy",
            ScreenCondition::ChanlunSell => "chanlun_sell",
            ScreenCondition::AdvancedChanBuy => "advanced_chan_buy",
            ScreenCondition::AdvancedChanSell => "advanced_chan_sell",
            ScreenCondition::NearGoldenSupport => "near_golden_support",
            ScreenCondition::NearZhongshu => "near_zhongshu",
            ScreenCondition::NxBuy => "nx_buy",
            ScreenCondition::NxSell => "nx_sell",
        }
    }
}

impl fmt::Display for ScreenCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScreenCondition {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        ScreenCondition::ALL
            .iter()
            .find(|c| c.as_str() == name)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("알 수 없는 스크리닝 조건: {}", s))
    }
}

/// 여러 조건의 결합 방식
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConditionLogic {
    /// 모든 조건 만족
    #[default]
    And,
    /// 하나 이상 만족
    Or,
}

impl ConditionLogic {
    /// 조건별 결과 결합
    pub fn combine(&self, results: impl IntoIterator<Item = bool>) -> bool {
        let mut results = results.into_iter().peekable();
        if results.peek().is_none() {
            return false;
        }
        match self {
            ConditionLogic::And => results.all(|r| r),
            ConditionLogic::Or => results.any(|r| r),
        }
    }
}

// 각 필터 함수 재노출(re-export)
pub use advanced_chan::filter_advanced_chan;
pub use cd::filter_cd;
pub use chanlun::filter_chanlun;
pub use ladder::filter_ladder;
pub use momentum::filter_momentum;
pub use nx::filter_nx;
pub use pressure::filter_pressure;

/// 스크리닝 조건 적용
pub struct TechnicalFilter;

impl TechnicalFilter {
    /// 개별 종목에 스크리닝 조건 적용
    ///
    /// # Arguments
    /// * `symbol` - 로그용 종목 코드
    /// * `condition` - 스크리닝 조건
    /// * `candles` - 캔들 데이터 (시간 오름차순)
    /// * `config` - 엔진 설정
    ///
    /// # Returns
    /// * `Result<bool>` - 최신 봉 기준 조건 충족 여부
    pub fn check_filter(
        symbol: &str,
        condition: ScreenCondition,
        candles: &[Candle],
        config: &EngineConfig,
    ) -> Result<bool> {
        if !utils::check_sufficient_candles(candles.len(), config.screener.min_candles, symbol) {
            return Ok(false);
        }

        match condition {
            ScreenCondition::CdBuy | ScreenCondition::CdSell => {
                filter_cd(symbol, condition, candles, config)
            }
            ScreenCondition::PressureStrongUp | ScreenCondition::PressureStrongDown => {
                filter_pressure(symbol, condition, candles, config)
            }
            ScreenCondition::BlueLadderStrong => filter_ladder(symbol, candles, config),
            ScreenCondition::MomentumStrongBuy
            | ScreenCondition::MomentumDoubleDigitUp
            | ScreenCondition::MomentumYellowCrossGreen
            | ScreenCondition::MomentumGreenToRed => {
                filter_momentum(symbol, condition, candles, config)
            }
            ScreenCondition::ChanlunBuy | ScreenCondition::ChanlunSell => {
                filter_chanlun(symbol, condition, candles, config)
            }
            ScreenCondition::AdvancedChanBuy
            | ScreenCondition::AdvancedChanSell
            | ScreenCondition::NearGoldenSupport
            | ScreenCondition::NearZhongshu => {
                filter_advanced_chan(symbol, condition, candles, config)
            }
            ScreenCondition::NxBuy | ScreenCondition::NxSell => {
                filter_nx(symbol, condition, candles, config)
            }
        }
    }

    /// 개별 종목에 여러 조건 적용
    pub fn check_filters(
        symbol: &str,
        conditions: &[ScreenCondition],
        logic: ConditionLogic,
        candles: &[Candle],
        config: &EngineConfig,
    ) -> Result<bool> {
        let mut results = Vec::with_capacity(conditions.len());
        for condition in conditions {
            debug!("종목 {symbol} 스크리닝 조건 적용 중: {condition}");
            let matched = Self::check_filter(symbol, *condition, candles, config)?;
            if !matched && logic == ConditionLogic::And {
                return Ok(false);
            }
            if matched && logic == ConditionLogic::Or {
                return Ok(true);
            }
            results.push(matched);
        }
        Ok(logic.combine(results))
    }
}

/// 기본 설정으로 스크리닝 조건 평가
pub fn screen(condition: ScreenCondition, candles: &[Candle]) -> bool {
    screen_with(condition, candles, &DEFAULT_ENGINE_CONFIG)
}

/// 조건 이름으로 스크리닝 조건 평가
///
/// 알 수 없는 조건 이름은 false
pub fn screen_named(name: &str, candles: &[Candle]) -> bool {
    match name.parse::<ScreenCondition>() {
        Ok(condition) => screen(condition, candles),
        Err(e) => {
            warn!("{e}");
            false
        }
    }
}

/// 스크리닝 조건 평가
///
/// 지표 계산 중 발생한 오류와 패닉은 모두 false로 처리하고 경고 로그를 남깁니다.
pub fn screen_with(condition: ScreenCondition, candles: &[Candle], config: &EngineConfig) -> bool {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        TechnicalFilter::check_filter("-", condition, candles, config)
    }));

    match outcome {
        Ok(Ok(matched)) => matched,
        Ok(Err(e)) => {
            warn!("스크리닝 조건 {condition} 평가 실패: {e}");
            false
        }
        Err(_) => {
            warn!("스크리닝 조건 {condition} 평가 중 패닉 발생");
            false
        }
    }
}
