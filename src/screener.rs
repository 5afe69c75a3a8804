use crate::candle_store::{CandleStore, validate_series};
use crate::config::EngineConfig;
use crate::filter::{ConditionLogic, ScreenCondition, screen_with};
use crate::model::Candle;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join_all;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 스크리너 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenerConfig {
    /// 동시에 처리할 종목 수
    pub batch_size: usize,
    /// 조건 평가에 필요한 최소 캔들 수
    pub min_candles: usize,
    /// CD 조건이 확인하는 최근 봉 수
    pub cd_recent_bars: usize,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        ScreenerConfig {
            batch_size: 15,
            min_candles: 30,
            cd_recent_bars: 10,
        }
    }
}

/// 캔들 주기
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInterval {
    #[serde(rename = "1m")]
    Min1,
    #[serde(rename = "3m")]
    Min3,
    #[serde(rename = "5m")]
    Min5,
    #[serde(rename = "15m")]
    Min15,
    #[serde(rename = "30m")]
    Min30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "2h")]
    Hour2,
    #[serde(rename = "3h")]
    Hour3,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "1w")]
    Week1,
    #[serde(rename = "1mo")]
    Month1,
}

impl TimeInterval {
    pub const ALL: [TimeInterval; 12] = [
        TimeInterval::Min1,
        TimeInterval::Min3,
        TimeInterval::Min5,
        TimeInterval::Min15,
        TimeInterval::Min30,
        TimeInterval::Hour1,
        TimeInterval::Hour2,
        TimeInterval::Hour3,
        TimeInterval::Hour4,
        TimeInterval::Day1,
        TimeInterval::Week1,
        TimeInterval::Month1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInterval::Min1 => "1m",
            TimeInterval::Min3 => "3m",
            TimeInterval::Min5 => "5m",
            TimeInterval::Min15 => "15m",
            TimeInterval::Min30 => "30m",
            TimeInterval::Hour1 => "1h",
            TimeInterval::Hour2 => "2h",
            TimeInterval::Hour3 => "3h",
            TimeInterval::Hour4 => "4h",
            TimeInterval::Day1 => "1d",
            TimeInterval::Week1 => "1w",
            TimeInterval::Month1 => "1mo",
        }
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TimeInterval {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        TimeInterval::ALL
            .iter()
            .find(|iv| iv.as_str() == name)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("알 수 없는 캔들 주기: {}", s))
    }
}

/// 캔들 데이터 공급자
///
/// 시세 조회는 외부 구현에 맡깁니다.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// 종목과 주기에 해당하는 캔들 조회
    async fn fetch(&self, symbol: &str, interval: TimeInterval) -> Result<Vec<Candle>>;
}

/// 작업 취소 플래그
///
/// 복제본끼리 같은 상태를 공유합니다.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 조건 하나와 그 조건을 확인할 주기 목록
///
/// 모든 주기에서 조건이 충족되어야 합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    pub condition: ScreenCondition,
    pub intervals: Vec<TimeInterval>,
}

impl ConditionSpec {
    pub fn new(condition: ScreenCondition, intervals: Vec<TimeInterval>) -> Self {
        ConditionSpec {
            condition,
            intervals,
        }
    }

    /// 결과 표시용 태그 (`조건@주기1,주기2`)
    pub fn tag(&self) -> String {
        let intervals: Vec<&str> = self.intervals.iter().map(|iv| iv.as_str()).collect();
        format!("{}@{}", self.condition, intervals.join(","))
    }
}

/// 최신 종가 가격 범위
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

/// 스크리닝 작업 정의
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerJob {
    pub symbols: Vec<String>,
    pub conditions: Vec<ConditionSpec>,
    #[serde(default)]
    pub logic: ConditionLogic,
    /// 백테스트 기준일 (YYYYMMDD). 이 날짜 0시(UTC) 이후 캔들은 제외합니다.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backtest_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,
}

/// 작업 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenerStatus {
    Completed,
    Cancelled,
}

/// 조건을 충족한 종목
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenerMatch {
    pub symbol: String,
    pub matched_conditions: Vec<String>,
}

/// 스크리닝 결과 보고서
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerReport {
    pub status: ScreenerStatus,
    /// 처리가 끝난 종목 수
    pub progress: usize,
    pub total: usize,
    pub results: Vec<ScreenerMatch>,
}

/// 백테스트 기준일 문자열을 밀리초 타임스탬프로 변환
///
/// 앞 8자리(YYYYMMDD)만 사용합니다.
pub fn parse_backtest_cutoff(date: &str) -> Result<i64> {
    let digits = date.trim().get(..8).unwrap_or(date.trim());
    let day = NaiveDate::parse_from_str(digits, "%Y%m%d")
        .with_context(|| format!("잘못된 백테스트 기준일: {date}"))?;
    let midnight = day
        .and_hms_opt(0, 0, 0)
        .with_context(|| format!("잘못된 백테스트 기준일: {date}"))?;
    Ok(midnight.and_utc().timestamp_millis())
}

/// 종목 스크리너
pub struct Screener {
    config: EngineConfig,
}

impl Screener {
    pub fn new(config: EngineConfig) -> Self {
        Screener { config }
    }

    /// 스크리닝 작업 실행
    ///
    /// 종목을 `batch_size`개씩 묶어 동시에 평가합니다. 취소 플래그는 배치 시작 전과
    /// 종목 평가 직전에 확인하며, 종목별 조회 실패는 경고 로그만 남기고 건너뜁니다.
    ///
    /// # Returns
    /// * `Result<ScreenerReport>` - 기준일 형식이 잘못된 경우에만 오류
    pub async fn run<S: CandleSource>(
        &self,
        job: &ScreenerJob,
        source: &S,
        cancel: &CancelFlag,
    ) -> Result<ScreenerReport> {
        let cutoff = job
            .backtest_date
            .as_deref()
            .map(parse_backtest_cutoff)
            .transpose()?;

        let total = job.symbols.len();
        let batch_size = self.config.screener.batch_size.max(1);
        let mut progress = 0;
        let mut results = Vec::new();

        info!(
            "스크리닝 시작: 종목 {}개, 조건 {}개, {:?}",
            total,
            job.conditions.len(),
            job.logic
        );

        for batch in job.symbols.chunks(batch_size) {
            if cancel.is_cancelled() {
                info!("스크리닝 취소됨: {progress}/{total}");
                return Ok(ScreenerReport {
                    status: ScreenerStatus::Cancelled,
                    progress,
                    total,
                    results,
                });
            }

            let outcomes = join_all(
                batch
                    .iter()
                    .map(|symbol| self.evaluate_symbol(symbol, job, cutoff, source, cancel)),
            )
            .await;

            for (symbol, outcome) in batch.iter().zip(outcomes) {
                match outcome {
                    Ok(Some(found)) => results.push(found),
                    Ok(None) => {}
                    Err(e) => warn!("종목 {symbol} 스크리닝 실패, 건너뜀: {e:#}"),
                }
            }

            progress = (progress + batch.len()).min(total);
            debug!("스크리닝 진행: {progress}/{total}, 결과 {}개", results.len());
        }

        info!("스크리닝 완료: 결과 {}개", results.len());
        Ok(ScreenerReport {
            status: ScreenerStatus::Completed,
            progress: total,
            total,
            results,
        })
    }

    /// 종목 하나 평가
    ///
    /// 조건의 모든 주기를 조회하며, 어느 주기든 최신 종가가 가격 범위를 벗어나면 `Ok(None)`
    async fn evaluate_symbol<S: CandleSource>(
        &self,
        symbol: &str,
        job: &ScreenerJob,
        cutoff: Option<i64>,
        source: &S,
        cancel: &CancelFlag,
    ) -> Result<Option<ScreenerMatch>> {
        if cancel.is_cancelled() {
            return Ok(None);
        }

        let mut matched_conditions = Vec::new();
        let mut outcomes = Vec::with_capacity(job.conditions.len());
        for spec in &job.conditions {
            let mut interval_matches = Vec::with_capacity(spec.intervals.len());

            for &interval in &spec.intervals {
                let candles = self.load_candles(symbol, interval, cutoff, source).await?;

                if let (Some(range), Some(last)) = (job.price_range, candles.last()) {
                    if !range.contains(last.close) {
                        debug!("종목 {symbol} {interval} 가격 범위 밖: {:.2}", last.close);
                        return Ok(None);
                    }
                }

                interval_matches.push(screen_with(spec.condition, &candles, &self.config));
            }

            let all_intervals = !interval_matches.is_empty() && interval_matches.iter().all(|m| *m);

            if all_intervals {
                matched_conditions.push(spec.tag());
            }
            outcomes.push(all_intervals);
        }

        let passes = job.logic.combine(outcomes);

        Ok(passes.then(|| ScreenerMatch {
            symbol: symbol.to_owned(),
            matched_conditions,
        }))
    }

    /// 캔들 조회 후 정렬/정리하고 기준일 이후 캔들 제거
    ///
    /// 정리된 시리즈는 시간 오름차순 검증을 통과해야 합니다.
    async fn load_candles<S: CandleSource>(
        &self,
        symbol: &str,
        interval: TimeInterval,
        cutoff: Option<i64>,
        source: &S,
    ) -> Result<Vec<Candle>> {
        let raw = source
            .fetch(symbol, interval)
            .await
            .with_context(|| format!("{symbol} {interval} 캔들 조회 실패"))?;
        let max_size = raw.len().max(1);
        let store = CandleStore::new(raw, max_size);
        let candles = match cutoff {
            Some(cutoff) => store.items_until(cutoff).to_vec(),
            None => store.into_items(),
        };
        validate_series(&candles).with_context(|| format!("{symbol} {interval} 캔들 검증 실패"))?;
        Ok(candles)
    }
}
