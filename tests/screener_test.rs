use common_test_utils::*;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use stock_signal::config::EngineConfig;
use stock_signal::filter::{ConditionLogic, ScreenCondition};
use stock_signal::model::Candle;
use stock_signal::screener::{
    CancelFlag, CandleSource, ConditionSpec, PriceRange, Screener, ScreenerJob, ScreenerStatus,
    TimeInterval,
};

/// 종목별 캔들을 미리 담아둔 공급자. 목록에 없는 종목은 조회 오류
///
/// `by_interval`에 있는 (종목, 주기)는 기본 캔들 대신 그 캔들을 돌려줍니다.
struct MockSource {
    data: HashMap<String, Vec<Candle>>,
    by_interval: HashMap<(String, TimeInterval), Vec<Candle>>,
    fetches: AtomicUsize,
    cancel_on_fetch: Option<CancelFlag>,
}

impl MockSource {
    fn new(data: Vec<(&str, Vec<Candle>)>) -> Self {
        MockSource {
            data: data
                .into_iter()
                .map(|(symbol, candles)| (symbol.to_owned(), candles))
                .collect(),
            by_interval: HashMap::new(),
            fetches: AtomicUsize::new(0),
            cancel_on_fetch: None,
        }
    }

    fn with_interval(mut self, symbol: &str, interval: TimeInterval, candles: Vec<Candle>) -> Self {
        self.by_interval.insert((symbol.to_owned(), interval), candles);
        self
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CandleSource for MockSource {
    async fn fetch(&self, symbol: &str, interval: TimeInterval) -> Result<Vec<Candle>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(flag) = &self.cancel_on_fetch {
            flag.cancel();
        }
        if let Some(candles) = self.by_interval.get(&(symbol.to_owned(), interval)) {
            return Ok(candles.clone());
        }
        self.data
            .get(symbol)
            .cloned()
            .ok_or_else(|| anyhow!("시세 없음: {symbol}"))
    }
}

fn ladder_job(symbols: &[&str]) -> ScreenerJob {
    ScreenerJob {
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        conditions: vec![ConditionSpec::new(
            ScreenCondition::BlueLadderStrong,
            vec![TimeInterval::Day1],
        )],
        logic: ConditionLogic::And,
        backtest_date: None,
        price_range: None,
    }
}

fn up() -> Vec<Candle> {
    create_uptrend_candles(80, 10.0, 0.5)
}

fn down() -> Vec<Candle> {
    create_downtrend_candles(80, 100.0, 0.5)
}

#[tokio::test]
async fn test_matches_and_tags() {
    let source = MockSource::new(vec![("UP", up()), ("DOWN", down())]);
    let screener = Screener::new(EngineConfig::default());

    let report = screener
        .run(&ladder_job(&["UP", "DOWN"]), &source, &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(report.status, ScreenerStatus::Completed);
    assert_eq!(report.progress, 2);
    assert_eq!(report.total, 2);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].symbol, "UP");
    assert_eq!(
        report.results[0].matched_conditions,
        vec!["blue_ladder_strong@1d".to_string()]
    );
}

#[tokio::test]
async fn test_failing_symbol_is_skipped() {
    let source = MockSource::new(vec![("UP", up()), ("UP2", up())]);
    let screener = Screener::new(EngineConfig::default());

    let report = screener
        .run(&ladder_job(&["UP", "MISSING", "UP2"]), &source, &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(report.status, ScreenerStatus::Completed);
    assert_eq!(report.progress, 3);
    let symbols: Vec<&str> = report.results.iter().map(|m| m.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["UP", "UP2"]);
}

#[tokio::test]
async fn test_cancel_before_start() {
    let source = MockSource::new(vec![("UP", up())]);
    let screener = Screener::new(EngineConfig::default());
    let cancel = CancelFlag::new();
    cancel.cancel();

    let report = screener.run(&ladder_job(&["UP"]), &source, &cancel).await.unwrap();

    assert_eq!(report.status, ScreenerStatus::Cancelled);
    assert_eq!(report.progress, 0);
    assert!(report.results.is_empty());
    assert_eq!(source.fetch_count(), 0);
}

#[tokio::test]
async fn test_cancel_stops_next_batches() {
    let cancel = CancelFlag::new();
    let mut source = MockSource::new(vec![
        ("A", up()),
        ("B", up()),
        ("C", up()),
        ("D", up()),
        ("E", up()),
    ]);
    source.cancel_on_fetch = Some(cancel.clone());

    let mut config = EngineConfig::default();
    config.screener.batch_size = 2;
    let screener = Screener::new(config);

    let report = screener
        .run(&ladder_job(&["A", "B", "C", "D", "E"]), &source, &cancel)
        .await
        .unwrap();

    assert_eq!(report.status, ScreenerStatus::Cancelled);
    assert_eq!(report.progress, 2);
    assert_eq!(report.total, 5);
    // 첫 배치 이후로는 조회하지 않음
    assert!(source.fetch_count() <= 2);
}

#[tokio::test]
async fn test_or_logic_and_multiple_intervals() {
    let source = MockSource::new(vec![("UP", up())]);
    let screener = Screener::new(EngineConfig::default());
    let job = ScreenerJob {
        conditions: vec![
            ConditionSpec::new(
                ScreenCondition::BlueLadderStrong,
                vec![TimeInterval::Day1, TimeInterval::Week1],
            ),
            ConditionSpec::new(ScreenCondition::ChanlunBuy, vec![TimeInterval::Day1]),
        ],
        logic: ConditionLogic::Or,
        ..ladder_job(&["UP"])
    };

    let report = screener.run(&job, &source, &CancelFlag::new()).await.unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(
        report.results[0].matched_conditions,
        vec!["blue_ladder_strong@1d,1w".to_string()]
    );

    let and_job = ScreenerJob {
        logic: ConditionLogic::And,
        ..job
    };
    let report = screener.run(&and_job, &source, &CancelFlag::new()).await.unwrap();
    assert!(report.results.is_empty());
}

#[tokio::test]
async fn test_backtest_cutoff_truncates_candles() {
    let source = MockSource::new(vec![("UP", up())]);
    let screener = Screener::new(EngineConfig::default());

    // 2024-02-10까지 41개 캔들만 남아 梯子 강세에 필요한 60개에 못 미침
    let job = ScreenerJob {
        backtest_date: Some("20240210".to_string()),
        ..ladder_job(&["UP"])
    };
    let report = screener.run(&job, &source, &CancelFlag::new()).await.unwrap();
    assert!(report.results.is_empty());

    let job = ScreenerJob {
        backtest_date: Some("20241231".to_string()),
        ..ladder_job(&["UP"])
    };
    let report = screener.run(&job, &source, &CancelFlag::new()).await.unwrap();
    assert_eq!(report.results.len(), 1);
}

#[tokio::test]
async fn test_invalid_backtest_date_is_error() {
    let source = MockSource::new(vec![("UP", up())]);
    let screener = Screener::new(EngineConfig::default());
    let job = ScreenerJob {
        backtest_date: Some("2024-02".to_string()),
        ..ladder_job(&["UP"])
    };
    assert!(screener.run(&job, &source, &CancelFlag::new()).await.is_err());
}

#[tokio::test]
async fn test_price_range_filter() {
    let source = MockSource::new(vec![("UP", up())]);
    let screener = Screener::new(EngineConfig::default());
    let last_close = up().last().unwrap().close;

    let job = ScreenerJob {
        price_range: Some(PriceRange {
            min: 0.0,
            max: last_close - 1.0,
        }),
        ..ladder_job(&["UP"])
    };
    let report = screener.run(&job, &source, &CancelFlag::new()).await.unwrap();
    assert!(report.results.is_empty());

    let job = ScreenerJob {
        price_range: Some(PriceRange {
            min: 0.0,
            max: last_close + 1.0,
        }),
        ..ladder_job(&["UP"])
    };
    let report = screener.run(&job, &source, &CancelFlag::new()).await.unwrap();
    assert_eq!(report.results.len(), 1);
}

#[tokio::test]
async fn test_price_range_checked_on_every_interval() {
    // 주간 캔들만 가격 범위를 벗어남
    let weekly = create_uptrend_candles(80, 100.0, 5.0);
    let source =
        MockSource::new(vec![("UP", up())]).with_interval("UP", TimeInterval::Week1, weekly);
    let screener = Screener::new(EngineConfig::default());
    let last_close = up().last().unwrap().close;

    // 缠论 매수는 일봉에서 실패하지만 주간 캔들도 조회되어야 함
    let job = ScreenerJob {
        conditions: vec![
            ConditionSpec::new(
                ScreenCondition::ChanlunBuy,
                vec![TimeInterval::Day1, TimeInterval::Week1],
            ),
            ConditionSpec::new(ScreenCondition::BlueLadderStrong, vec![TimeInterval::Day1]),
        ],
        logic: ConditionLogic::Or,
        price_range: Some(PriceRange {
            min: 0.0,
            max: last_close + 1.0,
        }),
        ..ladder_job(&["UP"])
    };

    let report = screener.run(&job, &source, &CancelFlag::new()).await.unwrap();
    assert!(report.results.is_empty());
    assert_eq!(source.fetch_count(), 2);
}

#[tokio::test]
async fn test_unordered_source_is_cleaned_before_analysis() {
    let mut shuffled = up();
    shuffled.reverse();
    let duplicate = shuffled[10];
    shuffled.push(duplicate);

    let source = MockSource::new(vec![("UP", shuffled)]);
    let screener = Screener::new(EngineConfig::default());
    let report = screener
        .run(&ladder_job(&["UP"]), &source, &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(report.results.len(), 1);
}

#[test]
fn test_job_deserializes_from_json() {
    let job: ScreenerJob = serde_json::from_str(
        r#"{
            "symbols": ["AAPL", "MSFT"],
            "conditions": [{"condition": "cd_buy", "intervals": ["1d", "1h"]}],
            "logic": "or"
        }"#,
    )
    .unwrap();
    assert_eq!(job.logic, ConditionLogic::Or);
    assert_eq!(job.conditions[0].intervals, vec![TimeInterval::Day1, TimeInterval::Hour1]);
    assert!(job.backtest_date.is_none());
}
