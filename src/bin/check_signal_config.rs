use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::env;
use std::path::{Path, PathBuf};
use stock_signal::analyzer::{
    calculate_advanced_chan_data, calculate_advanced_chan_signals, calculate_cd_signals,
    calculate_chan_lun_signals, calculate_nx_signals, find_bi_points, find_zhong_shu,
};
use stock_signal::candle_store::CandleStore;
use stock_signal::config::EngineConfig;
use stock_signal::config_loader::{ConfigFormat, ConfigLoader};
use stock_signal::filter::{ConditionLogic, ScreenCondition};
use stock_signal::indicator::ladder::{calculate_ladder, is_ladder_strong};
use stock_signal::indicator::macd::calculate_macd;
use stock_signal::indicator::momentum::calculate_momentum;
use stock_signal::indicator::pressure::calculate_buy_sell_pressure;
use stock_signal::model::Candle;
use stock_signal::screener::{
    CancelFlag, CandleSource, ConditionSpec, Screener, ScreenerJob, TimeInterval,
};

/// 파일에서 읽은 캔들을 그대로 돌려주는 공급자
struct FileCandleSource {
    candles: Vec<Candle>,
}

#[async_trait]
impl CandleSource for FileCandleSource {
    async fn fetch(&self, _symbol: &str, _interval: TimeInterval) -> Result<Vec<Candle>> {
        Ok(self.candles.clone())
    }
}

fn print_usage(program: &str) {
    println!("사용법: {program} <설정_파일_경로> [캔들_JSON_파일] [조건1,조건2,...]");
    let names: Vec<&str> = ScreenCondition::ALL.iter().map(|c| c.as_str()).collect();
    println!("지원되는 조건: {}", names.join(", "));
}

fn load_candles(path: &Path) -> Result<Vec<Candle>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("캔들 파일 읽기 실패: {}", path.display()))?;
    let raw: Vec<Candle> = serde_json::from_str(&content)
        .with_context(|| format!("캔들 파일 파싱 실패: {}", path.display()))?;
    let max_size = raw.len().max(1);
    Ok(CandleStore::new(raw, max_size).into_items())
}

fn print_summary(candles: &[Candle], config: &EngineConfig) {
    println!("캔들 수: {}", candles.len());
    if let Some(last) = candles.last() {
        println!("최근 캔들: {} ({})", last, last.datetime());
    }

    let macd = calculate_macd(candles, &config.macd);
    if let Some(&histogram) = macd.macd.last() {
        println!(
            "{}: 히스토그램 {:.4} (강화 중: {})",
            config.macd,
            histogram,
            macd.is_strengthening(macd.len() - 1)
        );
    }

    let cd = calculate_cd_signals(candles, &config.macd, &config.cd);
    println!("CD 신호: {}개", cd.len());
    if let Some(signal) = cd.last() {
        println!("  최근: {signal}");
    }

    let nx = calculate_nx_signals(candles, &config.nx);
    println!("NX 신호: {}개", nx.len());
    if let Some(signal) = nx.last() {
        println!("  최근: {} {}", signal.time, signal.label);
    }

    let pressure = calculate_buy_sell_pressure(candles, &config.pressure);
    let pressure_signals = pressure.iter().filter(|p| p.signal.is_some()).count();
    println!("압력 급변 신호: {pressure_signals}개");

    let ladder = calculate_ladder(candles, &config.ladder);
    if let (Some(level), Some(last)) = (ladder.last(), candles.last()) {
        println!(
            "梯子: 파란 {:.2}~{:.2} (표시 {}), 노란 {:.2}~{:.2} (표시 {})",
            level.blue_dn,
            level.blue_up,
            level.show_blue(last.close),
            level.yellow_dn,
            level.yellow_up,
            level.show_yellow(last.close)
        );
    }
    println!("梯子 강세: {}", is_ladder_strong(candles, &config.ladder));

    let momentum = calculate_momentum(candles, &config.momentum);
    let latest_momentum = momentum.iter().rev().find_map(|m| m.signal);
    println!("최근 모멘텀 신호: {latest_momentum:?}");

    let chan = calculate_chan_lun_signals(candles, &config.macd, &config.chan);
    let divergences = chan.iter().filter(|s| s.divergence).count();
    println!("缠论 분형: {}개 (다이버전스 {}개)", chan.len(), divergences);

    let bi_points = find_bi_points(candles, &config.advanced_chan);
    let zhong_shus = find_zhong_shu(&bi_points);
    println!("笔 端点: {}개, 中枢: {}개", bi_points.len(), zhong_shus.len());

    let data = calculate_advanced_chan_data(candles, &config.advanced_chan);
    let advanced = calculate_advanced_chan_signals(candles, &data, &config.advanced_chan);
    if let Some(last) = data.last() {
        println!("고급 禅动 추세: {:?}", last.trend);
    }
    println!("고급 禅动 신호: {}개", advanced.len());
    if let Some(signal) = advanced.last() {
        println!("  최근: {} {:?} {}", signal.label, signal.signal_type, signal.strength);
    }
}

async fn run_screen(candles: Vec<Candle>, conditions: &str, config: EngineConfig) -> Result<()> {
    let specs = conditions
        .split(',')
        .filter(|name| !name.trim().is_empty())
        .map(|name| {
            name.parse::<ScreenCondition>()
                .map(|c| ConditionSpec::new(c, vec![TimeInterval::Day1]))
        })
        .collect::<Result<Vec<_>>>()?;

    let job = ScreenerJob {
        symbols: vec!["FILE".to_owned()],
        conditions: specs,
        logic: ConditionLogic::And,
        backtest_date: None,
        price_range: None,
    };

    let screener = Screener::new(config);
    let report = screener
        .run(&job, &FileCandleSource { candles }, &CancelFlag::new())
        .await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[tokio::main]
async fn main() {
    // 로그 초기화
    env_logger::init();

    info!("신호 설정 점검 시작");

    let args: Vec<String> = env::args().collect();
    debug!("커맨드 라인 인수: {:?}", args);

    if args.len() < 2 {
        error!("인수가 충분하지 않습니다. 설정 파일 경로가 필요합니다.");
        print_usage(&args[0]);
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    if !config_path.exists() {
        warn!("설정 파일이 존재하지 않습니다: {}", config_path.display());
        println!(
            "경고: 설정 파일이 존재하지 않습니다: {}",
            config_path.display()
        );
        return;
    }

    let config: EngineConfig = match ConfigLoader::load_from_file(&config_path, ConfigFormat::Auto)
    {
        Ok(config) => config,
        Err(e) => {
            error!("설정 로드 실패: {e}");
            println!("설정 로드 실패: {e}");
            return;
        }
    };

    println!("설정 파일: {}", config_path.display());
    println!("{config:#?}");

    let Some(candle_path) = args.get(2) else {
        println!("설정이 유효합니다.");
        return;
    };

    let candles = match load_candles(Path::new(candle_path)) {
        Ok(candles) => candles,
        Err(e) => {
            error!("{e:#}");
            println!("캔들 로드 실패: {e:#}");
            return;
        }
    };

    print_summary(&candles, &config);

    if let Some(conditions) = args.get(3) {
        if let Err(e) = run_screen(candles, conditions, config).await {
            error!("스크리닝 실패: {e:#}");
            println!("스크리닝 실패: {e:#}");
        }
    }

    info!("신호 설정 점검 완료");
}
