use crate::analyzer::{AdvancedChanConfig, CdConfig, ChanConfig, NxConfig};
use crate::config_loader::{ConfigError, ConfigResult, ConfigValidation};
use crate::indicator::ladder::LadderConfig;
use crate::indicator::macd::MacdParams;
use crate::indicator::momentum::MomentumConfig;
use crate::indicator::pressure::PressureConfig;
use crate::screener::ScreenerConfig;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// 기본 엔진 설정
///
/// 설정을 받지 않는 편의 함수들이 사용합니다.
pub static DEFAULT_ENGINE_CONFIG: Lazy<EngineConfig> = Lazy::new(EngineConfig::default);

/// 신호 엔진 전체 설정
///
/// 모든 섹션은 생략 가능하며 생략된 섹션은 기본값을 사용합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub macd: MacdParams,
    pub cd: CdConfig,
    pub pressure: PressureConfig,
    pub ladder: LadderConfig,
    pub momentum: MomentumConfig,
    pub chan: ChanConfig,
    pub advanced_chan: AdvancedChanConfig,
    pub nx: NxConfig,
    pub screener: ScreenerConfig,
}

fn require(condition: bool, message: &str) -> ConfigResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(message.to_owned()))
    }
}

impl ConfigValidation for EngineConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.macd
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        require(self.cd.lookback > 0, "cd.lookback은 0보다 커야 합니다")?;
        require(
            self.cd.strong_z >= self.cd.medium_z,
            "cd.strong_z는 cd.medium_z 이상이어야 합니다",
        )?;

        require(
            self.ladder.short_window > 0 && self.ladder.short_window < self.ladder.long_window,
            "ladder.short_window는 0보다 크고 long_window보다 작아야 합니다",
        )?;
        require(self.ladder.smoothing > 0, "ladder.smoothing은 0보다 커야 합니다")?;
        require(self.ladder.strong_run > 0, "ladder.strong_run은 0보다 커야 합니다")?;

        require(
            self.momentum.smoothing_period > 0,
            "momentum.smoothing_period는 0보다 커야 합니다",
        )?;
        require(
            self.momentum.double_digit_threshold >= 0.0,
            "momentum.double_digit_threshold는 음수일 수 없습니다",
        )?;

        require(
            self.chan.strong_price_move >= self.chan.medium_price_move
                && self.chan.strong_macd_change >= self.chan.medium_macd_change,
            "chan 강한 기준은 보통 기준 이상이어야 합니다",
        )?;

        let adv = &self.advanced_chan;
        require(adv.pivot_period > 1, "advanced_chan.pivot_period는 1보다 커야 합니다")?;
        require(
            adv.d90_wma_period > 0 && adv.d90_ema_period > 0 && adv.sell_line_period > 0,
            "advanced_chan 기간 값은 0보다 커야 합니다",
        )?;
        require(
            (0.0..1.0).contains(&adv.b1_divergence_ratio),
            "advanced_chan.b1_divergence_ratio는 0 이상 1 미만이어야 합니다",
        )?;
        require(
            adv.support_tolerance >= 0.0 && adv.zhongshu_tolerance >= 0.0,
            "advanced_chan 허용 오차는 음수일 수 없습니다",
        )?;

        let nx = &self.nx;
        require(
            nx.fast_period > 0 && nx.fast_period < nx.slow_period,
            "nx.fast_period는 0보다 크고 slow_period보다 작아야 합니다",
        )?;
        require(nx.volume_period > 0, "nx.volume_period는 0보다 커야 합니다")?;
        require(nx.volume_ratio >= 0.0, "nx.volume_ratio는 음수일 수 없습니다")?;

        require(self.screener.batch_size > 0, "screener.batch_size는 0보다 커야 합니다")?;
        Ok(())
    }
}
