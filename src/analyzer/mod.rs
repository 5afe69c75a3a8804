// 신호 분석기 모듈
// 지표 시리즈를 매수/매도 신호와 缠论 구조(분형, 笔, 中枢)로 변환합니다.

pub mod advanced_chan_analyzer;
pub mod base;
pub mod cd_analyzer;
pub mod cd_divergence;
pub mod chanlun_analyzer;
pub mod kline_merge;
pub mod nx_analyzer;

pub use advanced_chan_analyzer::{
    AdvancedChanConfig, calculate_advanced_chan_data, calculate_advanced_chan_signals,
    check_advanced_chan_buy_signal, check_advanced_chan_sell_signal, check_near_golden_support,
    check_near_zhongshu, find_bi_points, find_chan_buy_sell_points, find_zhong_shu,
};
pub use base::{TimedSignal, has_recent_signal, latest_matching};
pub use cd_analyzer::{CdConfig, calculate_cd_signals};
pub use cd_divergence::calculate_cd_divergence_signals;
pub use chanlun_analyzer::{
    ChanConfig, calculate_chan_lun_signals, check_chan_lun_buy_signal, check_chan_lun_sell_signal,
};
pub use kline_merge::{Fractal, MergedBar, MergedSeries};
pub use nx_analyzer::{NxConfig, calculate_nx_signals};
