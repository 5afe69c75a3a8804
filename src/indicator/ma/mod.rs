// 이동평균 모듈
// 모든 함수는 입력과 같은 길이의 시리즈를 반환합니다.

pub mod ema;
pub mod sma;
pub mod wma;

pub use ema::ema;
pub use sma::sma;
pub use wma::wma;
