use crate::indicator::utils::moving_average;

/// 지수이동평균(EMA) 시리즈
///
/// 시드는 첫 번째 값이며 승수는 `2 / (period + 1)`입니다.
/// 엔진의 모든 EMA 호출자는 이 시드 규칙을 공유합니다.
///
/// # Arguments
/// * `values` - 입력 시리즈
/// * `period` - EMA 기간
///
/// # Returns
/// * `Vec<f64>` - 입력과 같은 길이의 EMA 시리즈
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let mut result = Vec::with_capacity(values.len());
    let Some(&first) = values.first() else {
        return result;
    };

    let alpha = moving_average::calculate_ema_alpha(period);
    let mut prev = first;
    result.push(first);
    for &value in &values[1..] {
        prev = moving_average::calculate_ema_step(value, prev, alpha);
        result.push(prev);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_seeded_with_first_value() {
        let result = ema(&[10.0, 20.0, 30.0], 3);
        // alpha = 0.5
        assert_eq!(result, vec![10.0, 15.0, 22.5]);
    }

    #[test]
    fn test_ema_constant_series() {
        let result = ema(&[5.0; 10], 4);
        assert!(result.iter().all(|&v| (v - 5.0).abs() < 1e-12));
    }

    #[test]
    fn test_ema_period_one_is_identity() {
        let values = [1.0, 4.0, 2.0, 8.0];
        assert_eq!(ema(&values, 1), values.to_vec());
    }

    #[test]
    fn test_ema_empty() {
        assert!(ema(&[], 12).is_empty());
    }
}
