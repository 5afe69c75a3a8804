/// 공통 이동평균 계산 함수들
pub mod moving_average {
    /// 지수이동평균(EMA) 계산을 위한 알파값 계산
    ///
    /// # Arguments
    /// * `period` - EMA 기간
    ///
    /// # Returns
    /// * `f64` - 알파값 (평활화 계수)
    pub fn calculate_ema_alpha(period: usize) -> f64 {
        2.0 / (period.max(1) + 1) as f64
    }

    /// 지수이동평균(EMA) 한 스텝 계산
    ///
    /// # Arguments
    /// * `current_price` - 현재 가격
    /// * `previous_ema` - 이전 EMA 값
    /// * `alpha` - 평활화 계수
    ///
    /// # Returns
    /// * `f64` - 계산된 EMA 값
    pub fn calculate_ema_step(current_price: f64, previous_ema: f64, alpha: f64) -> f64 {
        alpha * current_price + (1.0 - alpha) * previous_ema
    }

    /// 슬라이스 평균. 비어 있으면 0.0
    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// 모집단 표준편차. 비어 있으면 0.0
    pub fn std_dev(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let avg = mean(values);
        let variance =
            values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
        variance.sqrt()
    }
}

/// 급증(闪电) 규칙: 두 값이 모두 양수이고 현재 값이 직전 값의 두 배 이상
///
/// 압력 오실레이터와 모멘텀 오실레이터가 같은 규칙을 공유합니다.
pub fn is_surge(curr: f64, prev: f64) -> bool {
    prev > 0.0 && curr > 0.0 && curr >= 2.0 * prev
}

/// 급락(骷髅) 규칙: `is_surge`의 음수 쪽 대칭
pub fn is_plunge(curr: f64, prev: f64) -> bool {
    is_surge(-curr, -prev)
}

/// 0 나눗셈을 0.0으로 처리하는 나눗셈
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() { value } else { 0.0 }
}

/// 두 가격 사이의 상대 거리 (기준값 대비 비율)
pub fn relative_distance(price: f64, reference: f64) -> f64 {
    safe_div((price - reference).abs(), reference.abs())
}

/// 시리즈를 n칸 앞으로 당깁니다 (通达信 REFX).
///
/// 범위를 넘는 꼬리 부분은 마지막 값으로 채웁니다.
pub fn refx(values: &[f64], n: usize) -> Vec<f64> {
    let Some(&last) = values.last() else {
        return Vec::new();
    };
    (0..values.len())
        .map(|i| values.get(i + n).copied().unwrap_or(last))
        .collect()
}

/// 조건이 마지막으로 참이었던 뒤 지난 봉 수 (BARSLAST). 한 번도 없으면 index + 1
pub fn bars_last(condition: &[bool], index: usize) -> usize {
    (0..=index)
        .rev()
        .find(|&i| condition[i])
        .map(|i| index - i)
        .unwrap_or(index + 1)
}

/// n봉 전 값 (REF). 범위를 벗어나면 0.0
pub fn ref_value(values: &[f64], index: usize, n: usize) -> f64 {
    index.checked_sub(n).map(|i| values[i]).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::moving_average::*;
    use super::*;

    #[test]
    fn test_ema_alpha() {
        assert!((calculate_ema_alpha(9) - 0.2).abs() < 1e-12);
        assert!((calculate_ema_alpha(19) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[]), 0.0);
        assert_eq!(std_dev(&[3.0, 3.0, 3.0]), 0.0);
        assert!((std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_surge_rule() {
        assert!(is_surge(25.0, 10.0));
        assert!(is_surge(20.0, 10.0));
        assert!(!is_surge(19.9, 10.0));
        assert!(!is_surge(5.0, 25.0));
        assert!(!is_surge(10.0, -5.0));
        assert!(!is_surge(10.0, 0.0));
    }

    #[test]
    fn test_plunge_rule_mirrors_surge() {
        assert!(is_plunge(-25.0, -10.0));
        assert!(!is_plunge(-15.0, -10.0));
        assert!(!is_plunge(25.0, 10.0));
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(1.0, 0.0), 0.0);
        assert_eq!(safe_div(1.0, 4.0), 0.25);
    }

    #[test]
    fn test_refx() {
        assert_eq!(refx(&[1.0, 2.0, 3.0, 4.0], 2), vec![3.0, 4.0, 4.0, 4.0]);
        assert!(refx(&[], 3).is_empty());
    }

    #[test]
    fn test_bars_last_and_ref() {
        let flags = [false, true, false, false, true, false];
        assert_eq!(bars_last(&flags, 3), 2);
        assert_eq!(bars_last(&flags, 4), 0);
        assert_eq!(bars_last(&flags, 0), 1);
        assert_eq!(ref_value(&[1.0, 2.0], 1, 1), 1.0);
        assert_eq!(ref_value(&[1.0, 2.0], 1, 5), 0.0);
    }
}
