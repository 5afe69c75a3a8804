/// 후행 구간 최고값 시리즈 (HHV)
///
/// 앞부분은 사용 가능한 만큼의 짧은 구간으로 계산합니다.
///
/// # Arguments
/// * `values` - 입력 시리즈
/// * `window` - 구간 길이 (0은 1로 취급)
pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| highest(values, i, window))
        .collect()
}

/// 인덱스 `index`에서 끝나는 `period` 구간의 최고값
pub fn highest(values: &[f64], index: usize, period: usize) -> f64 {
    let start = (index + 1).saturating_sub(period.max(1));
    values[start..=index]
        .iter()
        .fold(f64::NEG_INFINITY, |a, &b| a.max(b))
}
