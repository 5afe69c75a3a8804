/// 후행 구간 최저값 시리즈 (LLV)
///
/// # Arguments
/// * `values` - 입력 시리즈
/// * `window` - 구간 길이 (0은 1로 취급)
pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| lowest(values, i, window))
        .collect()
}

/// 인덱스 `index`에서 끝나는 `period` 구간의 최저값
pub fn lowest(values: &[f64], index: usize, period: usize) -> f64 {
    let start = (index + 1).saturating_sub(period.max(1));
    values[start..=index]
        .iter()
        .fold(f64::INFINITY, |a, &b| a.min(b))
}
