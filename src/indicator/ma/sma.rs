/// 단순이동평균(SMA) 시리즈
///
/// 인덱스 `period - 1` 이전 구간은 입력 값을 그대로 유지합니다.
///
/// # Arguments
/// * `values` - 입력 시리즈
/// * `period` - 계산 기간
///
/// # Returns
/// * `Vec<f64>` - 입력과 같은 길이의 SMA 시리즈
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let period = period.max(1);
    let mut result = Vec::with_capacity(values.len());
    let mut sum = 0.0;

    for (i, &value) in values.iter().enumerate() {
        sum += value;
        if i >= period {
            sum -= values[i - period];
        }

        if i + 1 < period {
            result.push(value);
        } else {
            result.push(sum / period as f64);
        }
    }
    result
}
