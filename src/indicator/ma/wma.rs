/// 가중이동평균(WMA) 시리즈
///
/// 가장 최근 값에 `period`, 가장 오래된 값에 1의 가중치를 줍니다.
/// 인덱스 `period - 1` 이전 구간은 입력 값을 그대로 유지합니다.
pub fn wma(values: &[f64], period: usize) -> Vec<f64> {
    let period = period.max(1);
    let weight_sum = (period * (period + 1)) as f64 / 2.0;

    values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            if i + 1 < period {
                return value;
            }
            let window = &values[i + 1 - period..=i];
            window
                .iter()
                .enumerate()
                .map(|(j, v)| v * (j + 1) as f64)
                .sum::<f64>()
                / weight_sum
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wma() {
        let result = wma(&[1.0, 2.0, 3.0, 4.0], 3);
        // (1*1 + 2*2 + 3*3) / 6, (2*1 + 3*2 + 4*3) / 6
        assert_eq!(result[0], 1.0);
        assert_eq!(result[1], 2.0);
        assert!((result[2] - 14.0 / 6.0).abs() < 1e-12);
        assert!((result[3] - 20.0 / 6.0).abs() < 1e-12);
    }
}
