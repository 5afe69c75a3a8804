/// 종가 기반 지그재그 선
///
/// 마지막 전환점에서 `pct`% 이상 반대로 움직이면 전환점을 확정하고,
/// 두 전환점 사이는 선형 보간합니다. 확정되지 않은 구간은 직전 전환점 값을 유지합니다.
///
/// # Arguments
/// * `closes` - 종가 시리즈
/// * `pct` - 전환 임계값 (%)
pub fn zigzag_close(closes: &[f64], pct: f64) -> Vec<f64> {
    let Some(&first) = closes.first() else {
        return Vec::new();
    };

    let mut result = vec![0.0; closes.len()];
    result[0] = first;
    let mut pivot = first;
    let mut pivot_index = 0;
    // 0 = 미정, 1 = 상승, -1 = 하락
    let mut direction = 0_i8;

    for (i, &close) in closes.iter().enumerate().skip(1) {
        let change_pct = if pivot != 0.0 {
            (close - pivot) / pivot.abs() * 100.0
        } else {
            0.0
        };

        let extends = match direction {
            1 => close >= pivot,
            -1 => close <= pivot,
            _ => false,
        };
        let reverses = match direction {
            1 => -change_pct >= pct,
            -1 => change_pct >= pct,
            _ => change_pct.abs() >= pct,
        };

        if extends {
            pivot = close;
            pivot_index = i;
            result[i] = close;
        } else if reverses {
            interpolate(&mut result, pivot_index, pivot, i, close);
            direction = if close > pivot { 1 } else { -1 };
            pivot = close;
            pivot_index = i;
        } else {
            result[i] = pivot;
        }
    }
    result
}

fn interpolate(result: &mut [f64], from: usize, from_value: f64, to: usize, to_value: f64) {
    let span = (to - from).max(1) as f64;
    for (j, slot) in result.iter_mut().enumerate().take(to + 1).skip(from) {
        let t = (j - from) as f64 / span;
        *slot = from_value + (to_value - from_value) * t;
    }
}
