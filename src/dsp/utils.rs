
/// Power in dB. Zero power maps to -inf, which compares false against any
/// finite threshold; callers never see NaN from this.
pub fn power_db(power: f32) -> f32 {
    10.0 * power.log10()
}

/// Symmetric Hann window of length `n` (zero at both endpoints).
pub fn hann_window(n: usize) -> Vec<f32> {
    if n == 1 {
        return vec![1.0];
    }
    let denom = (n - 1) as f32;
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / denom).cos())
        .collect()
}

pub fn frame_rms(x: &[f32]) -> f32 {
    let mut s = 0.0f32;
    for &v in x {
        s += v * v;
    }
    (s / (x.len().max(1) as f32)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_endpoints_and_peak() {
        let w = hann_window(161);
        assert!(w[0].abs() < 1e-6);
        assert!(w[160].abs() < 1e-6);
        assert!((w[80] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_power_db() {
        assert!((power_db(100.0) - 20.0).abs() < 1e-4);
        assert_eq!(power_db(0.0), f32::NEG_INFINITY);
    }

    #[test]
    fn test_frame_rms() {
        let x = vec![0.5; 64];
        assert!((frame_rms(&x) - 0.5).abs() < 1e-6);
        assert_eq!(frame_rms(&[]), 0.0);
    }
}
