//! Candidate Detector
//!
//! Three independent power-ratio criteria scan one frame's spectrum slice
//! (bins `[0, Slen)`) for howling candidates:
//!
//! - **PAPR**: bin power against the frame's average power.
//! - **PTPR**: bin power against an absolute dB threshold.
//! - **PNPR**: bin power against the bins 4 and 5 away on both sides; the
//!   first and last 5 bins can never be selected by construction.
//!
//! The effective per-frame candidate set is the intersection of the three,
//! kept sorted for determinism. A frame with zero average power produces no
//! candidates at all; no NaN ever leaves this module.

use crate::dsp::utils::power_db;
use rustfft::num_complex::Complex;

// PNPR neighbor offsets (bins) checked on each side of a peak.
const PNPR_NEAR: usize = 4;
const PNPR_FAR: usize = 5;
// Average power below this counts as a silent frame.
const SILENCE_POWER_EPS: f32 = 1e-20;

/// Peak-to-Average Power Ratio. Returns the selected bin indices and the
/// full per-bin PAPR vector (dB) for diagnostics.
pub fn papr(spectrum: &[Complex<f32>], threshold_db: f32) -> (Vec<usize>, Vec<f32>) {
    let n = spectrum.len();
    let mut power = vec![0.0f32; n];
    let mut sum = 0.0f32;
    for (i, c) in spectrum.iter().enumerate() {
        power[i] = c.norm_sqr();
        sum += power[i];
    }
    let average = sum / n.max(1) as f32;
    if average <= SILENCE_POWER_EPS {
        // Silent frame: the ratio is undefined, report no candidates.
        return (Vec::new(), vec![0.0; n]);
    }

    let mut selected = Vec::new();
    let mut ratios = vec![0.0f32; n];
    for i in 0..n {
        ratios[i] = power_db(power[i] / average);
        if ratios[i] > threshold_db {
            selected.push(i);
        }
    }
    (selected, ratios)
}

/// Peak-to-Threshold Power Ratio: absolute power test, no normalization.
pub fn ptpr(spectrum: &[Complex<f32>], threshold_db: f32) -> Vec<usize> {
    spectrum
        .iter()
        .enumerate()
        .filter(|(_, c)| power_db(c.norm_sqr()) > threshold_db)
        .map(|(i, _)| i)
        .collect()
}

/// Peak-to-Neighboring Power Ratio: a bin is selected only if it exceeds the
/// bins 4 and 5 below and above it, each by more than `threshold_db`.
/// Bins in `[0, 5)` and `[n-5, n)` are never selected.
pub fn pnpr(spectrum: &[Complex<f32>], threshold_db: f32) -> Vec<usize> {
    let n = spectrum.len();
    if n <= 2 * PNPR_FAR {
        return Vec::new();
    }
    let power: Vec<f32> = spectrum.iter().map(|c| c.norm_sqr()).collect();
    let mut selected = Vec::new();
    for i in PNPR_FAR..(n - PNPR_FAR) {
        let p = power[i];
        let over = |q: f32| power_db(p / q) > threshold_db;
        if over(power[i - PNPR_NEAR])
            && over(power[i - PNPR_FAR])
            && over(power[i + PNPR_NEAR])
            && over(power[i + PNPR_FAR])
        {
            selected.push(i);
        }
    }
    selected
}

/// Per-frame candidate detection: the sorted intersection of all three
/// criteria over one spectrum slice.
#[derive(Debug, Clone)]
pub struct CandidateDetector {
    pub papr_threshold_db: f32,
    pub ptpr_threshold_db: f32,
    pub pnpr_threshold_db: f32,
}

impl CandidateDetector {
    pub fn new(papr_threshold_db: f32, ptpr_threshold_db: f32, pnpr_threshold_db: f32) -> Self {
        Self {
            papr_threshold_db,
            ptpr_threshold_db,
            pnpr_threshold_db,
        }
    }

    pub fn detect(&self, spectrum: &[Complex<f32>]) -> Vec<usize> {
        let (papr_idx, _) = papr(spectrum, self.papr_threshold_db);
        if papr_idx.is_empty() {
            return Vec::new();
        }
        let ptpr_idx = ptpr(spectrum, self.ptpr_threshold_db);
        let pnpr_idx = pnpr(spectrum, self.pnpr_threshold_db);
        intersect_sorted(&intersect_sorted(&papr_idx, &ptpr_idx), &pnpr_idx)
    }
}

/// Intersection of two ascending index lists; output stays ascending.
fn intersect_sorted(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_spectrum(n: usize, mag: f32) -> Vec<Complex<f32>> {
        vec![Complex::new(mag, 0.0); n]
    }

    fn spectrum_with_peak(n: usize, peak_bin: usize, peak: f32, floor: f32) -> Vec<Complex<f32>> {
        let mut s = flat_spectrum(n, floor);
        s[peak_bin] = Complex::new(peak, 0.0);
        s
    }

    #[test]
    fn test_papr_uniform_power_selects_nothing() {
        let spec = flat_spectrum(160, 3.0);
        let (idx, ratios) = papr(&spec, 10.0);
        assert!(idx.is_empty());
        // All ratios are exactly 0 dB.
        for r in ratios {
            assert!(r.abs() < 1e-4);
        }
    }

    #[test]
    fn test_papr_silent_frame_yields_no_candidates() {
        let spec = flat_spectrum(160, 0.0);
        let (idx, ratios) = papr(&spec, 10.0);
        assert!(idx.is_empty());
        assert!(ratios.iter().all(|r| r.is_finite()));
    }

    #[test]
    fn test_papr_flags_dominant_bin() {
        let spec = spectrum_with_peak(160, 40, 100.0, 0.1);
        let (idx, ratios) = papr(&spec, 10.0);
        assert_eq!(idx, vec![40]);
        assert!(ratios[40] > 10.0);
    }

    #[test]
    fn test_ptpr_absolute_threshold() {
        // power 10^2 = 100 -> 20 dB
        let spec = spectrum_with_peak(160, 7, 10.0, 0.0);
        let idx = ptpr(&spec, 10.0);
        assert_eq!(idx, vec![7]);
        assert!(ptpr(&spec, 25.0).is_empty());
    }

    #[test]
    fn test_pnpr_never_selects_edge_bins() {
        let n = 160;
        for &peak_bin in &[0usize, 3, 4, n - 5, n - 1] {
            let spec = spectrum_with_peak(n, peak_bin, 1000.0, 0.001);
            assert!(
                pnpr(&spec, 15.0).is_empty(),
                "edge bin {} must not be selected",
                peak_bin
            );
        }
        // Same peak inside the valid range is selected.
        let spec = spectrum_with_peak(n, 20, 1000.0, 0.001);
        assert_eq!(pnpr(&spec, 15.0), vec![20]);
    }

    #[test]
    fn test_pnpr_requires_all_four_neighbors() {
        let n = 160;
        let mut spec = spectrum_with_peak(n, 20, 1000.0, 0.001);
        // A comparably loud bin 4 above kills the candidate.
        spec[24] = Complex::new(900.0, 0.0);
        assert!(!pnpr(&spec, 15.0).contains(&20));
    }

    #[test]
    fn test_intersection_is_sorted_and_common() {
        let a = vec![1, 5, 9, 20];
        let b = vec![5, 9, 21];
        assert_eq!(intersect_sorted(&a, &b), vec![5, 9]);
    }

    #[test]
    fn test_detector_combines_all_criteria() {
        let n = 160;
        let det = CandidateDetector::new(10.0, 10.0, 15.0);
        // Loud isolated peak passes all three.
        let spec = spectrum_with_peak(n, 30, 100.0, 0.01);
        assert_eq!(det.detect(&spec), vec![30]);
        // Quiet peak fails PTPR even though PAPR/PNPR would fire.
        let spec = spectrum_with_peak(n, 30, 1.0, 0.0001);
        assert!(det.detect(&spec).is_empty());
    }
}
