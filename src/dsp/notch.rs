//! Notch Filter Bank
//!
//! Second-order IIR notch design plus the flat cascade used by the sample
//! loop. Each screened frequency gets one section at a fixed Q; the cascade
//! reduces all sections to a single numerator/denominator pair by polynomial
//! multiplication, so the loop evaluates one difference equation per sample
//! regardless of how many tones are being notched.
//!
//! Design math follows the classic direct notch recipe: -3 dB bandwidth
//! `w0/Q`, `beta = tan(bw/2)`, `gain = 1/(1+beta)`; coefficients are
//! normalized so `a[0] == 1`.

use std::f32::consts::PI;

/// One second-order notch section, numerator `b`, denominator `a`
/// (`a[0] == 1`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotchSection {
    pub b: [f32; 3],
    pub a: [f32; 3],
    /// Center frequency the section was designed for (Hz).
    pub freq_hz: f32,
}

impl NotchSection {
    /// Design a notch at `freq_hz` with quality factor `q` for `sample_rate`.
    /// Returns `None` for frequencies at/below 0 Hz or at/above Nyquist;
    /// such requests are skipped rather than aborting the cascade.
    pub fn design(freq_hz: f32, q: f32, sample_rate: f32) -> Option<Self> {
        let nyquist = sample_rate * 0.5;
        if !freq_hz.is_finite() || freq_hz <= 0.0 || freq_hz >= nyquist {
            return None;
        }

        let w0 = PI * freq_hz / nyquist;
        let bw = w0 / q.max(1e-6);
        let beta = (bw * 0.5).tan();
        let gain = 1.0 / (1.0 + beta);
        let cw0 = w0.cos();

        Some(Self {
            b: [gain, -2.0 * gain * cw0, gain],
            a: [1.0, -2.0 * gain * cw0, 2.0 * gain - 1.0],
            freq_hz,
        })
    }
}

/// All active notch sections reduced to one overall transfer function.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCascade {
    /// Feed-forward coefficients; `b[0]` multiplies the newest input.
    pub b: Vec<f32>,
    /// Feedback coefficients, `a[0] == 1`.
    pub a: Vec<f32>,
    /// Designed center frequencies, in screening order.
    pub freqs_hz: Vec<f32>,
}

impl FilterCascade {
    /// Pass-through: output equals input.
    pub fn identity() -> Self {
        Self {
            b: vec![1.0],
            a: vec![1.0],
            freqs_hz: Vec::new(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.freqs_hz.is_empty()
    }

    /// Combine sections by multiplying their numerator and denominator
    /// polynomials. An empty section list yields the identity cascade.
    pub fn from_sections(sections: &[NotchSection]) -> Self {
        if sections.is_empty() {
            return Self::identity();
        }
        let mut b = vec![1.0f32];
        let mut a = vec![1.0f32];
        let mut freqs_hz = Vec::with_capacity(sections.len());
        for s in sections {
            b = poly_mul(&b, &s.b);
            a = poly_mul(&a, &s.a);
            freqs_hz.push(s.freq_hz);
        }
        Self { b, a, freqs_hz }
    }
}

/// Polynomial (convolution) product of coefficient vectors.
fn poly_mul(p: &[f32], q: &[f32]) -> Vec<f32> {
    let mut out = vec![0.0f32; p.len() + q.len() - 1];
    for (i, &pi) in p.iter().enumerate() {
        for (j, &qj) in q.iter().enumerate() {
            out[i + j] += pi * qj;
        }
    }
    out
}
