//! Spectral Framer
//!
//! Turns one `Slen`-sample analysis frame into a zero-padded spectrum of
//! length `nFFT = 2 * Slen`. The Hann window is normalized so its sum equals
//! the hop length `len2`, preserving overlap-add energy across half-
//! overlapped frames. Pure function of its input; only bins `[0, Slen)` are
//! meaningful to the detection stages downstream.

use crate::dsp::utils::hann_window;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

pub struct SpectralFramer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    slen: usize,
    nfft: usize,
}

impl SpectralFramer {
    pub fn new(slen: usize, len2: usize) -> Self {
        assert!(slen >= 2 && slen % 2 == 0, "frame length must be even");
        let nfft = 2 * slen;
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(nfft);

        // Hann scaled so the window sums to len2.
        let mut window = hann_window(slen);
        let sum: f32 = window.iter().sum();
        let scale = len2 as f32 / sum.max(1e-12);
        for w in &mut window {
            *w *= scale;
        }

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); nfft],
            slen,
            nfft,
        }
    }

    pub fn slen(&self) -> usize {
        self.slen
    }

    pub fn nfft(&self) -> usize {
        self.nfft
    }

    /// Window `frame`, zero-pad to `nFFT`, FFT. The returned slice is valid
    /// until the next call.
    pub fn analyze(&mut self, frame: &[f32]) -> &[Complex<f32>] {
        assert_eq!(frame.len(), self.slen, "frame length mismatch");
        for i in 0..self.slen {
            self.scratch[i] = Complex::new(frame[i] * self.window[i], 0.0);
        }
        for i in self.slen..self.nfft {
            self.scratch[i] = Complex::new(0.0, 0.0);
        }
        self.fft.process(&mut self.scratch);
        &self.scratch
    }
}
