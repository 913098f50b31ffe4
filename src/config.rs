//! Run configuration and derived STFT parameters.
//!
//! A [`SuppressorConfig`] describes one suppression run: frame timing,
//! loop gain, detection thresholds, and notch design parameters. The STFT
//! frame geometry (`Slen`, `len1`, `len2`, `nFFT`) is derived from the frame
//! interval and the sample rate at run start and validated there; bad
//! settings fail fast before any audio is touched.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

// Defaults follow the reference tuning for speech-band feedback loops.

// Frame interval in seconds.
const DEFAULT_FRAME_INTERVAL_SEC: f32 = 0.01;
// Window overlap in percent of the frame size.
const DEFAULT_OVERLAP_PERCENT: f32 = 50.0;
// Loop gain from mic to speaker.
const DEFAULT_GAIN: f32 = 0.2;
// PAPR / PTPR candidate thresholds (dB).
const DEFAULT_PAPR_THRESHOLD_DB: f32 = 10.0;
const DEFAULT_PTPR_THRESHOLD_DB: f32 = 10.0;
// PNPR candidate threshold (dB).
const DEFAULT_PNPR_THRESHOLD_DB: f32 = 15.0;
// Notch quality factor.
const DEFAULT_NOTCH_Q: f32 = 1.0;
// Symmetric amplitude clipping limit applied post-gain and post-filter.
const DEFAULT_CLIP_LIMIT: f32 = 2.0;
// Maximum number of room impulse response taps used for feedback.
const DEFAULT_MAX_RIR_LEN: usize = 2000;

/// Configuration for one suppression run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuppressorConfig {
    /// Analysis frame interval in seconds; `Slen = floor(interval * Srate)`,
    /// rounded up to even.
    pub frame_interval_sec: f32,
    /// Window overlap in percent of the frame size (50 = half-overlap).
    pub overlap_percent: f32,
    /// Internal gain from mic to speaker.
    pub gain: f32,
    /// Peak-to-average power ratio threshold (dB).
    pub papr_threshold_db: f32,
    /// Peak-to-threshold power ratio threshold (dB, absolute power).
    pub ptpr_threshold_db: f32,
    /// Peak-to-neighboring power ratio threshold (dB).
    pub pnpr_threshold_db: f32,
    /// Quality factor of each designed notch section.
    pub notch_q: f32,
    /// Samples are clipped to `[-clip_limit, clip_limit]` after the gain
    /// stage and after the filter. One bound, applied consistently.
    pub clip_limit: f32,
    /// Room impulse response taps beyond this count are ignored.
    pub max_rir_len: usize,
}

impl Default for SuppressorConfig {
    fn default() -> Self {
        Self {
            frame_interval_sec: DEFAULT_FRAME_INTERVAL_SEC,
            overlap_percent: DEFAULT_OVERLAP_PERCENT,
            gain: DEFAULT_GAIN,
            papr_threshold_db: DEFAULT_PAPR_THRESHOLD_DB,
            ptpr_threshold_db: DEFAULT_PTPR_THRESHOLD_DB,
            pnpr_threshold_db: DEFAULT_PNPR_THRESHOLD_DB,
            notch_q: DEFAULT_NOTCH_Q,
            clip_limit: DEFAULT_CLIP_LIMIT,
            max_rir_len: DEFAULT_MAX_RIR_LEN,
        }
    }
}

/// STFT frame geometry derived from the configuration and the sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StftParams {
    /// Frame length in samples (always even).
    pub slen: usize,
    /// Overlap length retained between frames.
    pub len1: usize,
    /// Hop length: new samples per frame.
    pub len2: usize,
    /// FFT length, `2 * slen`.
    pub nfft: usize,
}

impl StftParams {
    /// Frequency of bin `idx` in Hz.
    pub fn bin_freq(&self, idx: usize, sample_rate: f32) -> f32 {
        idx as f32 * sample_rate / self.nfft as f32
    }
}

impl SuppressorConfig {
    /// Derive and validate the STFT geometry for `sample_rate`.
    pub fn stft_params(&self, sample_rate: u32) -> Result<StftParams> {
        if sample_rate == 0 {
            bail!("sample rate must be positive");
        }
        if !self.frame_interval_sec.is_finite() || self.frame_interval_sec <= 0.0 {
            bail!(
                "frame interval {} s is invalid; must be positive",
                self.frame_interval_sec
            );
        }
        let mut slen = (self.frame_interval_sec * sample_rate as f32).floor() as usize;
        if slen % 2 == 1 {
            slen += 1;
        }
        if slen < 12 {
            // PNPR needs bins 5..Slen-5, so anything shorter cannot detect.
            bail!(
                "frame interval {} s yields {} samples per frame at {} Hz; too short for analysis",
                self.frame_interval_sec,
                slen,
                sample_rate
            );
        }
        if !(0.0..100.0).contains(&self.overlap_percent) {
            bail!(
                "overlap percent {} out of range [0, 100)",
                self.overlap_percent
            );
        }
        let len1 = (slen as f32 * self.overlap_percent / 100.0).floor() as usize;
        let len2 = slen - len1;
        if len2 == 0 {
            bail!("overlap percent {} leaves a zero hop", self.overlap_percent);
        }
        Ok(StftParams {
            slen,
            len1,
            len2,
            nfft: 2 * slen,
        })
    }

    /// Validate the non-geometry fields.
    pub fn validate(&self) -> Result<()> {
        if !self.gain.is_finite() || self.gain < 0.0 {
            bail!("gain {} is invalid; must be non-negative", self.gain);
        }
        if !self.notch_q.is_finite() || self.notch_q <= 0.0 {
            bail!("notch Q {} is invalid; must be positive", self.notch_q);
        }
        if !self.clip_limit.is_finite() || self.clip_limit <= 0.0 {
            bail!("clip limit {} is invalid; must be positive", self.clip_limit);
        }
        if self.max_rir_len == 0 {
            bail!("max RIR length must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry_16k() {
        let cfg = SuppressorConfig::default();
        let p = cfg.stft_params(16000).unwrap();
        assert_eq!(p.slen, 160);
        assert_eq!(p.len1, 80);
        assert_eq!(p.len2, 80);
        assert_eq!(p.nfft, 320);
    }

    #[test]
    fn test_odd_slen_rounds_up() {
        let cfg = SuppressorConfig {
            frame_interval_sec: 0.01,
            ..Default::default()
        };
        // 0.01 * 12100 = 121 samples, odd, rounded up to 122
        let p = cfg.stft_params(12100).unwrap();
        assert_eq!(p.slen, 122);
        assert_eq!(p.nfft, 244);
    }

    #[test]
    fn test_invalid_interval_rejected() {
        let cfg = SuppressorConfig {
            frame_interval_sec: 0.0,
            ..Default::default()
        };
        assert!(cfg.stft_params(16000).is_err());

        let cfg = SuppressorConfig {
            frame_interval_sec: 0.0001,
            ..Default::default()
        };
        // 0.0001 * 16000 = 1.6 samples: far too short
        assert!(cfg.stft_params(16000).is_err());
    }

    #[test]
    fn test_full_overlap_rejected() {
        let cfg = SuppressorConfig {
            overlap_percent: 100.0,
            ..Default::default()
        };
        assert!(cfg.stft_params(16000).is_err());
    }

    #[test]
    fn test_bad_gain_rejected() {
        let cfg = SuppressorConfig {
            gain: -1.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_config_json_roundtrip() {
        let cfg = SuppressorConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SuppressorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.gain, cfg.gain);
        assert_eq!(back.max_rir_len, cfg.max_rir_len);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let back: SuppressorConfig = serde_json::from_str(r#"{"gain": 0.5}"#).unwrap();
        assert_eq!(back.gain, 0.5);
        assert_eq!(back.notch_q, DEFAULT_NOTCH_Q);
    }
}
