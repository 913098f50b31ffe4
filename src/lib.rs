//! Acoustic feedback ("howling") detection and suppression.
//!
//! Simulates the closed mic -> gain -> speaker -> room -> mic loop sample by
//! sample, watches the frame spectra for sustained narrowband peaks, and
//! drops adaptive IIR notch filters on the offending frequencies while the
//! loop keeps running.
//!
//! Pipeline, per frame boundary:
//! spectral framing -> PAPR/PTPR/PNPR candidate detection -> 3-of-5 temporal
//! confirmation -> neighbor screening -> notch cascade redesign.

pub mod config;
pub mod dsp;
pub mod io;

pub use config::{StftParams, SuppressorConfig};
pub use dsp::loopsim::{simulate_feedback, HowlingSuppressor};
