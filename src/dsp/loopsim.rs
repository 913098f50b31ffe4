//! Feedback Loop Simulator
//!
//! Sample-by-sample replay of the closed acoustic loop:
//!
//! ```text
//!   speech x --> mic x1 --> gain G --> clip --> notch cascade --> speaker y
//!                 ^                                                  |
//!                 +-------- y1 <-- room impulse response <-----------+
//! ```
//!
//! Every `len2` samples the accumulated mic frame runs through the detection
//! pipeline (framer -> PAPR/PTPR/PNPR -> persistence vote -> screening) and,
//! if the screened set changed, the notch cascade is redesigned. Coefficient
//! swaps happen only at these frame boundaries, so one difference-equation
//! evaluation always sees a consistent coefficient set.
//!
//! The loop is strictly sequential: each sample's output feeds the room
//! convolution that shapes the next sample's mic signal.

use crate::config::{StftParams, SuppressorConfig};
use crate::dsp::detector::CandidateDetector;
use crate::dsp::framer::SpectralFramer;
use crate::dsp::notch::{FilterCascade, NotchSection};
use crate::dsp::persistence::PersistenceTracker;
use crate::dsp::screening::screen;
use anyhow::{bail, Result};
use log::{debug, info};
use ringbuf::{Consumer, Producer, RingBuffer};

// Ring buffer capacity multiplier relative to frame size.
const RINGBUF_CAP_MULT: usize = 4;

/// Fixed-capacity delay line; `tap(0)` is the newest sample.
struct DelayLine {
    buf: Vec<f32>,
    idx: usize,
}

impl DelayLine {
    fn new(len: usize) -> Self {
        assert!(len > 0, "delay line length must be > 0");
        Self {
            buf: vec![0.0; len],
            idx: 0,
        }
    }

    #[inline]
    fn push(&mut self, sample: f32) {
        self.idx = (self.idx + self.buf.len() - 1) % self.buf.len();
        self.buf[self.idx] = sample;
    }

    /// Dot product against `coeffs` in recency order: `coeffs[0]` multiplies
    /// the newest sample. Coefficients beyond capacity are ignored.
    #[inline]
    fn dot(&self, coeffs: &[f32]) -> f32 {
        let n = coeffs.len().min(self.buf.len());
        let mut acc = 0.0f32;
        for k in 0..n {
            acc += coeffs[k] * self.buf[(self.idx + k) % self.buf.len()];
        }
        acc
    }
}

/// Per-run mutable state of the sample loop. Built at `run` start, dropped
/// at the end; nothing leaks across runs.
struct LoopState {
    frame_producer: Producer<f32>,
    frame_consumer: Consumer<f32>,
    frame_buf: Vec<f32>,
    /// Clipped post-gain input history for the cascade's FIR part.
    filter_in: DelayLine,
    /// Speaker output history: feeds both the cascade's IIR part and the
    /// room convolution.
    room: DelayLine,
    /// Feedback sample entering the mic at the next step.
    y1: f32,
    frame_id: usize,
}

impl LoopState {
    fn new(params: &StftParams, rir_len: usize) -> Self {
        let cap = params.slen * RINGBUF_CAP_MULT;
        let (frame_producer, frame_consumer) = RingBuffer::<f32>::new(cap).split();
        // The output history must cover both the RIR and the longest
        // possible cascade denominator (screened bins are >= 3 apart, so at
        // most 2 * slen/3 + 1 <= slen + 1 taps).
        let room_len = rir_len.max(params.slen + 1);
        Self {
            frame_producer,
            frame_consumer,
            frame_buf: vec![0.0; params.slen],
            filter_in: DelayLine::new(params.slen + 1),
            room: DelayLine::new(room_len),
            y1: 0.0,
            frame_id: 0,
        }
    }
}

/// Plain feedback pass with no filtering: gain, clip, room convolution.
/// This is what turns clean speech into the "howling added" signal.
pub fn simulate_feedback(input: &[f32], rir: &[f32], gain: f32, clip_limit: f32) -> Vec<f32> {
    let mut room = DelayLine::new(rir.len().max(1));
    let mut y1 = 0.0f32;
    let mut out = Vec::with_capacity(input.len());
    for &x in input {
        let x1 = x + y1;
        let y = (gain * x1).clamp(-clip_limit, clip_limit);
        room.push(y);
        y1 = room.dot(rir);
        out.push(y);
    }
    out
}

/// The full suppression loop: detection pipeline plus adaptive notch cascade
/// inside the simulated feedback path.
pub struct HowlingSuppressor {
    params: StftParams,
    sample_rate: f32,
    gain: f32,
    clip_limit: f32,
    notch_q: f32,
    rir: Vec<f32>,

    framer: SpectralFramer,
    detector: CandidateDetector,
    tracker: PersistenceTracker,
    cascade: FilterCascade,
    prev_screened: Vec<usize>,
}

impl HowlingSuppressor {
    pub fn new(config: &SuppressorConfig, sample_rate: u32, rir: &[f32]) -> Result<Self> {
        config.validate()?;
        let params = config.stft_params(sample_rate)?;
        if rir.is_empty() {
            bail!("room impulse response is empty");
        }
        let rir: Vec<f32> = rir.iter().take(config.max_rir_len).copied().collect();

        Ok(Self {
            framer: SpectralFramer::new(params.slen, params.len2),
            detector: CandidateDetector::new(
                config.papr_threshold_db,
                config.ptpr_threshold_db,
                config.pnpr_threshold_db,
            ),
            tracker: PersistenceTracker::new(params.slen),
            cascade: FilterCascade::identity(),
            prev_screened: Vec::new(),
            params,
            sample_rate: sample_rate as f32,
            gain: config.gain,
            clip_limit: config.clip_limit,
            notch_q: config.notch_q,
            rir,
        })
    }

    pub fn params(&self) -> &StftParams {
        &self.params
    }

    /// Center frequencies of the currently active notch cascade (Hz).
    pub fn active_freqs(&self) -> &[f32] {
        &self.cascade.freqs_hz
    }

    /// Run the loop over `input`, returning the speaker output.
    pub fn run(&mut self, input: &[f32]) -> Vec<f32> {
        self.tracker.reset();
        self.cascade = FilterCascade::identity();
        self.prev_screened.clear();

        let mut state = LoopState::new(&self.params, self.rir.len());
        let mut out = Vec::with_capacity(input.len());

        for &x in input {
            // Mic signal: dry input plus room feedback from the last sample.
            let x1 = x + state.y1;

            let _ = state.frame_producer.push(x1);
            if state.frame_consumer.len() >= self.params.slen {
                for (i, v) in state
                    .frame_consumer
                    .iter()
                    .take(self.params.slen)
                    .enumerate()
                {
                    state.frame_buf[i] = *v;
                }
                self.process_frame(&state.frame_buf, state.frame_id);
                state.frame_consumer.discard(self.params.len2);
                state.frame_id += 1;
            }

            // Gain stage, clip, into the filter's input history.
            let v = (self.gain * x1).clamp(-self.clip_limit, self.clip_limit);
            state.filter_in.push(v);

            // Difference equation: FIR on input history minus IIR feedback
            // on output history.
            let y = state.filter_in.dot(&self.cascade.b) - state.room.dot(&self.cascade.a[1..]);
            let y = y.clamp(-self.clip_limit, self.clip_limit);

            state.room.push(y);
            state.y1 = state.room.dot(&self.rir);
            out.push(y);
        }
        out
    }

    /// Frame-boundary pipeline: detect, vote, screen, and redesign the
    /// cascade when the screened set changed.
    fn process_frame(&mut self, frame: &[f32], frame_id: usize) {
        let spectrum = self.framer.analyze(frame);
        let analysis = &spectrum[..self.params.slen];

        let candidates = self.detector.detect(analysis);
        let confirmed = self.tracker.observe(&candidates);
        let screened = screen(analysis, &confirmed);

        if screened != self.prev_screened {
            let sections: Vec<NotchSection> = screened
                .iter()
                .filter_map(|&idx| {
                    let freq = self.params.bin_freq(idx, self.sample_rate);
                    NotchSection::design(freq, self.notch_q, self.sample_rate)
                })
                .collect();
            self.cascade = FilterCascade::from_sections(&sections);
            info!(
                "frame {}: notch cascade redesigned for {:?} Hz",
                frame_id, self.cascade.freqs_hz
            );
            self.prev_screened = screened;
        }

        debug!(
            "frame {}: candidates {:?}, active notches {:?} Hz",
            frame_id, candidates, self.cascade.freqs_hz
        );
    }
}
