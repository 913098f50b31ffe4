//! Screener
//!
//! Confirmed bins arrive in clusters around each howling tone (adjacent bins
//! of one spectral peak all pass the vote). One notch per tone is enough, so
//! clusters of bins closer than 3 indices are merged down to the single bin
//! with the largest spectral magnitude.

use rustfft::num_complex::Complex;

// Bins closer than this to the previous representative merge into it.
const MERGE_RADIUS: usize = 3;

/// Merge clusters of confirmed bins. `confirmed` must be ascending; the
/// output is ascending with no two entries closer than `MERGE_RADIUS`.
pub fn screen(spectrum: &[Complex<f32>], confirmed: &[usize]) -> Vec<usize> {
    let mut out: Vec<usize> = Vec::new();
    for &c in confirmed {
        match out.last_mut() {
            None => out.push(c),
            Some(last) => {
                if *last + MERGE_RADIUS > c {
                    // Same cluster: keep whichever bin is spectrally stronger.
                    if spectrum[*last].norm() < spectrum[c].norm() {
                        *last = c;
                    }
                } else {
                    out.push(c);
                }
            }
        }
    }
    out
}
