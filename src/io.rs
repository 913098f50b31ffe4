//! File collaborators: WAV read/write and room-impulse-response loading.
//!
//! The engine itself only sees sample slices; everything here runs before or
//! after the sample loop.

use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// Read a WAV file as mono f32 samples. Multi-channel input is averaged down.
/// Supports 16-bit integer and 32-bit float encodings.
pub fn read_wav_mono(path: &Path) -> Result<(Vec<f32>, u32)> {
    let reader = WavReader::open(path)
        .with_context(|| format!("failed to open WAV '{}'", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        bail!("WAV '{}' reports zero channels", path.display());
    }

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => reader
            .into_samples::<i16>()
            .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
            .collect::<Result<_, _>>()?,
        (SampleFormat::Float, 32) => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()?,
        (fmt, bits) => bail!(
            "unsupported WAV encoding {:?}/{} bits in '{}'",
            fmt,
            bits,
            path.display()
        ),
    };

    let mono = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };
    Ok((mono, spec.sample_rate))
}

/// Write mono f32 samples as a 32-bit float WAV.
pub fn write_wav_mono(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("failed to create WAV '{}'", path.display()))?;
    for &s in samples {
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Load a room impulse response from a whitespace/tab-delimited text file,
/// one or more float values per line.
pub fn read_rir_text(path: &Path) -> Result<Vec<f32>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read RIR '{}'", path.display()))?;
    let mut rir = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        for tok in line.split_whitespace() {
            let v: f32 = tok.parse().with_context(|| {
                format!(
                    "bad RIR value '{}' at {}:{}",
                    tok,
                    path.display(),
                    lineno + 1
                )
            })?;
            rir.push(v);
        }
    }
    if rir.is_empty() {
        bail!("RIR file '{}' contains no samples", path.display());
    }
    Ok(rir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_float_roundtrip() {
        let dir = std::env::temp_dir().join("howlguard_io_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rt.wav");

        let samples: Vec<f32> = (0..256).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        write_wav_mono(&path, &samples, 16000).unwrap();
        let (back, rate) = read_wav_mono(&path).unwrap();
        assert_eq!(rate, 16000);
        assert_eq!(back.len(), samples.len());
        for (a, b) in back.iter().zip(&samples) {
            assert!((a - b).abs() < 1e-6);
        }
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_rir_text_parsing() {
        let dir = std::env::temp_dir().join("howlguard_io_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rir.txt");
        std::fs::write(&path, "0.5\t-0.25\n0.125\n\n0.0\n").unwrap();
        let rir = read_rir_text(&path).unwrap();
        assert_eq!(rir, vec![0.5, -0.25, 0.125, 0.0]);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_rir_rejects_garbage() {
        let dir = std::env::temp_dir().join("howlguard_io_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad_rir.txt");
        std::fs::write(&path, "0.5 oops\n").unwrap();
        assert!(read_rir_text(&path).is_err());
        std::fs::remove_file(&path).ok();
    }
}
