//! Audio Test Fixture Generator
//!
//! Writes WAV files with known characteristics using hound.

use std::f32::consts::PI;
use std::path::{Path, PathBuf};

/// Waveform written into the file
#[derive(Debug, Clone, Copy)]
pub enum Signal {
    /// Steady sine tone at the given frequency
    Tone(f32),
    /// Short decaying 1 kHz bursts at the given tempo
    Clicks { bpm: f32 },
    Silence,
}

/// Configuration for generated audio
#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub signal: Signal,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 3.0,
            sample_rate: 44100,
            channels: 2,
            signal: Signal::Tone(440.0),
        }
    }
}

/// Generate a 16-bit PCM WAV file
pub fn generate_test_wav(path: &Path, config: &AudioConfig) -> anyhow::Result<PathBuf> {
    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    let total_samples = (config.duration_seconds * config.sample_rate as f64) as usize;
    let rate = config.sample_rate as f32;

    for i in 0..total_samples {
        let t = i as f32 / rate;
        let value = match config.signal {
            Signal::Tone(freq) => 0.3 * (2.0 * PI * freq * t).sin(),
            Signal::Clicks { bpm } => {
                let period = 60.0 / bpm;
                let since_beat = t % period;
                if since_beat < 0.02 {
                    0.8 * (-since_beat * 200.0).exp() * (2.0 * PI * 1000.0 * since_beat).sin()
                } else {
                    0.0
                }
            }
            Signal::Silence => 0.0,
        };
        let sample = (value * i16::MAX as f32) as i16;

        for _ in 0..config.channels {
            writer.write_sample(sample)?;
        }
    }

    writer.finalize()?;
    Ok(path.to_path_buf())
}

/// Write a file with an audio extension but no decodable content
pub fn write_corrupt_file(path: &Path) -> anyhow::Result<PathBuf> {
    std::fs::write(path, b"ID3\x03\x00\x00\x00\x00\x00\x00not really audio")?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_simple_wav() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.wav");

        generate_test_wav(&path, &AudioConfig::default()).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.duration(), 3 * 44100);
    }
}
