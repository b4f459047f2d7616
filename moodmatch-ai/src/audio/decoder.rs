//! Audio Decoding Utilities
//!
//! Decodes audio files to mono f32 PCM samples using symphonia (MP3, FLAC, WAV, OGG, AAC, ...).
//! Decoding stops once the requested duration has been produced, so long files cost no more
//! than their first minute.

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::FromSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

/// Longest stretch of audio analysed per file
pub const DEFAULT_MAX_DURATION_SECONDS: f64 = 60.0;

/// Decoded audio result
#[derive(Debug)]
pub struct DecodedAudio {
    /// Mono audio samples (f32, range [-1.0, 1.0])
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Original channel count
    pub channels: usize,
    /// Duration of `samples` in seconds
    pub duration_seconds: f64,
}

/// Decode an audio file to mono f32 PCM samples
///
/// **Algorithm:**
/// 1. Probe the container (file extension used as a hint)
/// 2. Pick the first track with a known codec
/// 3. Decode packets, averaging channels to mono, until `max_duration_seconds` is reached
/// 4. Truncate to exactly `max_duration_seconds`
///
/// Corrupt packets are skipped; any other decoder or I/O failure is an error.
///
/// # Errors
/// * File I/O errors
/// * Unsupported format
/// * No decodable audio in the file
pub fn decode_audio_file(file_path: &Path, max_duration_seconds: f64) -> Result<DecodedAudio> {
    tracing::debug!(path = %file_path.display(), "Decoding audio file");

    let file = std::fs::File::open(file_path)
        .with_context(|| format!("Failed to open audio file: {}", file_path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = file_path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .with_context(|| format!("Failed to probe audio file: {}", file_path.display()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio track found in file")?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("Sample rate unknown")?;
    let channel_count = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(1);

    let max_samples = if max_duration_seconds.is_finite() && max_duration_seconds > 0.0 {
        (max_duration_seconds * sample_rate as f64).round() as usize
    } else {
        usize::MAX
    };

    tracing::debug!(
        path = %file_path.display(),
        sample_rate = sample_rate,
        channels = channel_count,
        "Audio file info"
    );

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .with_context(|| format!("Failed to create decoder for: {}", file_path.display()))?;

    let mut samples: Vec<f32> = Vec::new();

    while samples.len() < max_samples {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(anyhow!("Error reading packet: {}", e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => mix_to_mono(&decoded, &mut samples),
            Err(SymphoniaError::DecodeError(msg)) => {
                tracing::debug!(path = %file_path.display(), error = msg, "Skipping corrupt packet");
            }
            Err(e) => {
                return Err(anyhow!(
                    "Failed to decode packet in {}: {}",
                    file_path.display(),
                    e
                ))
            }
        }
    }

    if samples.is_empty() {
        return Err(anyhow!(
            "No audio samples decoded from: {}",
            file_path.display()
        ));
    }

    samples.truncate(max_samples);
    let duration_seconds = samples.len() as f64 / sample_rate as f64;

    tracing::debug!(
        path = %file_path.display(),
        total_samples = samples.len(),
        duration_seconds = format!("{:.2}", duration_seconds),
        "Audio decoding complete"
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels: channel_count,
        duration_seconds,
    })
}

/// Append the channel average of a decoded buffer to `out`
fn mix_to_mono(decoded: &AudioBufferRef, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::U8(buf) => average_channels(&**buf, out),
        AudioBufferRef::U16(buf) => average_channels(&**buf, out),
        AudioBufferRef::U24(buf) => average_channels(&**buf, out),
        AudioBufferRef::U32(buf) => average_channels(&**buf, out),
        AudioBufferRef::S8(buf) => average_channels(&**buf, out),
        AudioBufferRef::S16(buf) => average_channels(&**buf, out),
        AudioBufferRef::S24(buf) => average_channels(&**buf, out),
        AudioBufferRef::S32(buf) => average_channels(&**buf, out),
        AudioBufferRef::F32(buf) => average_channels(&**buf, out),
        AudioBufferRef::F64(buf) => average_channels(&**buf, out),
    }
}

fn average_channels<S>(buf: &AudioBuffer<S>, out: &mut Vec<f32>)
where
    S: Sample,
    f32: FromSample<S>,
{
    let num_channels = buf.spec().channels.count();
    let num_frames = buf.frames();
    if num_channels == 0 {
        return;
    }

    out.reserve(num_frames);
    for frame_idx in 0..num_frames {
        let mut sum = 0.0f32;
        for ch in 0..num_channels {
            sum += f32::from_sample(buf.chan(ch)[frame_idx]);
        }
        out.push(sum / num_channels as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_audio_file_not_found() {
        let result = decode_audio_file(Path::new("/nonexistent/file.mp3"), 60.0);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to open audio file"));
    }

    #[test]
    fn test_decode_garbage_file_fails() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("noise.mp3");
        std::fs::write(&path, b"definitely not an mp3 stream").unwrap();

        assert!(decode_audio_file(&path, 60.0).is_err());
    }

    // Real decode paths are exercised by the integration tests with hound-generated WAVs
}
