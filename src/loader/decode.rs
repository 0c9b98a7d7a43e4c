//! Decode stem files to mono PCM. WAV through `hound`, MP3 through `minimp3`.
//! Multi-channel audio keeps channel 0.

use std::io::Cursor;

use crate::audio::DecodedAudio;
use crate::error::{MixerError, Result};

/// Decode `bytes`, detecting the container from its magic bytes.
pub fn decode_audio(label: &str, bytes: &[u8]) -> Result<DecodedAudio> {
    if bytes.starts_with(b"RIFF") {
        decode_wav(label, bytes)
    } else {
        decode_mp3(label, bytes)
    }
}

pub fn decode_wav(label: &str, bytes: &[u8]) -> Result<DecodedAudio> {
    let mut reader =
        hound::WavReader::new(Cursor::new(bytes)).map_err(|e| MixerError::asset_load(label, e))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| MixerError::asset_load(label, e))?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| MixerError::asset_load(label, e))?
        }
    };

    let mono: Vec<f32> = interleaved.into_iter().step_by(channels).collect();
    if mono.is_empty() {
        return Err(MixerError::asset_load(label, "WAV file contains no samples"));
    }
    Ok(DecodedAudio::new(mono, spec.sample_rate))
}

pub fn decode_mp3(label: &str, bytes: &[u8]) -> Result<DecodedAudio> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(bytes));
    let mut pcm: Vec<i16> = Vec::new();
    let mut sample_rate = 0u32;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if sample_rate == 0 {
                    sample_rate = frame.sample_rate.max(0) as u32;
                }
                let channels = frame.channels.max(1);
                pcm.extend(frame.data.iter().step_by(channels));
            }
            Err(minimp3::Error::Eof) => break,
            Err(minimp3::Error::SkippedData) => continue,
            Err(e) => return Err(MixerError::asset_load(label, format!("{e:?}"))),
        }
    }

    if pcm.is_empty() || sample_rate == 0 {
        return Err(MixerError::asset_load(label, "no decodable MP3 frames"));
    }
    Ok(DecodedAudio::from_i16(&pcm, sample_rate))
}
