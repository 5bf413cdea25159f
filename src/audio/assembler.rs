//! Ordered WAV concatenation for chapter assembly.
//!
//! The chunk WAVs produced by the speech engine are joined into one stream,
//! sample-exact and in listed order. The first input's format is
//! authoritative; every later input must match it exactly, since silently
//! concatenating mismatched PCM corrupts the audio.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors while assembling chunk audio into one stream.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("no chunk audio to assemble")]
    NoInput,

    #[error("chunk {index} audio format {found:?} does not match the first chunk's {expected:?}")]
    FormatMismatch {
        index: usize,
        expected: WavSpec,
        found: WavSpec,
    },

    #[error("failed to read chunk {index}: {source}")]
    Read {
        index: usize,
        source: hound::Error,
    },

    #[error("failed to write concatenated audio: {0}")]
    Write(#[from] hound::Error),
}

/// Concatenate WAV files into `output`, in the order given.
///
/// The output takes the first input's format parameters and carries the frame
/// data of every input back to back, with no resampling or gain adjustment.
pub fn concatenate_wavs(inputs: &[PathBuf], output: &Path) -> Result<(), AssemblyError> {
    let first = inputs.first().ok_or(AssemblyError::NoInput)?;

    let spec = open_reader(first, 0)?.spec();
    let mut writer = WavWriter::create(output, spec)?;

    for (index, path) in inputs.iter().enumerate() {
        let mut reader = open_reader(path, index)?;
        let found = reader.spec();
        if found != spec {
            return Err(AssemblyError::FormatMismatch {
                index,
                expected: spec,
                found,
            });
        }
        copy_samples(&mut reader, &mut writer, spec, index)?;
    }

    writer.finalize()?;
    Ok(())
}

fn open_reader(path: &Path, index: usize) -> Result<WavReader<BufReader<File>>, AssemblyError> {
    WavReader::open(path).map_err(|source| AssemblyError::Read { index, source })
}

fn copy_samples(
    reader: &mut WavReader<BufReader<File>>,
    writer: &mut WavWriter<BufWriter<File>>,
    spec: WavSpec,
    index: usize,
) -> Result<(), AssemblyError> {
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, _) => {
            for sample in reader.samples::<f32>() {
                let sample = sample.map_err(|source| AssemblyError::Read { index, source })?;
                writer.write_sample(sample)?;
            }
        }
        (SampleFormat::Int, bits) if bits <= 16 => {
            for sample in reader.samples::<i16>() {
                let sample = sample.map_err(|source| AssemblyError::Read { index, source })?;
                writer.write_sample(sample)?;
            }
        }
        (SampleFormat::Int, _) => {
            for sample in reader.samples::<i32>() {
                let sample = sample.map_err(|source| AssemblyError::Read { index, source })?;
                writer.write_sample(sample)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mono_spec(sample_rate: u32) -> WavSpec {
        WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }

    fn write_wav(path: &Path, spec: WavSpec, samples: &[i16]) {
        let mut writer = WavWriter::create(path, spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn read_samples(path: &Path) -> Vec<i16> {
        WavReader::open(path)
            .unwrap()
            .samples::<i16>()
            .map(|s| s.unwrap())
            .collect()
    }

    #[test]
    fn test_concatenation_is_ordered_and_sample_exact() {
        let dir = TempDir::new().unwrap();
        let spec = mono_spec(22050);
        let inputs = vec![
            dir.path().join("0.wav"),
            dir.path().join("1.wav"),
            dir.path().join("2.wav"),
        ];
        write_wav(&inputs[0], spec, &[1, 2, 3]);
        write_wav(&inputs[1], spec, &[4, 5]);
        write_wav(&inputs[2], spec, &[6, 7, 8, 9]);

        let output = dir.path().join("out.wav");
        concatenate_wavs(&inputs, &output).unwrap();

        assert_eq!(read_samples(&output), vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(WavReader::open(&output).unwrap().spec(), spec);
    }

    #[test]
    fn test_concatenation_is_not_commutative() {
        let dir = TempDir::new().unwrap();
        let spec = mono_spec(22050);
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        write_wav(&a, spec, &[1, 1]);
        write_wav(&b, spec, &[2, 2]);

        let forward = dir.path().join("forward.wav");
        let reversed = dir.path().join("reversed.wav");
        concatenate_wavs(&[a.clone(), b.clone()], &forward).unwrap();
        concatenate_wavs(&[b, a], &reversed).unwrap();

        assert_eq!(read_samples(&forward), vec![1, 1, 2, 2]);
        assert_eq!(read_samples(&reversed), vec![2, 2, 1, 1]);
    }

    #[test]
    fn test_single_input_round_trips() {
        let dir = TempDir::new().unwrap();
        let spec = mono_spec(44100);
        let input = dir.path().join("only.wav");
        write_wav(&input, spec, &[10, -20, 30]);

        let output = dir.path().join("out.wav");
        concatenate_wavs(&[input], &output).unwrap();
        assert_eq!(read_samples(&output), vec![10, -20, 30]);
    }

    #[test]
    fn test_empty_input_list_is_an_error() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.wav");
        let err = concatenate_wavs(&[], &output).unwrap_err();
        assert!(matches!(err, AssemblyError::NoInput));
        assert!(!output.exists());
    }

    #[test]
    fn test_format_mismatch_fails_loudly() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        write_wav(&a, mono_spec(22050), &[1, 2]);
        write_wav(&b, mono_spec(44100), &[3, 4]);

        let output = dir.path().join("out.wav");
        let err = concatenate_wavs(&[a, b], &output).unwrap_err();
        match err {
            AssemblyError::FormatMismatch { index, expected, found } => {
                assert_eq!(index, 1);
                assert_eq!(expected.sample_rate, 22050);
                assert_eq!(found.sample_rate, 44100);
            }
            other => panic!("expected FormatMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_unreadable_input_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.wav");
        let output = dir.path().join("out.wav");
        let err = concatenate_wavs(&[missing], &output).unwrap_err();
        assert!(matches!(err, AssemblyError::Read { index: 0, .. }));
    }
}
