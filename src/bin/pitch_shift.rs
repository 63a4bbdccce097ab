//! Command-line front end for pitch shifting
//!
//! Reads a WAV file, applies a semitone or target-pitch shift, and writes the
//! result. Exactly one of `--semitones` and `--target-pitch` must be given.

use clap::Parser;
use repet_dsp::{pitch_shift_audio, PitchShiftConfig, PitchShiftRequest};
use std::path::PathBuf;
use std::process::ExitCode;

/// Phase-vocoder pitch shifting
#[derive(Debug, Parser)]
#[command(name = "pitch-shift", version, about)]
#[command(group = clap::ArgGroup::new("shift").required(true).args(["semitones", "target_pitch"]))]
struct Args {
    /// Input audio file (WAV)
    input: PathBuf,

    /// Output audio file
    output: PathBuf,

    /// Semitones to shift (e.g. 2 for up 2 semitones, -3 for down 3)
    #[arg(long)]
    semitones: Option<f32>,

    /// Target pitch in Hz (source pitch is detected from the reference)
    #[arg(long = "target-pitch")]
    target_pitch: Option<f32>,

    /// Reference recording for target-pitch mode (defaults to the input)
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Sample rate in Hz to process at, overriding the WAV header. Input is
    /// not resampled. Without this flag the header's rate is used, falling
    /// back to 22050 when the header is unusable
    #[arg(long)]
    sr: Option<u32>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let (samples, file_rate) = read_wav_mono(&args.input)?;
    let sample_rate = args
        .sr
        .unwrap_or(if file_rate > 0 { file_rate } else { 22050 });
    eprintln!(
        "Loaded {} samples ({:.2} s) at {} Hz",
        samples.len(),
        samples.len() as f32 / sample_rate as f32,
        sample_rate
    );

    let config = PitchShiftConfig::default();

    let shifted = match (args.semitones, args.target_pitch) {
        (Some(semitones), None) => pitch_shift_audio(
            &samples,
            sample_rate,
            &PitchShiftRequest::Semitones(semitones),
            &config,
        )?,
        (None, Some(target_hz)) => {
            let reference = match &args.reference {
                Some(path) => read_wav_mono(path)?.0,
                None => samples.clone(),
            };
            pitch_shift_audio(
                &samples,
                sample_rate,
                &PitchShiftRequest::TargetFrequency {
                    target_hz,
                    reference: &reference,
                },
                &config,
            )?
        }
        // clap's arg group enforces exactly one mode
        _ => unreachable!(),
    };

    write_wav_mono(&args.output, &shifted, sample_rate)?;
    eprintln!("Wrote {}", args.output.display());

    Ok(())
}

/// Read a WAV file as mono f32 samples, downmixing multi-channel input
fn read_wav_mono(path: &PathBuf) -> Result<(Vec<f32>, u32), Box<dyn std::error::Error>> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_value))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let channels = spec.channels as usize;
    let mono = if channels > 1 {
        samples
            .chunks(channels)
            .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        samples
    };

    Ok((mono, spec.sample_rate))
}

/// Write mono f32 samples as a 32-bit float WAV file
fn write_wav_mono(
    path: &PathBuf,
    samples: &[f32],
    sample_rate: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_shift_mode_required() {
        assert!(Args::try_parse_from(["pitch-shift", "in.wav", "out.wav"]).is_err());
        assert!(Args::try_parse_from([
            "pitch-shift",
            "in.wav",
            "out.wav",
            "--semitones",
            "2",
            "--target-pitch",
            "440",
        ])
        .is_err());
        assert!(
            Args::try_parse_from(["pitch-shift", "in.wav", "out.wav", "--semitones", "2"]).is_ok()
        );
        assert!(Args::try_parse_from([
            "pitch-shift",
            "in.wav",
            "out.wav",
            "--target-pitch",
            "440",
        ])
        .is_ok());
    }

    #[test]
    fn test_sr_is_an_optional_override() {
        let args = Args::try_parse_from(["pitch-shift", "in.wav", "out.wav", "--semitones", "2"])
            .unwrap();
        assert_eq!(args.sr, None);

        let args = Args::try_parse_from([
            "pitch-shift",
            "in.wav",
            "out.wav",
            "--semitones",
            "2",
            "--sr",
            "44100",
        ])
        .unwrap();
        assert_eq!(args.sr, Some(44100));
    }
}
