//! Command-line front end for REPET source separation
//!
//! Reads a WAV file, runs the separation pipeline, and writes the vocal and
//! instrumental components to WAV files.

use clap::Parser;
use repet_dsp::{separate_audio, SeparationConfig};
use std::path::PathBuf;
use std::process::ExitCode;

/// REPET audio source separation
#[derive(Debug, Parser)]
#[command(name = "separate", version, about)]
struct Args {
    /// Input audio file (WAV)
    input: PathBuf,

    /// Output vocal file
    #[arg(long, default_value = "vocal.wav")]
    vocal: PathBuf,

    /// Output instrumental file
    #[arg(long, default_value = "instrumental.wav")]
    instrumental: PathBuf,

    /// FFT size
    #[arg(long = "n-fft", default_value_t = 2048)]
    n_fft: usize,

    /// Hop length
    #[arg(long, default_value_t = 512)]
    hop_length: usize,
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
    let (samples, sample_rate) = read_wav_mono(&args.input)?;
    eprintln!(
        "Loaded {} samples ({:.2} s) at {} Hz",
        samples.len(),
        samples.len() as f32 / sample_rate as f32,
        sample_rate
    );

    let config = SeparationConfig {
        n_fft: args.n_fft,
        hop_length: args.hop_length,
        ..SeparationConfig::default()
    };

    let result = separate_audio(&samples, sample_rate, config)?;
    eprintln!(
        "Detected period: {} frames ({:.2} s){}",
        result.metadata.period_frames,
        result.metadata.period_seconds,
        if result.metadata.period_from_fallback {
            " [fallback]"
        } else {
            ""
        }
    );

    write_wav_mono(&args.vocal, &result.vocal, sample_rate)?;
    write_wav_mono(&args.instrumental, &result.instrumental, sample_rate)?;
    eprintln!(
        "Wrote {} and {}",
        args.vocal.display(),
        args.instrumental.display()
    );

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
