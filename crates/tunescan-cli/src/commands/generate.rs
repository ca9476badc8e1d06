//! Synthetic beam record generation command.

use super::common::{BeamSignal, LHC_REVOLUTION_FREQUENCY, PICKUP_OFFSETS, XorShift64};
use anyhow::ensure;
use clap::Args;
use std::path::PathBuf;
use tunescan_io::{WavSpec, write_columns, write_wav_channels};

#[derive(Args)]
pub struct GenerateArgs {
    /// Output file (.wav, anything else is written as text columns)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Oscillation frequency in Hz
    #[arg(long)]
    tune: f64,

    /// Number of turns
    #[arg(long, default_value = "256")]
    points: usize,

    /// Peak position
    #[arg(long, default_value = "1.0")]
    amplitude: f64,

    /// Peak of uniform measurement noise
    #[arg(long, default_value = "0.0")]
    noise: f64,

    /// Revolution frequency in Hz
    #[arg(long, default_value_t = LHC_REVOLUTION_FREQUENCY)]
    revolution_frequency: f64,

    /// Number of pickups (one channel or column each)
    #[arg(long, default_value = "1")]
    pickups: usize,

    /// Noise generator seed
    #[arg(long, default_value = "1")]
    seed: u64,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    ensure!(
        (1..=PICKUP_OFFSETS.len()).contains(&args.pickups),
        "--pickups must be between 1 and {}",
        PICKUP_OFFSETS.len()
    );
    ensure!(
        args.revolution_frequency > 0.0,
        "--revolution-frequency must be positive"
    );

    let signal = BeamSignal {
        frequency: args.tune,
        revolution_frequency: args.revolution_frequency,
        amplitude: args.amplitude,
        noise: args.noise,
        pickups: args.pickups,
    };
    let records = signal.positions(args.points, &mut XorShift64::new(args.seed));

    let is_wav = args
        .output
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
    if is_wav {
        let spec = WavSpec {
            channels: args.pickups as u16,
            sample_rate: args.revolution_frequency.round() as u32,
            bits_per_sample: 32,
        };
        write_wav_channels(&args.output, records.as_slice(), spec)?;
    } else {
        write_columns(&args.output, records.as_slice())?;
    }

    println!(
        "Generated {} turns x {} pickup(s) at {:.3} Hz (tune {:.6}): {}",
        args.points,
        args.pickups,
        args.tune,
        signal.tune(),
        args.output.display()
    );
    Ok(())
}
