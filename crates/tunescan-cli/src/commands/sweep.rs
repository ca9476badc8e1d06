//! Drifting-tune tracking command.
//!
//! Each step synthesizes a record at the next frequency and runs one
//! extraction on it, so the measured line can be compared with the one
//! that was injected.

use super::analyze::CliRefinement;
use super::common::{BeamSignal, LHC_REVOLUTION_FREQUENCY, XorShift64};
use anyhow::ensure;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tunescan_analysis::{Naff, NaffConfig, Refinement};

#[derive(Args)]
pub struct SweepArgs {
    /// First oscillation frequency in Hz
    #[arg(long, default_value = "82.145")]
    start: f64,

    /// Frequency increment per step in Hz
    #[arg(long, default_value = "0.05")]
    step: f64,

    /// Number of steps
    #[arg(long, default_value = "20")]
    count: usize,

    /// Turns per record
    #[arg(long, default_value = "1024")]
    points: usize,

    /// Peak of uniform measurement noise
    #[arg(long, default_value = "0.0")]
    noise: f64,

    /// Revolution frequency in Hz
    #[arg(long, default_value_t = LHC_REVOLUTION_FREQUENCY)]
    revolution_frequency: f64,

    /// Frequency accuracy as a fraction of Nyquist
    #[arg(long, default_value = "1e-6")]
    accuracy: f64,

    /// Peak refinement strategy
    #[arg(long, value_enum, default_value = "parabolic")]
    refinement: CliRefinement,

    /// Noise generator seed
    #[arg(long, default_value = "1")]
    seed: u64,
}

struct Row {
    expected: f64,
    measured: Option<f64>,
}

pub fn run(args: SweepArgs) -> anyhow::Result<()> {
    ensure!(
        args.revolution_frequency > 0.0,
        "--revolution-frequency must be positive"
    );

    // dt of one turn puts every frequency in Hz
    let mut config = NaffConfig {
        max_frequencies: 1,
        frac_freq_accuracy_limit: args.accuracy,
        lower_freq_limit: 0.0,
        dt: 1.0 / args.revolution_frequency,
        refinement: Refinement::from(args.refinement),
        ..NaffConfig::default()
    };
    config.upper_freq_limit = config.nyquist();
    config.validate()?;

    let mut engine = Naff::new(args.points)?;
    let mut rng = XorShift64::new(args.seed);
    let mut rows = Vec::with_capacity(args.count);

    println!(
        "Sweeping {} step(s) from {:.3} Hz by {:.3} Hz, {} turns each",
        args.count,
        args.start,
        args.step,
        engine.points()
    );

    let pb = ProgressBar::new(args.count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    for k in 0..args.count {
        let signal = BeamSignal {
            frequency: args.start + k as f64 * args.step,
            revolution_frequency: args.revolution_frequency,
            amplitude: 1.0,
            noise: args.noise,
            pickups: 1,
        };
        let records = signal.positions(args.points, &mut rng);
        let result = engine.analyze(&records[0], &config)?;
        let measured = result.component(0).map(|c| c.frequency);
        if measured.is_none() {
            tracing::warn!(
                step = k,
                frequency = signal.frequency,
                termination = ?result.termination,
                "no line extracted"
            );
        }
        rows.push(Row {
            expected: signal.frequency,
            measured,
        });
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!();
    println!("{:>5}  {:>12}  {:>12}  {:>12}", "step", "expected", "measured", "error");
    let mut worst: f64 = 0.0;
    for (k, row) in rows.iter().enumerate() {
        match row.measured {
            Some(measured) => {
                let error = measured - row.expected;
                worst = worst.max(error.abs());
                println!(
                    "{:>5}  {:>12.5}  {:>12.5}  {:>+12.3e}",
                    k, row.expected, measured, error
                );
            }
            None => println!("{:>5}  {:>12.5}  {:>12}  {:>12}", k, row.expected, "-", "-"),
        }
    }
    println!();
    println!("Worst absolute error: {worst:.3e} Hz");

    Ok(())
}
