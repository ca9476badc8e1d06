//! Frequency extraction command.

use clap::{Args, ValueEnum};
use std::path::PathBuf;
use tunescan_analysis::{NaffConfig, Refinement, perform_naff};
use tunescan_io::{
    AnalysisReport, SampleSelection, load_config, read_samples, read_wav_info, write_report,
};

/// Refinement strategies for CLI
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CliRefinement {
    Parabolic,
    Brent,
}

impl From<CliRefinement> for Refinement {
    fn from(r: CliRefinement) -> Self {
        match r {
            CliRefinement::Parabolic => Refinement::Parabolic,
            CliRefinement::Brent => Refinement::Brent,
        }
    }
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input sample file (.wav or text columns)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// TOML file with analysis options; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// WAV channel or text column to read (default: mono mix / first column)
    #[arg(long)]
    column: Option<usize>,

    /// Samples to skip at the start of the record
    #[arg(long, default_value = "0")]
    offset: usize,

    /// Samples to analyse after the offset (default: the rest)
    #[arg(long)]
    points: Option<usize>,

    /// Maximum number of frequencies to extract
    #[arg(long)]
    max_frequencies: Option<usize>,

    /// Sample spacing
    #[arg(long)]
    dt: Option<f64>,

    /// Time of the first sample
    #[arg(long)]
    t0: Option<f64>,

    /// Lowest frequency searched
    #[arg(long)]
    lower: Option<f64>,

    /// Highest frequency searched
    #[arg(long)]
    upper: Option<f64>,

    /// Stop when the residual RMS drops by less than this fraction
    #[arg(long)]
    rms_change_limit: Option<f64>,

    /// Frequency accuracy as a fraction of Nyquist
    #[arg(long)]
    accuracy: Option<f64>,

    /// Peak refinement strategy
    #[arg(long, value_enum)]
    refinement: Option<CliRefinement>,

    /// Revolution frequency in Hz; adds a Hz column for tunes in cycles/turn
    #[arg(long)]
    revolution_frequency: Option<f64>,

    /// Write the result to this file (.csv or .json)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl AnalyzeArgs {
    /// Start from the config file (or defaults) and apply flag overrides.
    fn resolve_config(&self) -> anyhow::Result<NaffConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => NaffConfig::default(),
        };

        if let Some(v) = self.max_frequencies {
            config.max_frequencies = v;
        }
        if let Some(v) = self.dt {
            config.dt = v;
        }
        if let Some(v) = self.t0 {
            config.t0 = v;
        }
        if let Some(v) = self.lower {
            config.lower_freq_limit = v;
        }
        if let Some(v) = self.upper {
            config.upper_freq_limit = v;
        }
        if let Some(v) = self.rms_change_limit {
            config.frac_rms_change_limit = v;
        }
        if let Some(v) = self.accuracy {
            config.frac_freq_accuracy_limit = v;
        }
        if let Some(v) = self.refinement {
            config.refinement = v.into();
        }

        config.validate()?;
        Ok(config)
    }
}

pub fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = args.resolve_config()?;
    let selection = SampleSelection {
        column: args.column,
        offset: args.offset,
        points: args.points,
    };

    println!("Analyzing {}...", args.input.display());
    let is_wav = args
        .input
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
    if is_wav {
        let info = read_wav_info(&args.input)?;
        tracing::info!(
            channels = info.channels,
            sample_rate = info.sample_rate,
            frames = info.num_frames,
            "WAV record"
        );
        if args.dt.is_none() && args.revolution_frequency.is_none() {
            println!(
                "  hint: frequencies are in cycles/turn; pass --dt {:e} or \
                 --revolution-frequency {} for Hz",
                1.0 / f64::from(info.sample_rate),
                info.sample_rate
            );
        }
    }

    let samples = read_samples(&args.input, &selection)?;
    tracing::info!(
        samples = samples.len(),
        offset = args.offset,
        column = ?args.column,
        "loaded record"
    );
    println!(
        "  {} samples, dt = {}, Nyquist = {}, refinement = {:?}",
        samples.len(),
        config.dt,
        config.nyquist(),
        config.refinement
    );

    let result = perform_naff(&samples, &config)?;

    println!();
    match args.revolution_frequency {
        Some(_) => println!(
            "{:>3}  {:>12}  {:>12}  {:>12}  {:>9}  {:>12}",
            "#", "frequency", "amplitude", "phase", "signif.", "Hz"
        ),
        None => println!(
            "{:>3}  {:>12}  {:>12}  {:>12}  {:>9}",
            "#", "frequency", "amplitude", "phase", "signif."
        ),
    }
    for (i, c) in result.components().enumerate() {
        print!(
            "{:>3}  {:>12.8}  {:>12.6e}  {:>12.6}  {:>9.2e}",
            i, c.frequency, c.amplitude, c.phase, c.significance
        );
        match args.revolution_frequency {
            Some(rev) => println!("  {:>12.4}", c.frequency_hz(rev)),
            None => println!(),
        }
    }
    println!();
    println!(
        "Found {} of {} component(s), stopped: {:?}",
        result.found, config.max_frequencies, result.termination
    );

    if let Some(output) = args.output {
        let report = AnalysisReport::new(
            args.input.display().to_string(),
            samples.len(),
            &config,
            &result,
        );
        write_report(&report, &output)?;
        println!("Saved report to {}", output.display());
    }

    Ok(())
}
