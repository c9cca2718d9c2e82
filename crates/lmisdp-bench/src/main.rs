mod logging;
mod profile;
mod synthetic;

use clap::{Parser, Subcommand, ValueEnum};
use lmisdp_core::{Backend, ObjectiveSense, SplitBlocks};
use lmisdp_export::{ConicExporter, ConicProblem, Export, ExportConfig, SdpaDense, SdpaSparse};
use logging::LogFormat;
use nalgebra::DMatrix;
use profile::{BackendComparison, ProfileSample, compare_backends, print_comparison};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use synthetic::{SyntheticShape, synthetic_problem};

const DEFAULT_BLOCK_COUNTS: [usize; 3] = [4, 16, 64];

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Lower symbolic LMI problems to SDP solver input and profile the coefficient backends"
)]
struct Cli {
    /// Tracing filter (for example `debug` or `lmisdp_core=trace`); overrides LMISDP_TRACE
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a synthetic block-diagonal problem as SDPA text or conic JSON
    Export(ExportArgs),
    /// Lower synthetic cases on each backend and compare the results
    Profile(ProfileArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Number of diagonal blocks in the LMI matrix
    #[arg(long, default_value_t = 2)]
    blocks: usize,

    /// Rows of each diagonal block
    #[arg(long, default_value_t = 3)]
    block_size: usize,

    /// Number of decision variables
    #[arg(long, default_value_t = 2)]
    variables: usize,

    #[arg(long, value_enum, default_value = "sdpa-sparse")]
    format: ExportFormat,

    #[arg(long, value_enum, default_value = "full")]
    split: SplitArg,

    #[arg(long, value_enum, default_value = "min")]
    sense: SenseArg,

    /// Coefficient backend (defaults to the exporter's preference)
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Comment line written at the top of SDPA files
    #[arg(long)]
    comment: Option<String>,

    /// Output path; stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ProfileArgs {
    /// Comma-separated list of block counts, one case each
    #[arg(long, value_delimiter = ',')]
    cases: Option<Vec<usize>>,

    #[arg(long, default_value_t = 4)]
    block_size: usize,

    #[arg(long, default_value_t = 8)]
    variables: usize,

    #[arg(
        long = "backend",
        value_enum,
        value_delimiter = ',',
        default_value = "dense,sparse-lil,sparse-native"
    )]
    backends: Vec<BackendArg>,

    #[arg(long, value_enum, default_value = "full")]
    split: SplitArg,

    /// Runs per case and backend; the fastest one is reported
    #[arg(long, default_value_t = 3)]
    repetitions: u32,

    /// Skip RSS sampling around each stage
    #[arg(long)]
    timing_only: bool,

    /// `json` prints every sample alongside the comparison
    #[arg(long, value_enum, default_value = "table")]
    format: ReportFormat,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum ExportFormat {
    SdpaSparse,
    SdpaDense,
    Conic,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum ReportFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum SplitArg {
    None,
    BlockDiag,
    Full,
}

impl From<SplitArg> for SplitBlocks {
    fn from(value: SplitArg) -> Self {
        match value {
            SplitArg::None => SplitBlocks::None,
            SplitArg::BlockDiag => SplitBlocks::BlockDiag,
            SplitArg::Full => SplitBlocks::Full,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum SenseArg {
    Min,
    Max,
}

impl From<SenseArg> for ObjectiveSense {
    fn from(value: SenseArg) -> Self {
        match value {
            SenseArg::Min => ObjectiveSense::Minimize,
            SenseArg::Max => ObjectiveSense::Maximize,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum BackendArg {
    Dense,
    SparseLil,
    SparseNative,
}

impl From<BackendArg> for Backend {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Dense => Backend::Dense,
            BackendArg::SparseLil => Backend::SparseLil,
            BackendArg::SparseNative => Backend::SparseNative,
        }
    }
}

/// Conic triple with every matrix written as a list of rows.
#[derive(Debug, Serialize)]
struct ConicJson {
    c: Vec<f64>,
    gs: Vec<Vec<Vec<f64>>>,
    hs: Vec<Vec<Vec<f64>>>,
}

impl From<&ConicProblem> for ConicJson {
    fn from(problem: &ConicProblem) -> Self {
        Self {
            c: problem.c.iter().copied().collect(),
            gs: problem.gs.iter().map(matrix_rows).collect(),
            hs: problem.hs.iter().map(matrix_rows).collect(),
        }
    }
}

fn matrix_rows(matrix: &DMatrix<f64>) -> Vec<Vec<f64>> {
    matrix
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}

#[derive(Debug, Serialize)]
struct ProfileReport<'a> {
    samples: &'a [ProfileSample],
    comparison: &'a [BackendComparison],
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init_tracing(cli.log_level.as_deref(), cli.log_format)?;
    match cli.command {
        Command::Export(args) => export_command(args),
        Command::Profile(args) => profile_command(args),
    }
}

fn export_command(args: ExportArgs) -> Result<(), Box<dyn Error>> {
    let problem = synthetic_problem(SyntheticShape {
        blocks: args.blocks,
        block_size: args.block_size,
        variables: args.variables,
    })?;

    let mut config = ExportConfig::new()
        .with_sense(args.sense.into())
        .with_split_blocks(args.split.into());
    if let Some(comment) = args.comment {
        config = config.with_comment(comment);
    }
    if let Some(backend) = args.backend {
        config = config.with_backend(backend.into());
    }

    let text = match args.format {
        ExportFormat::SdpaSparse => SdpaSparse.export(&problem, &config)?,
        ExportFormat::SdpaDense => SdpaDense.export(&problem, &config)?,
        ExportFormat::Conic => {
            let conic = ConicExporter.export(&problem, &config)?;
            serde_json::to_string_pretty(&ConicJson::from(&conic))? + "\n"
        }
    };

    match args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, text)?;
            println!("wrote: {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn profile_command(args: ProfileArgs) -> Result<(), Box<dyn Error>> {
    if args.repetitions == 0 {
        return Err("repetitions must be greater than zero".into());
    }
    if args.block_size == 0 {
        return Err("block-size must be greater than zero".into());
    }

    let block_counts = args
        .cases
        .clone()
        .unwrap_or_else(|| DEFAULT_BLOCK_COUNTS.to_vec());
    let mut samples = Vec::new();
    for blocks in block_counts {
        let shape = SyntheticShape {
            blocks,
            block_size: args.block_size,
            variables: args.variables,
        };
        let problem = synthetic_problem(shape)?;
        for backend in &args.backends {
            for repetition in 1..=args.repetitions {
                samples.push(profile::profile_sample(
                    shape,
                    Backend::from(*backend),
                    repetition,
                    &problem,
                    args.split.into(),
                    !args.timing_only,
                )?);
            }
        }
    }

    let comparison = compare_backends(&samples);
    match args.format {
        ReportFormat::Table => print_comparison(&comparison),
        ReportFormat::Json => {
            let report = ProfileReport {
                samples: &samples,
                comparison: &comparison,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::{Cli, ConicJson, ExportConfig, synthetic_problem};
    use crate::synthetic::SyntheticShape;
    use clap::{CommandFactory, Parser};
    use lmisdp_export::{ConicExporter, Export};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn profile_defaults_cover_every_backend() {
        let cli = Cli::try_parse_from(["lmisdp", "profile", "--cases", "2,8"]).expect("valid args");
        match cli.command {
            super::Command::Profile(args) => {
                assert_eq!(args.cases, Some(vec![2, 8]));
                assert_eq!(args.backends.len(), 3);
                assert_eq!(args.repetitions, 3);
            }
            super::Command::Export(_) => panic!("expected the profile subcommand"),
        }
    }

    #[test]
    fn conic_json_writes_rows() {
        let shape = SyntheticShape {
            blocks: 2,
            block_size: 2,
            variables: 3,
        };
        let problem = synthetic_problem(shape).expect("distinct variables");
        let conic = ConicExporter
            .export(&problem, &ExportConfig::new())
            .expect("linear");
        let json = ConicJson::from(&conic);

        assert_eq!(json.c, vec![1.0, 1.0, 1.0]);
        assert_eq!(json.gs.len(), 2);
        // column i of G holds -C_i flattened, one row per matrix cell
        assert_eq!(json.gs[0].len(), 4);
        assert!(json.gs[0].iter().all(|row| row.len() == 3));
        assert_eq!(json.hs[0], vec![vec![3.0, 0.0], vec![0.0, 3.0]]);

        let text = serde_json::to_string(&json).expect("serializable");
        assert!(text.starts_with("{\"c\":[1.0,1.0,1.0],\"gs\":"));
    }
}
