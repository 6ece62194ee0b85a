use super::CliError;
use super::helpers::{CliRunReport, build_source, write_report_file};
use coincell_core::common::constants::{
    DEFAULT_BASE_NAME, DEFAULT_COUNT_THRESHOLD, DEFAULT_KAPPA, DEFAULT_MAX_CANDIDATES,
    DEFAULT_SIGNIFICANCE_THRESHOLD,
};
use coincell_core::common::{CellWidths, ClusterConfig, GridShift, OutputSelection};
use coincell_core::modules::report::render_summary;
use coincell_core::modules::{RunRequest, run_clustering};
use std::path::PathBuf;
use tracing::debug;

#[derive(clap::Args, Debug)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["input", "input_dir"])))]
pub(super) struct ClusterArgs {
    /// Candidate files, read in the given order
    #[arg(short = 'I', long, value_name = "FILE", num_args = 1..)]
    input: Vec<PathBuf>,

    /// Directory scanned for candidate files
    #[arg(short = 'i', long, value_name = "DIR")]
    input_dir: Option<PathBuf>,

    /// File-name fragment selecting candidate files in --input-dir
    #[arg(short = 'b', long, value_name = "NAME", default_value = DEFAULT_BASE_NAME)]
    base_name: String,

    /// Dump of every populated cell
    #[arg(short = 'o', long, value_name = "FILE")]
    output: PathBuf,

    /// Directory for the outlier and sky-maximum files (default: parent of --output)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Cell width in frequency
    #[arg(short = 'f', long, value_name = "HZ", allow_negative_numbers = true)]
    freq_window: f64,

    /// Cell width in right ascension
    #[arg(short = 'a', long, value_name = "RAD", allow_negative_numbers = true)]
    ra_window: f64,

    /// Cell width in declination at the equator, added to the right-ascension width
    #[arg(short = 'd', long, value_name = "RAD", allow_negative_numbers = true)]
    dec_window: f64,

    /// Cell width in spin-down
    #[arg(short = 's', long, value_name = "HZ/S", allow_negative_numbers = true)]
    spin_window: f64,

    /// Exponent narrowing the declination width towards the poles
    #[arg(short = 'k', long, default_value_t = DEFAULT_KAPPA, allow_negative_numbers = true)]
    kappa: f64,

    /// Grid-origin shift in frequency, in cell widths
    #[arg(short = 'F', long, default_value_t = 0.0, allow_negative_numbers = true)]
    freq_shift: f64,

    /// Grid-origin shift in right ascension, in cell widths
    #[arg(short = 'A', long, default_value_t = 0.0, allow_negative_numbers = true)]
    ra_shift: f64,

    /// Grid-origin shift in declination, in cell widths
    #[arg(short = 'D', long, default_value_t = 0.0, allow_negative_numbers = true)]
    dec_shift: f64,

    /// Grid-origin shift in spin-down, in cell widths
    #[arg(short = 'S', long, default_value_t = 0.0, allow_negative_numbers = true)]
    spin_shift: f64,

    /// Candidates with a detection statistic at or below this value are ignored
    #[arg(long = "two-f-threshold", default_value_t = 0.0, allow_negative_numbers = true)]
    two_f_threshold: f64,

    /// Coincidence count above which cells are written to the coincident outlier files
    #[arg(long, default_value_t = DEFAULT_COUNT_THRESHOLD)]
    count_threshold: u32,

    /// Significance above which cells are written to the significant outlier files
    #[arg(long, default_value_t = DEFAULT_SIGNIFICANCE_THRESHOLD, allow_negative_numbers = true)]
    significance_threshold: f64,

    /// Always write the top cell of the coincidence and significance orderings
    #[arg(long, conflicts_with_all = ["count_threshold", "significance_threshold"])]
    auto: bool,

    /// Ceiling on ingested candidates
    #[arg(long, default_value_t = DEFAULT_MAX_CANDIDATES)]
    max_candidates: usize,

    /// JSON run report output path
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

impl ClusterArgs {
    fn to_config(&self) -> ClusterConfig {
        let selection = if self.auto {
            OutputSelection::Auto
        } else {
            OutputSelection::Thresholds {
                count: self.count_threshold,
                significance: self.significance_threshold,
            }
        };

        ClusterConfig {
            widths: CellWidths {
                frequency: self.freq_window,
                right_ascension: self.ra_window,
                declination: self.dec_window,
                spin_down: self.spin_window,
            },
            shift: GridShift {
                frequency: self.freq_shift,
                right_ascension: self.ra_shift,
                declination: self.dec_shift,
                spin_down: self.spin_shift,
            },
            kappa: self.kappa,
            two_f_threshold: self.two_f_threshold,
            selection,
            max_candidates: self.max_candidates,
        }
    }
}

pub(super) fn run_cluster_command(args: ClusterArgs) -> Result<i32, CliError> {
    let config = args.to_config();
    config.validate().map_err(CliError::Compute)?;

    let source = build_source(&args.input, args.input_dir.as_deref(), &args.base_name)
        .map_err(CliError::Compute)?;
    debug!(files = source.paths().len(), "resolved candidate files");

    let mut request = RunRequest::new(config, args.output.clone());
    if let Some(output_dir) = &args.output_dir {
        request = request.with_output_dir(output_dir);
    }
    let outcome = run_clustering(&source, &request).map_err(CliError::Compute)?;
    eprint!("{}", render_summary(&outcome.summary));

    println!("Cell dump: {}", args.output.display());
    if let Some(report_path) = &args.report {
        let report = CliRunReport::new(&request, source.paths(), &outcome);
        write_report_file(report_path, &report)?;
        println!("JSON report: {}", report_path.display());
    }

    Ok(0)
}
