//! Keylabel: keyboard-driven image classification labeling.
//!
//! Keylabel shows the images of a directory one at a time and lets an
//! operator assign each a class with a single key press. Labels are stored in
//! a two-column CSV so that a session can be resumed later, and a companion
//! `split` command copies the images into one directory per class.
//!
//! # Modules
//!
//! - [`taxonomy`]: Class names and the class-name file
//! - [`item`]: Labels and labeled items
//! - [`store`]: Label CSV reading, writing and merging
//! - [`session`]: The labeling state machine
//! - [`display`]: Display adapters driving a session
//! - [`split`]: Copying labeled images into per-class directories
//! - [`error`]: Error types for keylabel operations

pub mod display;
pub mod error;
pub mod item;
pub mod prepare;
pub mod scan;
pub mod session;
pub mod split;
pub mod store;
pub mod summary;
pub mod taxonomy;

use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

pub use error::LabelError;

use display::{KeyMap, TerminalDisplay};
use session::{SessionConfig, SessionController};
use store::CsvEncoding;
use summary::LabelSummary;
use taxonomy::ClassTaxonomy;

/// Window title used by the labeling session.
const WINDOW_NAME: &str = "keylabel";

/// File name of the label CSV written by the `label` command.
const RESULT_FILE_NAME: &str = "label.csv";

/// The keylabel CLI application.
#[derive(Parser)]
#[command(name = "keylabel")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Label the images of a directory interactively.
    Label(LabelArgs),
    /// Copy labeled images into one directory per class.
    Split(SplitArgs),
}

/// Dataset layout shared by all subcommands. Paths are relative to INPUT_DIR.
#[derive(clap::Args)]
struct DatasetArgs {
    /// Dataset directory.
    input_dir: PathBuf,

    /// Image directory.
    #[arg(short = 'i', long = "images", default_value = "image", env = "KEYLABEL_IMAGE_DIR")]
    images: PathBuf,

    /// Class name CSV (one name per row).
    #[arg(short = 'c', long = "classes", default_value = "class_names.csv", env = "KEYLABEL_CLASSES")]
    classes: PathBuf,

    /// Label CSV to read.
    #[arg(short = 'l', long = "labels", default_value = "label.csv", env = "KEYLABEL_LABELS")]
    labels: PathBuf,

    /// Write CSV files with a UTF-8 byte order mark.
    #[arg(long, env = "KEYLABEL_BOM")]
    bom: bool,

    /// Output format for the final report ('text' or 'json').
    #[arg(long, default_value = "text")]
    report: String,
}

impl DatasetArgs {
    fn encoding(&self) -> CsvEncoding {
        if self.bom {
            CsvEncoding::Utf8Bom
        } else {
            CsvEncoding::Utf8
        }
    }

    fn report_format(&self) -> Result<ReportFormat, LabelError> {
        match self.report.as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(LabelError::UnsupportedReportFormat(format!(
                "'{}' (supported: text, json)",
                other
            ))),
        }
    }

    /// Checks that both the dataset and its image directory exist.
    fn image_dir(&self) -> Result<PathBuf, LabelError> {
        let image_dir = self.input_dir.join(&self.images);
        for dir in [&self.input_dir, &image_dir] {
            if !dir.is_dir() {
                return Err(LabelError::NotADirectory { path: dir.clone() });
            }
        }
        Ok(image_dir)
    }
}

/// Arguments for the label subcommand.
#[derive(clap::Args)]
struct LabelArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Output root; labels are written to <OUTPUT>/<input dir name>/label.csv.
    #[arg(short = 'o', long = "output", default_value = "result", env = "KEYLABEL_OUTPUT")]
    output: PathBuf,

    /// Number of images skipped by the jump keys.
    #[arg(long, default_value_t = display::DEFAULT_JUMP, env = "KEYLABEL_JUMP")]
    jump: usize,

    /// Ask for class names when the class name file is missing.
    #[arg(long)]
    bootstrap: bool,
}

/// Arguments for the split subcommand.
#[derive(clap::Args)]
struct SplitArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Output directory [default: <INPUT_DIR>/classes].
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReportFormat {
    Text,
    Json,
}

/// Run the keylabel CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), LabelError> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Label(args)) => run_label(args),
        Some(Commands::Split(args)) => run_split(args),
        None => {
            println!("keylabel {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Keyboard-driven image classification labeling.");
            println!();
            println!("Run 'keylabel --help' for usage information.");
            Ok(())
        }
    }
}

/// Logs go to stderr so they never mix with the session on stdout.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Execute the label subcommand.
fn run_label(args: LabelArgs) -> Result<(), LabelError> {
    let format = args.dataset.report_format()?;
    let image_dir = args.dataset.image_dir()?;
    let encoding = args.dataset.encoding();
    let input_dir = &args.dataset.input_dir;

    let taxonomy = load_taxonomy(&input_dir.join(&args.dataset.classes), encoding, args.bootstrap)?;

    let prepared = prepare::prepare_items(
        &image_dir,
        &input_dir.join(&args.dataset.labels),
        &taxonomy,
        encoding,
    )?;
    if !prepared.report.is_clean() {
        eprint!("{}", prepared.report);
    }

    let output_dir = args.output.join(dataset_name(input_dir)?);
    std::fs::create_dir_all(&output_dir).map_err(LabelError::Io)?;
    let save_path = output_dir.join(RESULT_FILE_NAME);

    let mut items = prepared.items;
    let mut display = TerminalDisplay::stdio(KeyMap::new(args.jump), &taxonomy);
    let config = SessionConfig {
        save_path: save_path.clone(),
        encoding,
    };
    let outcome = SessionController::new(&mut items, &taxonomy, config)?.run(&mut display, WINDOW_NAME)?;

    let summary = LabelSummary::new(&outcome, &taxonomy, &save_path);
    match format {
        ReportFormat::Text => {
            println!();
            print!("{}", summary);
        }
        ReportFormat::Json => println!("{}", to_json(&summary)?),
    }

    Ok(())
}

/// Execute the split subcommand.
fn run_split(args: SplitArgs) -> Result<(), LabelError> {
    let format = args.dataset.report_format()?;
    let image_dir = args.dataset.image_dir()?;
    let encoding = args.dataset.encoding();
    let input_dir = &args.dataset.input_dir;

    let taxonomy = taxonomy::read_class_names(&input_dir.join(&args.dataset.classes), encoding)?;

    let labels_path = input_dir.join(&args.dataset.labels);
    if !labels_path.is_file() {
        tracing::warn!("label csv not found: {}", labels_path.display());
    }
    let labels = store::read_label_csv(&labels_path, encoding)?;

    let output_dir = args
        .output
        .unwrap_or_else(|| input_dir.join("classes"));
    let report = split::split_images(&image_dir, &taxonomy, &labels, &output_dir)?;

    match format {
        ReportFormat::Text => print!("{}", report),
        ReportFormat::Json => println!("{}", to_json(&report)?),
    }

    Ok(())
}

/// Reads the class names, or asks for them when allowed and the file is missing.
fn load_taxonomy(path: &Path, encoding: CsvEncoding, bootstrap: bool) -> Result<ClassTaxonomy, LabelError> {
    match taxonomy::read_class_names(path, encoding) {
        Err(LabelError::ClassNamesNotFound { .. }) if bootstrap => {
            let taxonomy = taxonomy::bootstrap_class_names(&mut io::stdin().lock(), &mut io::stdout())?;
            taxonomy::write_class_names(path, &taxonomy, encoding)?;
            tracing::info!("saved {} class name(s) to {}", taxonomy.len(), path.display());
            Ok(taxonomy)
        }
        other => other,
    }
}

/// Name of the dataset directory, used to separate results per dataset.
fn dataset_name(input_dir: &Path) -> Result<PathBuf, LabelError> {
    let resolved = input_dir.canonicalize().map_err(LabelError::Io)?;
    Ok(resolved
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("dataset")))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, LabelError> {
    serde_json::to_string_pretty(value).map_err(|e| LabelError::Io(e.into()))
}
