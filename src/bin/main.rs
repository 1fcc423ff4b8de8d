//! kernmix Command Line Interface
//!
//! Evaluates saved kernel SVM models and kernel matrices over LibSVM data.
//! Passing `--train`/`--data` more than once builds one feature slot per file
//! for a combined kernel.

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use kernmix::{
    CombinedFeatures, Features, KernelConfig, KernelError, Labels, LibSVMDataset, Result,
    SerializableModel,
};
use log::{error, info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "kernmix")]
#[command(about = "Combined kernel evaluation for kernel machines")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify data with a saved model
    Classify(ClassifyArgs),
    /// Print the kernel matrix of a data set against itself
    Matrix(MatrixArgs),
    /// Display model information
    Info(InfoArgs),
}

#[derive(Args)]
struct ClassifyArgs {
    /// Saved model file
    #[arg(short, long)]
    model: PathBuf,

    /// Training data the support vector indices refer to, one file per feature slot
    #[arg(long, required = true)]
    train: Vec<PathBuf>,

    /// Data to classify, one file per feature slot
    #[arg(long, required = true)]
    data: Vec<PathBuf>,

    /// Evaluate through the LINADD fast path
    #[arg(long)]
    linadd: bool,

    /// Output predictions file (optional, prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show confidence scores
    #[arg(long)]
    confidence: bool,
}

#[derive(Args)]
struct MatrixArgs {
    /// Kernel configuration file (JSON)
    #[arg(short, long)]
    kernel: PathBuf,

    /// Data files, one per feature slot
    #[arg(long, required = true)]
    data: Vec<PathBuf>,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file
    model: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Classify(args) => classify_command(args),
        Commands::Matrix(args) => matrix_command(args),
        Commands::Info(args) => info_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

/// Load one feature object from `paths`, plus the labels of the first file
///
/// Combined kernels always get a `CombinedFeatures`, even for a single slot.
fn load_features(
    paths: &[PathBuf],
    config: &KernelConfig,
) -> Result<(Arc<dyn Features>, Labels)> {
    let combined = matches!(config, KernelConfig::Combined { .. });
    if !combined && paths.len() != 1 {
        return Err(KernelError::InvalidParameter(format!(
            "a {} kernel takes exactly one data file, got {}",
            config_name(config),
            paths.len()
        )));
    }
    if combined && paths.len() != config.num_slots() {
        return Err(KernelError::CountMismatch {
            kernels: config.num_slots(),
            left: paths.len(),
            right: paths.len(),
        });
    }

    if !combined {
        let (features, labels) = load_dataset(&paths[0])?.into_parts();
        let features: Arc<dyn Features> = Arc::new(features);
        return Ok((features, labels));
    }

    let mut features = CombinedFeatures::new();
    let mut labels = None;
    for path in paths {
        let (slot, slot_labels) = load_dataset(path)?.into_parts();
        if labels.is_none() {
            labels = Some(slot_labels);
        }
        features.append_feature_obj(Arc::new(slot))?;
    }

    let features: Arc<dyn Features> = Arc::new(features);
    Ok((features, labels.unwrap_or_else(|| Labels::new(0))))
}

fn load_dataset(path: &Path) -> Result<LibSVMDataset> {
    check_format(path);
    info!("Loading dataset from: {path:?}");
    let dataset = LibSVMDataset::from_file(path)?;
    info!(
        "Loaded {} vectors with {} dimensions",
        dataset.len(),
        dataset.dim()
    );
    Ok(dataset)
}

fn classify_command(args: ClassifyArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let model = SerializableModel::load_from_file(&args.model)?;

    let (train, _) = load_features(&args.train, &model.kernel)?;
    let (data, truth) = load_features(&args.data, &model.kernel)?;

    let mut svm = model.into_svm(train, data)?;
    svm.machine_mut().set_linadd_enabled(args.linadd);
    if args.linadd {
        info!(
            "Installing LINADD state for {} support vectors",
            svm.n_support_vectors()
        );
        match svm.init_kernel_optimization() {
            Err(KernelError::NotOptimizable(name)) => {
                warn!("{name} kernel has no LINADD support, using exact evaluation")
            }
            other => other?,
        }
    }

    let predictions = svm.predict()?;

    if truth.len() == predictions.len() {
        let correct = predictions
            .iter()
            .zip(truth.as_slice())
            .filter(|(pred, label)| pred.label == **label)
            .count();
        info!(
            "Accuracy: {:.2}% ({correct}/{})",
            100.0 * correct as f64 / predictions.len() as f64,
            predictions.len()
        );
    }

    let header = format!(
        "# Format: sample_index predicted_label decision_value{}",
        if args.confidence { " confidence" } else { "" }
    );

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };

    writeln!(writer, "# Predictions for {} samples", predictions.len())?;
    writeln!(writer, "{header}")?;
    for (i, pred) in predictions.iter().enumerate() {
        if args.confidence {
            writeln!(
                writer,
                "{} {:.0} {:.6} {:.6}",
                i,
                pred.label,
                pred.decision_value,
                pred.confidence()
            )?;
        } else {
            writeln!(writer, "{} {:.0} {:.6}", i, pred.label, pred.decision_value)?;
        }
    }
    writer.flush()?;

    if let Some(path) = &args.output {
        info!("Predictions saved to: {path:?}");
    }

    Ok(())
}

fn matrix_command(args: MatrixArgs) -> Result<()> {
    info!("Loading kernel configuration from: {:?}", args.kernel);
    let config = KernelConfig::from_file(&args.kernel)?;
    let (features, _) = load_features(&args.data, &config)?;

    let mut kernel = config.build()?;
    kernel.init(Arc::clone(&features), features, true)?;

    for row in kernel.kernel_matrix()? {
        let cells: Vec<String> = row.iter().map(|v| format!("{v:.6}")).collect();
        println!("{}", cells.join(" "));
    }

    Ok(())
}

fn info_command(args: InfoArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let model = SerializableModel::load_from_file(&args.model)?;

    model.print_summary();

    println!("\nSupport Vector Details:");
    println!("  Total: {}", model.support_vectors.len());
    let n_show = model.support_vectors.len().min(10);
    for (sv, alpha) in model.support_vectors.iter().zip(&model.alphas).take(n_show) {
        println!("  sv {sv}: alpha*y = {alpha:.6}");
    }
    if model.support_vectors.len() > n_show {
        println!("  ... ({} more)", model.support_vectors.len() - n_show);
    }

    Ok(())
}

fn config_name(config: &KernelConfig) -> &'static str {
    match config {
        KernelConfig::Linear { .. } => "linear",
        KernelConfig::Rbf { .. } => "rbf",
        KernelConfig::Polynomial { .. } => "polynomial",
        KernelConfig::Combined { .. } => "combined",
    }
}

/// Only LibSVM text is supported; anything else is read as LibSVM with a warning
fn check_format(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("libsvm") | Some("svm") | Some("txt") => true,
        Some(_) => {
            warn!("Unknown file extension, assuming LibSVM format");
            false
        }
        None => {
            warn!("No file extension, assuming LibSVM format");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert!(check_format(&PathBuf::from("test.libsvm")));
        assert!(check_format(&PathBuf::from("test.svm")));
        assert!(!check_format(&PathBuf::from("test.csv")));
        assert!(!check_format(&PathBuf::from("test")));
    }

    #[test]
    fn test_single_kernel_rejects_multiple_files() {
        let config = KernelConfig::Linear { cache_size: 0 };
        let paths = vec![PathBuf::from("a.libsvm"), PathBuf::from("b.libsvm")];
        assert!(matches!(
            load_features(&paths, &config),
            Err(KernelError::InvalidParameter(_))
        ));
    }
}
