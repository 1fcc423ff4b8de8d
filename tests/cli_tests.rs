//! Integration tests for the CLI application
//!
//! These tests verify that the CLI commands work correctly with real data files.

use kernmix::{KernelConfig, SerializableModel};
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

const COMBINED_KERNEL: &str = r#"{
    "type": "combined",
    "kernels": [
        { "weight": 1.0, "kernel": { "type": "linear" } },
        { "weight": 0.5, "kernel": { "type": "rbf", "gamma": 0.5 } }
    ]
}"#;

/// Helper to create test data files: two feature slots for training and test
struct TestDataFiles {
    pub train_coords: NamedTempFile,
    pub train_shape: NamedTempFile,
    pub test_coords: NamedTempFile,
    pub test_shape: NamedTempFile,
    pub kernel: NamedTempFile,
}

fn write_lines(lines: &[&str]) -> std::io::Result<NamedTempFile> {
    let mut file = NamedTempFile::with_suffix(".libsvm")?;
    for line in lines {
        writeln!(file, "{line}")?;
    }
    file.flush()?;
    Ok(file)
}

impl TestDataFiles {
    fn new() -> std::io::Result<Self> {
        let train_coords = write_lines(&[
            "+1 1:2.0 2:1.0",
            "-1 1:-2.0 2:-1.0",
            "+1 1:1.5 2:0.8",
            "-1 1:-1.5 2:-0.8",
        ])?;
        let train_shape = write_lines(&["+1 1:1.0", "-1 2:1.0", "+1 1:1.0", "-1 2:1.0"])?;

        let test_coords = write_lines(&["+1 1:1.6 2:0.7", "-1 1:-1.6 2:-0.7"])?;
        let test_shape = write_lines(&["+1 1:1.0", "-1 2:1.0"])?;

        let mut kernel = NamedTempFile::with_suffix(".json")?;
        write!(kernel, "{COMBINED_KERNEL}")?;
        kernel.flush()?;

        Ok(TestDataFiles {
            train_coords,
            train_shape,
            test_coords,
            test_shape,
            kernel,
        })
    }

    fn save_model(&self, dir: &TempDir) -> PathBuf {
        let config = KernelConfig::from_json_str(COMBINED_KERNEL).expect("Invalid config");
        let model = SerializableModel::new(config, vec![0, 1], vec![0.5, -0.5], 0.0)
            .expect("Failed to create model");
        let path = dir.path().join("model.json");
        model.save_to_file(&path).expect("Failed to save model");
        path
    }
}

/// Get the path to the compiled CLI binary
fn get_cli_binary_path() -> &'static str {
    env!("CARGO_BIN_EXE_kernmix")
}

fn path_str(file: &NamedTempFile) -> &str {
    file.path().to_str().unwrap()
}

#[test]
fn test_cli_classify_command() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let model_path = test_data.save_model(&temp_dir);

    let output = Command::new(get_cli_binary_path())
        .args([
            "classify",
            "--model",
            model_path.to_str().unwrap(),
            "--train",
            path_str(&test_data.train_coords),
            "--train",
            path_str(&test_data.train_shape),
            "--data",
            path_str(&test_data.test_coords),
            "--data",
            path_str(&test_data.test_shape),
        ])
        .output()
        .expect("Failed to run CLI classify command");

    assert!(
        output.status.success(),
        "Classify command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let rows: Vec<&str> = stdout.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with("0 1 "));
    assert!(rows[1].starts_with("1 -1 "));
}

#[test]
fn test_cli_classify_linadd_matches_exact() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let model_path = test_data.save_model(&temp_dir);

    let run = |linadd: bool, out: &PathBuf| {
        let mut args = vec![
            "classify".to_string(),
            "--model".to_string(),
            model_path.to_str().unwrap().to_string(),
            "--output".to_string(),
            out.to_str().unwrap().to_string(),
        ];
        for file in [&test_data.train_coords, &test_data.train_shape] {
            args.push("--train".to_string());
            args.push(path_str(file).to_string());
        }
        for file in [&test_data.test_coords, &test_data.test_shape] {
            args.push("--data".to_string());
            args.push(path_str(file).to_string());
        }
        if linadd {
            args.push("--linadd".to_string());
        }

        let output = Command::new(get_cli_binary_path())
            .args(&args)
            .output()
            .expect("Failed to run CLI classify command");
        assert!(
            output.status.success(),
            "Classify command failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        std::fs::read_to_string(out).expect("Failed to read predictions")
    };

    let exact = run(false, &temp_dir.path().join("exact.txt"));
    let linadd = run(true, &temp_dir.path().join("linadd.txt"));

    assert!(exact.contains("# Predictions for 2 samples"));
    assert_eq!(exact, linadd);
}

#[test]
fn test_cli_classify_slot_count_mismatch() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let model_path = test_data.save_model(&temp_dir);

    let output = Command::new(get_cli_binary_path())
        .args([
            "classify",
            "--model",
            model_path.to_str().unwrap(),
            "--train",
            path_str(&test_data.train_coords),
            "--data",
            path_str(&test_data.test_coords),
        ])
        .output()
        .expect("Failed to run CLI classify command");

    assert!(!output.status.success(), "Should fail with one slot");
}

#[test]
fn test_cli_matrix_command() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");

    let output = Command::new(get_cli_binary_path())
        .args([
            "matrix",
            "--kernel",
            path_str(&test_data.kernel),
            "--data",
            path_str(&test_data.test_coords),
            "--data",
            path_str(&test_data.test_shape),
        ])
        .output()
        .expect("Failed to run CLI matrix command");

    assert!(
        output.status.success(),
        "Matrix command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let rows: Vec<Vec<f64>> = stdout
        .lines()
        .map(|l| l.split_whitespace().map(|v| v.parse().unwrap()).collect())
        .collect();
    assert_eq!(rows.len(), 2);
    // 1.6^2 + 0.7^2 + 0.5 * exp(0)
    assert!((rows[0][0] - 3.55).abs() < 1e-6);
    assert!((rows[0][1] - rows[1][0]).abs() < 1e-9);
}

#[test]
fn test_cli_info_command() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let model_path = test_data.save_model(&temp_dir);

    let output = Command::new(get_cli_binary_path())
        .args(["info", model_path.to_str().unwrap()])
        .output()
        .expect("Failed to run CLI info command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Kernel Model Summary"));
    assert!(stdout.contains("Support Vectors: 2"));
    assert!(stdout.contains("combined [1*linear, 0.5*rbf (gamma=0.5)]"));
}

#[test]
fn test_cli_error_handling() {
    // Nonexistent model file
    let output = Command::new(get_cli_binary_path())
        .args(["info", "/nonexistent/model.json"])
        .output()
        .expect("Failed to run CLI info command");
    assert!(!output.status.success());

    // Missing required arguments
    let output = Command::new(get_cli_binary_path())
        .args(["classify"])
        .output()
        .expect("Failed to run CLI classify command");
    assert!(!output.status.success());
}

#[test]
fn test_cli_help_and_version() {
    let output = Command::new(get_cli_binary_path())
        .arg("--help")
        .output()
        .expect("Failed to run CLI help");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("classify"));
    assert!(stdout.contains("matrix"));

    let output = Command::new(get_cli_binary_path())
        .arg("--version")
        .output()
        .expect("Failed to run CLI version");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}
