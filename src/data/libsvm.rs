//! LibSVM format loader
//!
//! Supports loading datasets in the libsvm format:
//! label index:value index:value ...
//!
//! Example:
//! +1 1:0.5 3:1.2 7:0.8
//! -1 2:0.3 5:2.1

use crate::core::{KernelError, Labels, Result, SparseVector};
use crate::features::SparseFeatures;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Vectors and labels read from a LibSVM format file
#[derive(Debug, Clone)]
pub struct LibSVMDataset {
    vectors: Vec<SparseVector>,
    labels: Vec<f64>,
    dimensions: usize,
}

impl LibSVMDataset {
    /// Load a dataset from a LibSVM format file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(KernelError::IoError)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Load a dataset from a reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut vectors = Vec::new();
        let mut labels = Vec::new();
        let mut max_dimension = 0;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(KernelError::IoError)?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match Self::parse_line(line) {
                Ok((label, vector)) => {
                    max_dimension = max_dimension.max(vector.dimension());
                    labels.push(label);
                    vectors.push(vector);
                }
                Err(e) => {
                    return Err(KernelError::ParseError(format!(
                        "Error parsing line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }

        if vectors.is_empty() {
            return Err(KernelError::EmptyDataset);
        }

        Ok(LibSVMDataset {
            vectors,
            labels,
            dimensions: max_dimension,
        })
    }

    /// Parse a single line in libsvm format
    fn parse_line(line: &str) -> Result<(f64, SparseVector)> {
        let mut parts = line.split_whitespace();

        let label_str = parts
            .next()
            .ok_or_else(|| KernelError::ParseError("Empty line".to_string()))?;
        let label = label_str
            .parse::<f64>()
            .map_err(|_| KernelError::ParseError(format!("Invalid label: {}", label_str)))?;

        // Binary labels only
        let label = if label > 0.0 { 1.0 } else { -1.0 };

        let mut indices = Vec::new();
        let mut values = Vec::new();

        for feature_str in parts {
            let (index_str, value_str) = feature_str.split_once(':').ok_or_else(|| {
                KernelError::ParseError(format!("Invalid feature format: {}", feature_str))
            })?;

            let index = index_str.parse::<usize>().map_err(|_| {
                KernelError::ParseError(format!("Invalid feature index: {}", index_str))
            })?;

            let value = value_str.parse::<f64>().map_err(|_| {
                KernelError::ParseError(format!("Invalid feature value: {}", value_str))
            })?;

            // libsvm uses 1-based indexing, convert to 0-based
            if index == 0 {
                return Err(KernelError::ParseError(format!(
                    "Feature index must be positive: {}",
                    index
                )));
            }

            indices.push(index - 1);
            values.push(value);
        }

        Ok((label, SparseVector::new(indices, values)))
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Largest feature index + 1
    pub fn dim(&self) -> usize {
        self.dimensions
    }

    pub fn vectors(&self) -> &[SparseVector] {
        &self.vectors
    }

    pub fn labels(&self) -> Labels {
        Labels::from_values(self.labels.clone())
    }

    /// Feature object over the loaded vectors, dropping the labels
    pub fn into_features(self) -> SparseFeatures {
        SparseFeatures::new(self.vectors)
    }

    /// Split into feature object and labels
    pub fn into_parts(self) -> (SparseFeatures, Labels) {
        (
            SparseFeatures::new(self.vectors),
            Labels::from_values(self.labels),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Features;
    use std::io::Cursor;

    #[test]
    fn test_parse_line_basic() {
        let (label, vector) = LibSVMDataset::parse_line("+1 1:0.5 3:1.2").unwrap();

        assert_eq!(label, 1.0);
        assert_eq!(vector.indices, vec![0, 2]); // 1-based to 0-based
        assert_eq!(vector.values, vec![0.5, 1.2]);
    }

    #[test]
    fn test_parse_line_binary_conversion() {
        let (label, _) = LibSVMDataset::parse_line("2 1:1.0").unwrap();
        assert_eq!(label, 1.0);

        let (label, _) = LibSVMDataset::parse_line("-3 1:1.0").unwrap();
        assert_eq!(label, -1.0);
    }

    #[test]
    fn test_parse_line_label_only() {
        let (label, vector) = LibSVMDataset::parse_line("-1").unwrap();
        assert_eq!(label, -1.0);
        assert!(vector.is_empty());
    }

    #[test]
    fn test_parse_line_invalid_format() {
        assert!(LibSVMDataset::parse_line("+1 1").is_err());
        assert!(LibSVMDataset::parse_line("+1 abc:1.0").is_err());
        assert!(LibSVMDataset::parse_line("+1 1:abc").is_err());
        assert!(LibSVMDataset::parse_line("x 1:1.0").is_err());

        // Zero index (libsvm is 1-based)
        assert!(LibSVMDataset::parse_line("+1 0:1.0").is_err());
    }

    #[test]
    fn test_from_reader_basic() {
        let data = "+1 1:0.5 3:1.2\n-1 2:0.3 5:2.1\n";
        let dataset = LibSVMDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.dim(), 5);
        assert_eq!(dataset.vectors()[1].indices, vec![1, 4]);
        assert_eq!(dataset.labels().as_slice(), &[1.0, -1.0]);
    }

    #[test]
    fn test_from_reader_empty_lines_and_comments() {
        let data = "# Comment line\n+1 1:0.5\n\n# Another comment\n-1 2:0.3\n";
        let dataset = LibSVMDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.labels().as_slice(), &[1.0, -1.0]);
    }

    #[test]
    fn test_from_reader_reports_line_number() {
        let data = "+1 1:0.5\n-1 2:oops\n";
        match LibSVMDataset::from_reader(Cursor::new(data)) {
            Err(KernelError::ParseError(msg)) => assert!(msg.contains("line 2")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_reader_empty_dataset() {
        let result = LibSVMDataset::from_reader(Cursor::new("# Only comments\n\n"));
        assert!(matches!(result, Err(KernelError::EmptyDataset)));
    }

    #[test]
    fn test_into_parts() {
        let data = "+1 1:1.0 1000:2.0\n-1 2:1.0\n";
        let dataset = LibSVMDataset::from_reader(Cursor::new(data)).unwrap();

        let (features, labels) = dataset.into_parts();
        assert_eq!(features.num_vectors(), 2);
        assert_eq!(features.dimension(), 1000);
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "+1 1:0.5 3:1.2").expect("Failed to write");
        writeln!(temp_file, "-1 2:0.3 5:2.1").expect("Failed to write");
        temp_file.flush().expect("Failed to flush");

        let features = LibSVMDataset::from_file(temp_file.path())
            .unwrap()
            .into_features();
        assert_eq!(features.num_vectors(), 2);
        assert_eq!(features.dimension(), 5);
    }

    #[test]
    fn test_from_file_io_error() {
        let result = LibSVMDataset::from_file("/non/existent/file.libsvm");
        assert!(matches!(result, Err(KernelError::IoError(_))));
    }
}
