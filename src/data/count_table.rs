//! Dense count table loaded from TSV/CSV: one row per sample, one column per category.

use super::CategoryVector;
use crate::error::{MixError, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Raw category counts for a set of samples.
///
/// Rows are samples (e.g. sampling locations), columns are categories
/// (e.g. particle types).
#[derive(Debug, Clone, PartialEq)]
pub struct CountTable {
    /// Header of the sample-name column (e.g. "location").
    id_header: String,
    sample_ids: Vec<String>,
    categories: Vec<String>,
    /// Row-major counts (samples × categories).
    counts: Vec<Vec<f64>>,
}

impl CountTable {
    /// Create a table from identifiers and row-major counts.
    pub fn new(
        sample_ids: Vec<String>,
        categories: Vec<String>,
        counts: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if sample_ids.len() != counts.len() {
            return Err(MixError::InvalidInput(format!(
                "{} sample ids but {} count rows",
                sample_ids.len(),
                counts.len()
            )));
        }
        let mut seen = HashSet::new();
        for category in &categories {
            if !seen.insert(category.as_str()) {
                return Err(MixError::InvalidInput(format!(
                    "duplicate category column '{}'",
                    category
                )));
            }
        }
        for (row, values) in counts.iter().enumerate() {
            if values.len() != categories.len() {
                return Err(MixError::InvalidInput(format!(
                    "row '{}' has {} values, expected {}",
                    sample_ids[row],
                    values.len(),
                    categories.len()
                )));
            }
            for (col, &value) in values.iter().enumerate() {
                if !value.is_finite() || value < 0.0 {
                    return Err(MixError::InvalidCount {
                        value: value.to_string(),
                        row,
                        col,
                    });
                }
            }
        }
        Ok(Self {
            id_header: "sample".to_string(),
            sample_ids,
            categories,
            counts,
        })
    }

    /// Load a table from a file; `.csv` is comma-delimited, anything else tab-delimited.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
            _ => b'\t',
        };
        let file = File::open(path)?;
        Self::from_reader(file, delimiter)
    }

    /// Load a table from any reader.
    ///
    /// Expected format:
    /// - First row: header; first column names the sample column, the rest are categories
    /// - Subsequent rows: sample name followed by counts (empty cells count as zero)
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let header = rdr.headers()?.clone();
        if header.len() < 2 {
            return Err(MixError::EmptyData(
                "table must have a sample column and at least one category".to_string(),
            ));
        }
        let id_header = header[0].to_string();
        let categories: Vec<String> = header.iter().skip(1).map(|s| s.to_string()).collect();

        let mut sample_ids = Vec::new();
        let mut counts = Vec::new();
        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }
            sample_ids.push(record.get(0).unwrap_or_default().to_string());

            let mut values = Vec::with_capacity(categories.len());
            for col in 0..categories.len() {
                let raw = record.get(col + 1).unwrap_or_default();
                let value = if raw.is_empty() {
                    0.0
                } else {
                    raw.parse::<f64>().map_err(|_| MixError::InvalidCount {
                        value: raw.to_string(),
                        row,
                        col,
                    })?
                };
                values.push(value);
            }
            counts.push(values);
        }

        if sample_ids.is_empty() {
            return Err(MixError::EmptyData("no samples in table".to_string()));
        }

        let mut table = Self::new(sample_ids, categories, counts)?;
        table.id_header = id_header;
        Ok(table)
    }

    /// Write the table as TSV.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        write!(writer, "{}", self.id_header)?;
        for category in &self.categories {
            write!(writer, "\t{}", category)?;
        }
        writeln!(writer)?;

        for (sample_id, row) in self.sample_ids.iter().zip(&self.counts) {
            write!(writer, "{}", sample_id)?;
            for value in row {
                write!(writer, "\t{}", value)?;
            }
            writeln!(writer)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Count at (sample, category).
    #[inline]
    pub fn get(&self, sample: usize, category: usize) -> f64 {
        self.counts[sample][category]
    }

    /// Number of samples (rows).
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// Number of categories (columns).
    #[inline]
    pub fn n_categories(&self) -> usize {
        self.categories.len()
    }

    /// Sample identifiers.
    #[inline]
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Category names in column order.
    #[inline]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Counts for one sample.
    pub fn row(&self, sample: usize) -> &[f64] {
        &self.counts[sample]
    }

    /// Total count per sample.
    pub fn row_sums(&self) -> Vec<f64> {
        self.counts.iter().map(|r| r.iter().sum()).collect()
    }

    /// One sample's counts as a [`CategoryVector`].
    pub fn category_vector(&self, sample: usize) -> Result<CategoryVector> {
        CategoryVector::from_pairs(
            self.sample_ids[sample].clone(),
            self.categories
                .iter()
                .cloned()
                .zip(self.counts[sample].iter().copied()),
        )
    }

    /// All samples as [`CategoryVector`]s, in row order.
    pub fn to_category_vectors(&self) -> Result<Vec<CategoryVector>> {
        (0..self.n_samples()).map(|i| self.category_vector(i)).collect()
    }
}
