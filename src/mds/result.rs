//! MDS result types and stress interpretation.

use super::dissimilarity::DissimilarityMatrix;
use crate::error::Result;
use crate::metric::Metric;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Qualitative reading of Kruskal stress-1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressQuality {
    /// stress < 0.05
    Excellent,
    /// stress < 0.10
    Good,
    /// stress < 0.20
    Fair,
    Poor,
}

impl StressQuality {
    /// One-line description for reports.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent representation",
            Self::Good => "good representation",
            Self::Fair => "fair representation, interpret with caution",
            Self::Poor => "poor representation, distances are distorted",
        }
    }
}

impl fmt::Display for StressQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        };
        f.write_str(label)
    }
}

/// Classify a Kruskal stress-1 value.
pub fn stress_interpretation(stress: f64) -> StressQuality {
    if stress < 0.05 {
        StressQuality::Excellent
    } else if stress < 0.10 {
        StressQuality::Good
    } else if stress < 0.20 {
        StressQuality::Fair
    } else {
        StressQuality::Poor
    }
}

/// One sample's position in the embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdsPoint {
    pub name: String,
    pub coordinates: Vec<f64>,
    /// Least dissimilar other sample in the input matrix.
    pub nearest_neighbor: Option<String>,
}

/// Outcome of one `mds` invocation.
///
/// Coordinates are determined only up to rotation, reflection and
/// translation; compare pairwise distances rather than raw values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdsResult {
    pub metric: Metric,
    /// Points in sample set order.
    pub points: Vec<MdsPoint>,
    /// Kruskal stress-1 of the final configuration.
    pub stress: f64,
    /// Raw stress `Σ_{i<j} (δ_ij - d_ij)²`.
    pub raw_stress: f64,
    pub iterations: usize,
    /// Stopped before the iteration budget (see [`SmacofOutcome::converged`]).
    ///
    /// [`SmacofOutcome::converged`]: crate::mds::smacof::SmacofOutcome::converged
    pub converged: bool,
    /// Dissimilarities the layout was fitted to.
    pub dissimilarity: DissimilarityMatrix,
}

impl MdsResult {
    /// Number of embedded samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Embedding dimensionality.
    pub fn dimensions(&self) -> usize {
        self.points.first().map_or(0, |p| p.coordinates.len())
    }

    /// Coordinates as an N×dims row list.
    pub fn coordinates(&self) -> Vec<Vec<f64>> {
        self.points.iter().map(|p| p.coordinates.clone()).collect()
    }

    /// Look up a point by sample name.
    pub fn point(&self, name: &str) -> Option<&MdsPoint> {
        self.points.iter().find(|p| p.name == name)
    }

    /// Euclidean distance between points `i` and `j` in the embedding.
    pub fn embedded_distance(&self, i: usize, j: usize) -> f64 {
        self.points[i]
            .coordinates
            .iter()
            .zip(&self.points[j].coordinates)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    pub fn quality(&self) -> StressQuality {
        stress_interpretation(self.stress)
    }

    /// Write coordinates as TSV (`sample`, `dim1`..`dimK`, `nearest_neighbor`).
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_tsv(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_tsv<W: Write>(&self, writer: &mut W) -> Result<()> {
        write!(writer, "sample")?;
        for k in 1..=self.dimensions() {
            write!(writer, "\tdim{}", k)?;
        }
        writeln!(writer, "\tnearest_neighbor")?;

        for point in &self.points {
            write!(writer, "{}", point.name)?;
            for value in &point.coordinates {
                write!(writer, "\t{:.6}", value)?;
            }
            writeln!(writer, "\t{}", point.nearest_neighbor.as_deref().unwrap_or("NA"))?;
        }
        Ok(())
    }
}

impl fmt::Display for MdsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MDS Summary ({} metric)", self.metric)?;
        writeln!(f, "{}", "=".repeat(40))?;
        writeln!(
            f,
            "Samples: {}  Dimensions: {}  Iterations: {}{}",
            self.len(),
            self.dimensions(),
            self.iterations,
            if self.converged { "" } else { " (not converged)" }
        )?;
        writeln!(
            f,
            "Stress: {:.4} ({}: {})",
            self.stress,
            self.quality(),
            self.quality().description()
        )?;
        writeln!(f)?;
        writeln!(f, "{:<20} {:<20} {:>10}", "Sample", "Nearest neighbor", "Distance")?;
        writeln!(f, "{}", "-".repeat(52))?;
        for (i, point) in self.points.iter().enumerate() {
            let (neighbor, distance) = match self.dissimilarity.nearest_neighbor(i) {
                Some(j) => (self.points[j].name.as_str(), self.dissimilarity.get(i, j)),
                None => ("NA", f64::NAN),
            };
            writeln!(f, "{:<20} {:<20} {:>10.4}", point.name, neighbor, distance)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stress_interpretation_thresholds() {
        assert_eq!(stress_interpretation(0.0), StressQuality::Excellent);
        assert_eq!(stress_interpretation(0.049), StressQuality::Excellent);
        assert_eq!(stress_interpretation(0.05), StressQuality::Good);
        assert_eq!(stress_interpretation(0.15), StressQuality::Fair);
        assert_eq!(stress_interpretation(0.20), StressQuality::Poor);
        assert_eq!(StressQuality::Fair.to_string(), "Fair");
    }
}
