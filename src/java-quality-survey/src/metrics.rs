//! Per-repository aggregation of CK class metrics.
//!
//! Each metric family is summarised independently from the values that
//! parse in that family's column. Families without a single valid value
//! are absent from the result rather than zero-filled.

mod row;

pub use row::{parse_metric, read_class_metrics, ClassMetricRow, MetricFamily};

use statrs::statistics::{Data, Median, Statistics};
use std::collections::BTreeMap;

/// Summary statistics of one metric family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FamilyStats {
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl FamilyStats {
    /// Computes the statistics of a non-empty slice.
    fn from_values(values: &[f64]) -> Self {
        Self {
            mean: Statistics::mean(values.iter()),
            median: Data::new(values.to_vec()).median(),
            std: Statistics::population_std_dev(values.iter()),
            min: Statistics::min(values.iter()),
            max: Statistics::max(values.iter()),
        }
    }
}

/// Mean and population standard deviation of a derived per-class score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreStats {
    pub mean: f64,
    pub std: f64,
}

impl ScoreStats {
    fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self {
            mean: Statistics::mean(values.iter()),
            std: Statistics::population_std_dev(values.iter()),
        })
    }
}

/// Aggregated metrics of one repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSummary {
    families: BTreeMap<MetricFamily, FamilyStats>,

    /// `wmc + cbo` per class.
    pub complexity: Option<ScoreStats>,

    /// `1 / (lcom + 1)` per class.
    pub cohesion: Option<ScoreStats>,

    /// Number of rows in the analyzer output, valid or not.
    pub total_classes: usize,
}

impl MetricsSummary {
    /// Statistics of one family, if it had any valid values.
    #[must_use]
    pub fn family(&self, family: MetricFamily) -> Option<&FamilyStats> {
        self.families.get(&family)
    }

    /// True when no family produced a single valid value.
    ///
    /// Callers treat this as "skip the repository".
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Flattened `field -> value` view, e.g. `cbo_mean`, `cohesion_std`,
    /// `total_classes`. Empty when [`is_empty`](Self::is_empty).
    #[must_use]
    pub fn fields(&self) -> Vec<(String, f64)> {
        if self.is_empty() {
            return Vec::new();
        }

        let mut fields = Vec::new();
        for (family, stats) in &self.families {
            let name = family.as_str();
            fields.push((format!("{name}_mean"), stats.mean));
            fields.push((format!("{name}_median"), stats.median));
            fields.push((format!("{name}_std"), stats.std));
            fields.push((format!("{name}_max"), stats.max));
            fields.push((format!("{name}_min"), stats.min));
        }
        for (name, score) in [("complexity", self.complexity), ("cohesion", self.cohesion)] {
            if let Some(score) = score {
                fields.push((format!("{name}_mean"), score.mean));
                fields.push((format!("{name}_std"), score.std));
            }
        }
        fields.push(("total_classes".to_string(), self.total_classes as f64));
        fields
    }
}

/// Aggregates CK rows into per-family statistics and derived scores.
#[must_use]
pub fn aggregate(rows: &[ClassMetricRow]) -> MetricsSummary {
    let mut values: BTreeMap<MetricFamily, Vec<f64>> = BTreeMap::new();
    for family in MetricFamily::ALL {
        let parsed: Vec<f64> = rows.iter().filter_map(|row| row.value(family)).collect();
        if !parsed.is_empty() {
            values.insert(family, parsed);
        }
    }

    let families = values
        .iter()
        .map(|(family, parsed)| (*family, FamilyStats::from_values(parsed)))
        .collect();

    let empty = Vec::new();
    let wmc = values.get(&MetricFamily::Wmc).unwrap_or(&empty);
    let cbo = values.get(&MetricFamily::Cbo).unwrap_or(&empty);
    let lcom = values.get(&MetricFamily::Lcom).unwrap_or(&empty);

    // Valid-value lists are zipped positionally, so a class with an invalid
    // WMC shifts the pairing. CK rarely emits partial rows.
    let complexity: Vec<f64> = wmc.iter().zip(cbo).map(|(w, c)| w + c).collect();
    let cohesion: Vec<f64> = lcom.iter().map(|l| 1.0 / (l + 1.0)).collect();

    MetricsSummary {
        families,
        complexity: ScoreStats::from_values(&complexity),
        cohesion: ScoreStats::from_values(&cohesion),
        total_classes: rows.len(),
    }
}
