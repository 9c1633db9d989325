//! Raw rows of CK's `class.csv`.

use std::path::Path;

/// The six CK metric families summarised per repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricFamily {
    Wmc,
    Rfc,
    Cbo,
    Dit,
    Lcom,
    Noc,
}

impl MetricFamily {
    /// All families, in interchange column order.
    pub const ALL: [MetricFamily; 6] = [
        MetricFamily::Wmc,
        MetricFamily::Rfc,
        MetricFamily::Cbo,
        MetricFamily::Dit,
        MetricFamily::Lcom,
        MetricFamily::Noc,
    ];

    /// Column name in CK output and prefix in the interchange file.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wmc => "wmc",
            Self::Rfc => "rfc",
            Self::Cbo => "cbo",
            Self::Dit => "dit",
            Self::Lcom => "lcom",
            Self::Noc => "noc",
        }
    }
}

/// One analyzed class. Values stay as text until aggregation.
///
/// Other CK columns (`file`, `class`, `fanin`, ...) are ignored.
#[derive(Debug, Clone, Default)]
pub struct ClassMetricRow {
    pub cbo: String,
    pub dit: String,
    pub lcom: String,
    pub wmc: String,
    pub rfc: String,
    pub noc: String,
}

impl ClassMetricRow {
    /// Raw text of one family's column.
    #[must_use]
    pub fn raw(&self, family: MetricFamily) -> &str {
        match family {
            MetricFamily::Wmc => &self.wmc,
            MetricFamily::Rfc => &self.rfc,
            MetricFamily::Cbo => &self.cbo,
            MetricFamily::Dit => &self.dit,
            MetricFamily::Lcom => &self.lcom,
            MetricFamily::Noc => &self.noc,
        }
    }

    fn raw_mut(&mut self, family: MetricFamily) -> &mut String {
        match family {
            MetricFamily::Wmc => &mut self.wmc,
            MetricFamily::Rfc => &mut self.rfc,
            MetricFamily::Cbo => &mut self.cbo,
            MetricFamily::Dit => &mut self.dit,
            MetricFamily::Lcom => &mut self.lcom,
            MetricFamily::Noc => &mut self.noc,
        }
    }

    /// Parsed value of one family, if it is a non-negative decimal.
    #[must_use]
    pub fn value(&self, family: MetricFamily) -> Option<f64> {
        parse_metric(self.raw(family))
    }
}

/// Parses a metric cell.
///
/// Accepts digits with at most one decimal point. Signs, exponents, `NaN`
/// and blanks are rejected, so CK's `-1` placeholders never reach the
/// statistics.
#[must_use]
pub fn parse_metric(raw: &str) -> Option<f64> {
    let digits = raw.replacen('.', "", 1);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Reads every row of a CK `class.csv`.
///
/// Rows with missing or extra fields are kept: absent metric columns read
/// as blank and trailing extras are ignored.
///
/// # Errors
///
/// Returns a [`csv::Error`] if the file cannot be opened or is not valid
/// CSV.
pub fn read_class_metrics(path: &Path) -> Result<Vec<ClassMetricRow>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let columns: Vec<(MetricFamily, usize)> = MetricFamily::ALL
        .into_iter()
        .filter_map(|family| {
            let index = headers.iter().position(|h| h == family.as_str())?;
            Some((family, index))
        })
        .collect();

    reader
        .records()
        .map(|record| {
            let record = record?;
            let mut row = ClassMetricRow::default();
            for &(family, index) in &columns {
                if let Some(cell) = record.get(index) {
                    *row.raw_mut(family) = cell.to_string();
                }
            }
            Ok(row)
        })
        .collect()
}
