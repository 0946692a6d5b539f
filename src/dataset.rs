//! Static table of recorded positions, loaded once at startup.

use crate::error::StartupError;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::BufReader,
    path::Path,
};

/// Columns the dataset must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 4] = ["latitude", "longitude", "date", "time"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub latitude: f64,
    pub longitude: f64,
    pub date: String,
    pub time: String,
}

impl DatasetRow {
    /// `"{date} {time}"`, as shown by the front end.
    pub fn timestamp(&self) -> String {
        format!("{} {}", self.date, self.time)
    }
}

/// Read-only after construction. Row identity is the index.
#[derive(Debug, Clone)]
pub struct Dataset {
    rows: Vec<DatasetRow>,
}

impl Dataset {
    pub fn from_rows(rows: Vec<DatasetRow>) -> Self {
        Self { rows }
    }

    /// Load and validate the CSV at `path`. Any problem is reported here
    /// rather than on first use.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StartupError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| StartupError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), path)
    }

    fn from_reader<R: std::io::Read>(reader: R, path: &Path) -> Result<Self, StartupError> {
        let csv_err = |source| StartupError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers().map_err(csv_err)?.clone();
        let mut idx = [0usize; 4];
        for (slot, column) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| StartupError::MissingColumn {
                    path: path.to_path_buf(),
                    column,
                })?;
        }
        let [lat_i, lon_i, date_i, time_i] = idx;

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result.map_err(csv_err)?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let invalid = |reason: String| StartupError::InvalidRow {
                path: path.to_path_buf(),
                line,
                reason,
            };
            let field = |i: usize, name: &str| {
                record
                    .get(i)
                    .ok_or_else(|| invalid(format!("missing {}", name)))
            };
            let coord = |i: usize, name: &str| -> Result<f64, StartupError> {
                let raw = field(i, name)?;
                raw.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| invalid(format!("invalid {} `{}`", name, raw)))
            };

            rows.push(DatasetRow {
                latitude: coord(lat_i, "latitude")?,
                longitude: coord(lon_i, "longitude")?,
                date: field(date_i, "date")?.to_string(),
                time: field(time_i, "time")?.to_string(),
            });
        }

        if rows.is_empty() {
            return Err(StartupError::EmptyDataset {
                path: path.to_path_buf(),
            });
        }

        tracing::info!("loaded {} rows from {}", rows.len(), path.display());
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&DatasetRow> {
        self.rows.get(index)
    }

    /// Whether some row has exactly this latitude/longitude pair.
    pub fn contains_position(&self, latitude: f64, longitude: f64) -> bool {
        self.rows
            .iter()
            .any(|r| r.latitude == latitude && r.longitude == longitude)
    }
}
