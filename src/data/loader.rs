//! Загрузка исходной таблицы из CSV

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::error::{PipelineError, Result};

/// Маркеры пропусков, которые встречаются в выгрузках опроса
const NA_MARKERS: [&str; 8] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Таблица исходных записей: заголовок и строки с необязательными ячейками.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| PipelineError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Новая таблица из строк с заданными индексами (в заданном порядке)
    pub fn take_rows(&self, indices: &[usize]) -> RawTable {
        RawTable {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
    }
}

pub fn is_missing(raw: &str) -> bool {
    NA_MARKERS.contains(&raw)
}

#[instrument(fields(path = %path.display()))]
pub fn read_csv(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).map_err(|e| PipelineError::DatasetNotFound {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let columns: Vec<String> = rdr
        .headers()
        .map_err(|e| PipelineError::CsvParse {
            path: path.to_path_buf(),
            source: e,
        })?
        .iter()
        .map(|h| h.to_string())
        .collect();
    debug!(n_columns = columns.len(), "read CSV header");

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| PipelineError::CsvParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        let row: Vec<Option<String>> = record
            .iter()
            .map(|cell| {
                if is_missing(cell) {
                    None
                } else {
                    Some(cell.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    info!(rows = rows.len(), columns = columns.len(), "dataset loaded");
    Ok(RawTable::new(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_cells_and_missing_markers() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("df.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "A,B,C").unwrap();
        writeln!(f, "1, x ,").unwrap();
        writeln!(f, "NA,y,2.5").unwrap();
        drop(f);

        let table = read_csv(&path).unwrap();
        assert_eq!(table.columns, vec!["A", "B", "C"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 1), Some("x"));
        assert_eq!(table.cell(0, 2), None);
        assert_eq!(table.cell(1, 0), None);
        assert_eq!(table.cell(1, 2), Some("2.5"));
    }

    #[test]
    fn missing_file_is_dataset_not_found() {
        let err = read_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::DatasetNotFound { .. }));
    }

    #[test]
    fn unknown_column_is_reported() {
        let table = RawTable::new(vec!["A".into()], vec![]);
        let err = table.column_index("B").unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { column } if column == "B"));
    }
}
