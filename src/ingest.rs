use std::path::Path;

use chrono::Utc;
use csv::{ReaderBuilder, Trim};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ImportLimits;
use crate::error::{EngineError, Result};
use crate::models::{Dataset, DatasetSource, Factor, FieldValue, Record};
use crate::summary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    Location,
    Measure(Factor),
}

impl Column {
    pub fn name(&self) -> &'static str {
        match self {
            Column::Date => "date",
            Column::Location => "location",
            Column::Measure(factor) => factor.as_str(),
        }
    }
}

/// Header synonyms, matched after trimming and lowercasing.
const HEADER_SYNONYMS: &[(&str, Column)] = &[
    ("date", Column::Date),
    ("datetime", Column::Date),
    ("timestamp", Column::Date),
    ("time", Column::Date),
    ("day", Column::Date),
    ("observation_date", Column::Date),
    ("location", Column::Location),
    ("city", Column::Location),
    ("place", Column::Location),
    ("region", Column::Location),
    ("station", Column::Location),
    ("area", Column::Location),
    ("site", Column::Location),
    ("temperature", Column::Measure(Factor::Temperature)),
    ("temp", Column::Measure(Factor::Temperature)),
    ("temp_c", Column::Measure(Factor::Temperature)),
    ("temperature_c", Column::Measure(Factor::Temperature)),
    ("air_temperature", Column::Measure(Factor::Temperature)),
    ("humidity", Column::Measure(Factor::Humidity)),
    ("hum", Column::Measure(Factor::Humidity)),
    ("rh", Column::Measure(Factor::Humidity)),
    ("relative_humidity", Column::Measure(Factor::Humidity)),
    ("humidity_pct", Column::Measure(Factor::Humidity)),
    ("pressure", Column::Measure(Factor::Pressure)),
    ("pres", Column::Measure(Factor::Pressure)),
    ("pressure_hpa", Column::Measure(Factor::Pressure)),
    ("sea_level_pressure", Column::Measure(Factor::Pressure)),
    ("windspeed", Column::Measure(Factor::WindSpeed)),
    ("wind_speed", Column::Measure(Factor::WindSpeed)),
    ("wind", Column::Measure(Factor::WindSpeed)),
    ("wind_kmh", Column::Measure(Factor::WindSpeed)),
    ("wind_kph", Column::Measure(Factor::WindSpeed)),
    ("rainfall", Column::Measure(Factor::Rainfall)),
    ("rain", Column::Measure(Factor::Rainfall)),
    ("precip", Column::Measure(Factor::Rainfall)),
    ("precipitation", Column::Measure(Factor::Rainfall)),
    ("rainfall_mm", Column::Measure(Factor::Rainfall)),
    ("precip_mm", Column::Measure(Factor::Rainfall)),
];

pub fn map_header(raw: &str) -> Option<Column> {
    let key = raw.trim().to_lowercase().replace(' ', "_");
    HEADER_SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == key)
        .map(|(_, column)| *column)
}

#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

pub fn read_csv(text: &str) -> Result<RawTable> {
    let text = text.trim_start_matches('\u{feff}');
    let non_blank = text.lines().filter(|line| !line.trim().is_empty()).count();
    if non_blank < 2 {
        return Err(EngineError::Parse(
            "CSV must contain a header row and at least one data row".to_string(),
        ));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(text.as_bytes());

    let mut rows = reader
        .records()
        .map(|row| row.map(|r| r.iter().map(str::to_string).collect::<Vec<String>>()))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if rows.is_empty() {
        return Err(EngineError::Parse("CSV has no header row".to_string()));
    }
    let headers = rows.remove(0);
    Ok(RawTable { headers, rows })
}

pub fn normalize(table: &RawTable) -> NormalizedTable {
    let mapping: Vec<Option<Column>> = table.headers.iter().map(|h| map_header(h)).collect();

    let mut columns: Vec<String> = Vec::new();
    for column in mapping.iter().flatten() {
        let name = column.name().to_string();
        if !columns.contains(&name) {
            columns.push(name);
        }
    }

    let mut records = Vec::with_capacity(table.rows.len());
    let mut rejected = 0usize;
    for row in table.rows.iter() {
        if row.len() != table.headers.len() {
            rejected += 1;
            continue;
        }

        let mut record = Record::default();
        for (cell, column) in row.iter().zip(mapping.iter()) {
            let Some(column) = column else { continue };
            match column {
                Column::Date if !cell.is_empty() => record.date = Some(cell.clone()),
                Column::Location if !cell.is_empty() => record.location = Some(cell.clone()),
                Column::Measure(factor) if !cell.trim().is_empty() => {
                    *record.field_mut(*factor) = Some(FieldValue::parse(cell))
                }
                _ => {}
            }
        }

        if !record.is_empty() {
            records.push(record);
        }
    }

    if rejected > 0 {
        warn!(rejected, "dropped rows with mismatched cell counts");
    }
    debug!(records = records.len(), columns = ?columns, "normalized table");

    NormalizedTable { columns, records }
}

pub trait DocumentExtractor {
    fn extract_table(&self, bytes: &[u8]) -> Result<RawTable>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableExtractor;

impl DocumentExtractor for UnavailableExtractor {
    fn extract_table(&self, _bytes: &[u8]) -> Result<RawTable> {
        Err(EngineError::DocumentExtraction(
            "no document table extractor is configured; export the table as CSV".to_string(),
        ))
    }
}

pub fn validate_upload(file_name: &str, size: u64, limits: &ImportLimits) -> Result<DatasetSource> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let source = match extension.as_deref() {
        Some("csv") => DatasetSource::Csv,
        Some("pdf") => DatasetSource::Document,
        _ => {
            return Err(EngineError::InvalidFile {
                reason: format!("{file_name}: only .csv and .pdf files are supported"),
            })
        }
    };

    if size == 0 {
        return Err(EngineError::InvalidFile {
            reason: format!("{file_name}: file is empty"),
        });
    }
    if size > limits.max_bytes {
        return Err(EngineError::InvalidFile {
            reason: format!(
                "{file_name}: {size} bytes exceeds the {} byte upload limit",
                limits.max_bytes
            ),
        });
    }

    Ok(source)
}

pub fn dataset_from_bytes(
    name: &str,
    source: DatasetSource,
    bytes: &[u8],
    extractor: &dyn DocumentExtractor,
) -> Result<Dataset> {
    let table = match source {
        DatasetSource::Csv => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| EngineError::Parse(format!("CSV is not valid UTF-8: {e}")))?;
            read_csv(text)?
        }
        DatasetSource::Document => extractor.extract_table(bytes)?,
    };

    let normalized = normalize(&table);
    if normalized.records.is_empty() {
        return Err(EngineError::Parse(format!(
            "{name}: no rows matched the expected columns"
        )));
    }

    Ok(build_dataset(name, source, normalized))
}

pub fn build_dataset(name: &str, source: DatasetSource, table: NormalizedTable) -> Dataset {
    let summary = summary::summarize(&table.records);
    Dataset {
        id: Uuid::new_v4(),
        name: name.to_string(),
        source,
        uploaded_at: Utc::now(),
        columns: table.columns,
        records: table.records,
        summary,
    }
}

pub async fn import_file(
    path: &Path,
    name: Option<&str>,
    limits: &ImportLimits,
    extractor: &dyn DocumentExtractor,
) -> Result<Dataset> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| EngineError::InvalidFile {
            reason: format!("{}: {e}", path.display()),
        })?;
    let source = validate_upload(&file_name, metadata.len(), limits)?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| EngineError::InvalidFile {
            reason: format!("{}: {e}", path.display()),
        })?;
    let dataset = dataset_from_bytes(name.unwrap_or(&file_name), source, &bytes, extractor)?;
    info!(
        dataset = %dataset.id,
        records = dataset.records.len(),
        "imported {}",
        file_name
    );
    Ok(dataset)
}
