#![allow(async_fn_in_trait)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db::PgStore;
use crate::models::{Dataset, PredictionResult};

pub trait DatasetStore {
    async fn stored_datasets(&self) -> anyhow::Result<Vec<Dataset>>;
    async fn save_dataset(&self, dataset: &Dataset) -> anyhow::Result<()>;
    async fn delete_dataset(&self, id: Uuid) -> anyhow::Result<bool>;

    async fn find_dataset(&self, id: Uuid) -> anyhow::Result<Option<Dataset>> {
        Ok(self
            .stored_datasets()
            .await?
            .into_iter()
            .find(|d| d.id == id))
    }
}

pub trait PredictionLog {
    async fn record_prediction(&self, result: &PredictionResult) -> anyhow::Result<()>;
    async fn prediction_history(&self, limit: usize) -> anyhow::Result<Vec<PredictionResult>>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreDocument {
    #[serde(default)]
    datasets: Vec<Dataset>,
    #[serde(default)]
    predictions: Vec<PredictionResult>,
}

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    history_limit: usize,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> anyhow::Result<StoreDocument> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("failed to decode store {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreDocument::default()),
            Err(e) => Err(e).with_context(|| format!("failed to read store {}", self.path.display())),
        }
    }

    async fn persist(&self, document: &StoreDocument) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec_pretty(document)?;
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, bytes)
            .await
            .with_context(|| format!("failed to write {}", staging.display()))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .with_context(|| format!("failed to replace store {}", self.path.display()))?;
        Ok(())
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        let document = self.load().await?;
        self.persist(&document).await
    }
}

impl DatasetStore for FileStore {
    async fn stored_datasets(&self) -> anyhow::Result<Vec<Dataset>> {
        Ok(self.load().await?.datasets)
    }

    async fn save_dataset(&self, dataset: &Dataset) -> anyhow::Result<()> {
        let mut document = self.load().await?;
        match document.datasets.iter_mut().find(|d| d.id == dataset.id) {
            Some(existing) => *existing = dataset.clone(),
            None => document.datasets.push(dataset.clone()),
        }
        self.persist(&document).await?;
        info!(dataset = %dataset.id, "saved dataset to {}", self.path.display());
        Ok(())
    }

    async fn delete_dataset(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut document = self.load().await?;
        let before = document.datasets.len();
        document.datasets.retain(|d| d.id != id);
        let removed = document.datasets.len() != before;
        if removed {
            self.persist(&document).await?;
            info!(dataset = %id, "deleted dataset");
        }
        Ok(removed)
    }
}

impl PredictionLog for FileStore {
    async fn record_prediction(&self, result: &PredictionResult) -> anyhow::Result<()> {
        let mut document = self.load().await?;
        document.predictions.push(result.clone());
        document.predictions.sort_by_key(|p| p.generated_at);
        let excess = document.predictions.len().saturating_sub(self.history_limit);
        document.predictions.drain(..excess);
        self.persist(&document).await
    }

    async fn prediction_history(&self, limit: usize) -> anyhow::Result<Vec<PredictionResult>> {
        let mut predictions = self.load().await?.predictions;
        predictions.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
        predictions.truncate(limit);
        Ok(predictions)
    }
}

pub enum Store {
    File(FileStore),
    Postgres(PgStore),
}

impl Store {
    pub async fn open(config: &AppConfig) -> anyhow::Result<Self> {
        match &config.database_url {
            Some(url) => Ok(Store::Postgres(PgStore::connect(url).await?)),
            None => Ok(Store::File(FileStore::new(&config.store_path))),
        }
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        match self {
            Store::File(store) => store.init().await,
            Store::Postgres(store) => store.init().await,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Store::File(store) => format!("file store {}", store.path().display()),
            Store::Postgres(_) => "postgres store".to_string(),
        }
    }
}

impl DatasetStore for Store {
    async fn stored_datasets(&self) -> anyhow::Result<Vec<Dataset>> {
        match self {
            Store::File(store) => store.stored_datasets().await,
            Store::Postgres(store) => store.stored_datasets().await,
        }
    }

    async fn save_dataset(&self, dataset: &Dataset) -> anyhow::Result<()> {
        match self {
            Store::File(store) => store.save_dataset(dataset).await,
            Store::Postgres(store) => store.save_dataset(dataset).await,
        }
    }

    async fn delete_dataset(&self, id: Uuid) -> anyhow::Result<bool> {
        match self {
            Store::File(store) => store.delete_dataset(id).await,
            Store::Postgres(store) => store.delete_dataset(id).await,
        }
    }

    async fn find_dataset(&self, id: Uuid) -> anyhow::Result<Option<Dataset>> {
        match self {
            Store::File(store) => store.find_dataset(id).await,
            Store::Postgres(store) => store.find_dataset(id).await,
        }
    }
}

impl PredictionLog for Store {
    async fn record_prediction(&self, result: &PredictionResult) -> anyhow::Result<()> {
        match self {
            Store::File(store) => store.record_prediction(result).await,
            Store::Postgres(store) => store.record_prediction(result).await,
        }
    }

    async fn prediction_history(&self, limit: usize) -> anyhow::Result<Vec<PredictionResult>> {
        match self {
            Store::File(store) => store.prediction_history(limit).await,
            Store::Postgres(store) => store.prediction_history(limit).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine;
    use crate::ingest::{build_dataset, NormalizedTable};
    use crate::models::{
        CurrentConditions, DatasetSource, DisasterType, FieldValue, PredictionInput, Record,
    };

    fn temp_store() -> FileStore {
        FileStore::new(std::env::temp_dir().join(format!("disaster-risk-{}.json", Uuid::new_v4())))
    }

    fn sample_dataset(name: &str) -> Dataset {
        build_dataset(
            name,
            DatasetSource::Csv,
            NormalizedTable {
                columns: vec!["location".to_string(), "rainfall".to_string()],
                records: vec![Record {
                    location: Some("Pune".to_string()),
                    rainfall: Some(FieldValue::Number(12.0)),
                    ..Record::default()
                }],
            },
        )
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let store = temp_store();
        assert!(store.stored_datasets().await.unwrap().is_empty());
        assert!(store.prediction_history(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_list_and_delete_datasets() {
        let store = temp_store();
        let first = sample_dataset("first");
        let second = sample_dataset("second");
        store.save_dataset(&first).await.unwrap();
        store.save_dataset(&second).await.unwrap();
        store.save_dataset(&first).await.unwrap();

        let stored = store.stored_datasets().await.unwrap();
        assert_eq!(stored.len(), 2);
        let found = store.find_dataset(second.id).await.unwrap().unwrap();
        assert_eq!(found.name, "second");
        assert_eq!(found.records, second.records);

        assert!(store.delete_dataset(first.id).await.unwrap());
        assert!(!store.delete_dataset(first.id).await.unwrap());
        assert_eq!(store.stored_datasets().await.unwrap().len(), 1);

        tokio::fs::remove_file(store.path()).await.unwrap();
    }

    #[tokio::test]
    async fn history_returns_most_recent_first() {
        let store = temp_store();
        let input = PredictionInput {
            disaster: DisasterType::Flood,
            location: "Pune".to_string(),
            conditions: CurrentConditions::default(),
        };
        let mut older = engine::fallback(&input, 0, 10);
        older.generated_at = older.generated_at - chrono::Duration::hours(1);
        let newer = engine::fallback(&input, 3, 10);
        store.record_prediction(&older).await.unwrap();
        store.record_prediction(&newer).await.unwrap();

        let history = store.prediction_history(1).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, newer.id);

        tokio::fs::remove_file(store.path()).await.unwrap();
    }

    #[tokio::test]
    async fn history_keeps_only_newest_predictions() {
        let store = temp_store().with_history_limit(3);
        let input = PredictionInput {
            disaster: DisasterType::Cyclone,
            location: "Chennai".to_string(),
            conditions: CurrentConditions::default(),
        };
        let mut ids = Vec::new();
        for minutes in 0..5 {
            let mut result = engine::fallback(&input, minutes, 10);
            result.generated_at = result.generated_at + chrono::Duration::minutes(minutes as i64);
            ids.push(result.id);
            store.record_prediction(&result).await.unwrap();
        }

        let history = store.prediction_history(10).await.unwrap();
        let kept: Vec<Uuid> = history.iter().map(|r| r.id).collect();
        assert_eq!(kept, vec![ids[4], ids[3], ids[2]]);

        tokio::fs::remove_file(store.path()).await.unwrap();
    }
}
