use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::{Dataset, DatasetSource, PredictionResult, Record, Summary};
use crate::store::{DatasetStore, PredictionLog};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("failed to connect to Postgres")?;
        Ok(Self { pool })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn dataset_from_row(row: &PgRow) -> anyhow::Result<Dataset> {
    let source: String = row.try_get("source")?;
    let columns: Json<Vec<String>> = row.try_get("columns")?;
    let records: Json<Vec<Record>> = row.try_get("records")?;
    let summary: Json<Summary> = row.try_get("summary")?;
    let uploaded_at: DateTime<Utc> = row.try_get("uploaded_at")?;

    Ok(Dataset {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        source: source.parse::<DatasetSource>().map_err(anyhow::Error::msg)?,
        uploaded_at,
        columns: columns.0,
        records: records.0,
        summary: summary.0,
    })
}

impl DatasetStore for PgStore {
    async fn stored_datasets(&self) -> anyhow::Result<Vec<Dataset>> {
        let rows = sqlx::query(
            "SELECT id, name, source, uploaded_at, columns, records, summary \
             FROM disaster_risk.datasets ORDER BY uploaded_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(dataset_from_row).collect()
    }

    async fn save_dataset(&self, dataset: &Dataset) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO disaster_risk.datasets
            (id, name, source, uploaded_at, columns, records, summary)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, columns = EXCLUDED.columns,
                records = EXCLUDED.records, summary = EXCLUDED.summary
            "#,
        )
        .bind(dataset.id)
        .bind(&dataset.name)
        .bind(dataset.source.as_str())
        .bind(dataset.uploaded_at)
        .bind(Json(&dataset.columns))
        .bind(Json(&dataset.records))
        .bind(Json(&dataset.summary))
        .execute(&self.pool)
        .await?;

        info!(dataset = %dataset.id, records = dataset.records.len(), "saved dataset to Postgres");
        Ok(())
    }

    async fn delete_dataset(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM disaster_risk.datasets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_dataset(&self, id: Uuid) -> anyhow::Result<Option<Dataset>> {
        let row = sqlx::query(
            "SELECT id, name, source, uploaded_at, columns, records, summary \
             FROM disaster_risk.datasets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(dataset_from_row).transpose()
    }
}

impl PredictionLog for PgStore {
    async fn record_prediction(&self, result: &PredictionResult) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO disaster_risk.predictions
            (id, disaster, location, source, risk_score, result, generated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(result.id)
        .bind(result.disaster.as_str())
        .bind(&result.location)
        .bind(result.source.as_str())
        .bind(result.risk_score as i16)
        .bind(Json(result))
        .bind(result.generated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn prediction_history(&self, limit: usize) -> anyhow::Result<Vec<PredictionResult>> {
        let rows = sqlx::query(
            "SELECT result FROM disaster_risk.predictions ORDER BY generated_at DESC LIMIT $1",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        let mut history = Vec::with_capacity(rows.len());
        for row in rows {
            let result: Json<PredictionResult> = row.try_get("result")?;
            history.push(result.0);
        }
        Ok(history)
    }
}
