use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;
use zeroize::Zeroize;

use crate::store::StoreError;
use crate::traits::{PlanStore, PlanTable};

/// CRUD client for a PostgREST-style plan backend.
///
/// Writes use `Prefer: return=representation` so created/updated rows come
/// back in the response body; updates and deletes scope by `id=eq.{id}` and
/// reads by `event_id=eq.{plan}`, matching how the hosting application
/// addresses these tables.
pub struct RestPlanStore {
    client: Client,
    base_url: String,
    service_key: String,
}

impl Drop for RestPlanStore {
    fn drop(&mut self) {
        self.service_key.zeroize();
    }
}

impl RestPlanStore {
    pub fn new(base_url: &str, service_key: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        })
    }

    fn table_url(&self, table: PlanTable) -> String {
        format!("{}/{}", self.base_url, table.name())
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
    }

    /// Check the status and parse the body as a row array.
    async fn read_rows(resp: Response) -> Result<Vec<Value>, StoreError> {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(StoreError::from_status(status.as_u16(), &text));
        }
        if text.is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(rows)) => Ok(rows),
            Ok(row) => Ok(vec![row]),
            Err(e) => Err(StoreError {
                kind: crate::store::StoreErrorKind::Unknown,
                status: Some(status.as_u16()),
                message: format!("unparseable store response: {}", e),
            }),
        }
    }
}

#[async_trait]
impl PlanStore for RestPlanStore {
    async fn list(&self, table: PlanTable, plan_id: &str) -> anyhow::Result<Vec<Value>> {
        debug!(table = table.name(), plan_id, "store list");
        let resp = self
            .authed(self.client.get(self.table_url(table)))
            .query(&[
                ("event_id", format!("eq.{}", plan_id)),
                ("select", "*".to_string()),
            ])
            .send()
            .await
            .map_err(|e| StoreError::network(&e))?;

        Ok(Self::read_rows(resp).await?)
    }

    async fn insert(&self, table: PlanTable, row: &Value) -> anyhow::Result<Value> {
        debug!(table = table.name(), "store insert");
        let resp = self
            .authed(self.client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await
            .map_err(|e| StoreError::network(&e))?;

        let mut rows = Self::read_rows(resp).await?;
        if rows.is_empty() {
            anyhow::bail!("store returned no row for insert into {}", table.name());
        }
        Ok(rows.swap_remove(0))
    }

    async fn update(
        &self,
        table: PlanTable,
        id: &str,
        patch: &Value,
    ) -> anyhow::Result<Vec<Value>> {
        debug!(table = table.name(), id, "store update");
        let resp = self
            .authed(self.client.patch(self.table_url(table)))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await
            .map_err(|e| StoreError::network(&e))?;

        Ok(Self::read_rows(resp).await?)
    }

    async fn delete(&self, table: PlanTable, id: &str) -> anyhow::Result<()> {
        debug!(table = table.name(), id, "store delete");
        let resp = self
            .authed(self.client.delete(self.table_url(table)))
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await
            .map_err(|e| StoreError::network(&e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(StoreError::from_status(status.as_u16(), &text).into());
        }
        Ok(())
    }
}
