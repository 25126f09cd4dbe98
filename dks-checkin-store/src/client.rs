use crate::config::{ConfigError, StoreConfig};
use crate::row::{flag_column, ParticipantRow};
use async_trait::async_trait;
use dks_checkin_core::{
    ActivationFlag, ConditionalWrite, Participant, ParticipantId, ParticipantStore, StoreError,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::time::Duration;

const PREFER: &str = "Prefer";

/// Participant store backed by a PostgREST endpoint (Supabase REST API)
///
/// Reads filter on `uuid=eq.<id>`; writes PATCH the single matching row.
#[derive(Debug, Clone)]
pub struct PostgrestParticipantStore {
    http: reqwest::Client,
    table_url: String,
    conditional_commit: bool,
}

impl PostgrestParticipantStore {
    pub fn new(config: &StoreConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = HeaderMap::new();
                headers.insert(
                    "apikey",
                    HeaderValue::from_str(&config.api_key).map_err(|_| ConfigError::InvalidKey)?,
                );
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                        .map_err(|_| ConfigError::InvalidKey)?,
                );
                headers
            })
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        tracing::debug!("Participant store at {}", config.table_url());

        Ok(Self {
            http,
            table_url: config.table_url(),
            conditional_commit: config.conditional_commit,
        })
    }

    /// Whether the configuration asked for conditional writes
    pub fn conditional_commit(&self) -> bool {
        self.conditional_commit
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let resp = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        Ok(resp)
    }
}

fn eq(id: ParticipantId) -> String {
    format!("eq.{}", id)
}

/// `{"<column>": true}`
fn flag_set(column: &str) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    body.insert(column.to_string(), serde_json::Value::Bool(true));
    serde_json::Value::Object(body)
}

#[async_trait]
impl ParticipantStore for PostgrestParticipantStore {
    #[tracing::instrument(skip(self))]
    async fn fetch_by_identifier(
        &self,
        id: ParticipantId,
    ) -> Result<Option<Participant>, StoreError> {
        let request = self
            .http
            .get(&self.table_url)
            .query(&[("select", "*".to_string()), ("uuid", eq(id))]);

        let rows: Vec<ParticipantRow> = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.into_iter().next().map(Participant::from)),
            n => Err(StoreError::Decode(format!(
                "expected one row for {}, got {}",
                id, n
            ))),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn update_flag(&self, id: ParticipantId, flag: ActivationFlag) -> Result<(), StoreError> {
        let column = flag_column(flag);
        let request = self
            .http
            .patch(&self.table_url)
            .query(&[("uuid", eq(id))])
            .header(PREFER, "return=minimal")
            .json(&flag_set(column));

        self.send(request).await?;
        tracing::debug!("Set {} for {}", column, id);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn set_flag_if_unset(
        &self,
        id: ParticipantId,
        flag: ActivationFlag,
    ) -> Result<ConditionalWrite, StoreError> {
        let column = flag_column(flag);
        // Rows where the flag is still false (or null) are the only ones touched
        let request = self
            .http
            .patch(&self.table_url)
            .query(&[("uuid", eq(id)), (column, "not.is.true".to_string())])
            .header(PREFER, "return=representation")
            .json(&flag_set(column));

        let updated: Vec<serde_json::Value> = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        if updated.is_empty() {
            tracing::debug!("{} already set for {}", column, id);
            Ok(ConditionalWrite::NotApplied)
        } else {
            Ok(ConditionalWrite::Applied)
        }
    }
}
