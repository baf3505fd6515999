//! REST data store client.
//!
//! Tables are exposed at `/rest/v1/<table>` with PostgREST style filters
//! (`select`, `limit`, `<column>=eq.<value>`, `<column>=in.(a,b)`).

use crate::error::Error;
use async_trait::async_trait;
use log::*;
use serde_json::{Map, Value};
use service::config::Config;
use url::Url;

/// One row as returned by the data store.
pub type Row = Map<String, Value>;

/// Query string parameters, in order.
pub type Query = Vec<(String, String)>;

/// Capability to read and write tables in the hosted data store.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Read rows with the project's public key as the bearer credential.
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, Error>;

    /// Insert rows on behalf of a signed-in user and return the stored representation.
    async fn insert(&self, table: &str, rows: &[Row], access_token: &str)
        -> Result<Vec<Row>, Error>;
}

pub struct RestDataStore {
    client: reqwest::Client,
    base_url: Url,
    anon_key: String,
}

impl RestDataStore {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            anon_key: anon_key.to_string(),
        })
    }

    /// Build a client from the backend URL and key, failing when either is missing.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        match (config.supabase_url(), config.supabase_anon_key()) {
            (Some(url), Some(key)) => Self::new(&url, &key),
            _ => {
                warn!("Data store URL or API key is not configured");
                Err(Error::config())
            }
        }
    }

    fn table_url(&self, table: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("/rest/v1/{table}"));
        url.set_query(None);
        url
    }
}

#[async_trait]
impl DataStore for RestDataStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, Error> {
        let mut url = self.table_url(table);
        url.query_pairs_mut().extend_pairs(query.iter());

        debug!("Selecting from table {table}");

        let response = self
            .client
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .send()
            .await
            .inspect_err(|e| warn!("Failed to read table {table}: {e:?}"))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Data store read of {table} failed: {status} - {error_text}");
            return Err(Error::upstream(status, error_text));
        }

        Ok(response.json::<Vec<Row>>().await?)
    }

    async fn insert(
        &self,
        table: &str,
        rows: &[Row],
        access_token: &str,
    ) -> Result<Vec<Row>, Error> {
        info!("Inserting {} row(s) into {table}", rows.len());

        let response = self
            .client
            .post(self.table_url(table))
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=representation")
            .bearer_auth(access_token)
            .json(rows)
            .send()
            .await
            .inspect_err(|e| warn!("Failed to insert into {table}: {e:?}"))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Data store insert into {table} failed: {status} - {error_text}");
            return Err(Error::upstream(status, error_text));
        }

        Ok(response.json::<Vec<Row>>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, ExternalErrorKind};
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn test_select_sends_filters_and_anon_credentials() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/captions")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("select".into(), "id,content".into()),
                Matcher::UrlEncoded("limit".into(), "5".into()),
                Matcher::UrlEncoded("is_public".into(), "eq.true".into()),
            ]))
            .match_header("apikey", "anon-key")
            .match_header("authorization", "Bearer anon-key")
            .with_status(200)
            .with_body(r#"[{"id":1,"content":"hello"}]"#)
            .create_async()
            .await;

        let store = RestDataStore::new(&server.url(), "anon-key").unwrap();
        let rows = store
            .select(
                "captions",
                &vec![
                    ("select".to_string(), "id,content".to_string()),
                    ("limit".to_string(), "5".to_string()),
                    ("is_public".to_string(), "eq.true".to_string()),
                ],
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["content"], json!("hello"));
    }

    #[tokio::test]
    async fn test_select_failure_carries_status_and_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/v1/missing")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body("relation does not exist")
            .create_async()
            .await;

        let store = RestDataStore::new(&server.url(), "anon-key").unwrap();
        let err = store.select("missing", &Vec::new()).await.unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Upstream {
                status: 404,
                body: "relation does not exist".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_insert_uses_user_token_and_returns_representation() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/caption_votes")
            .match_header("apikey", "anon-key")
            .match_header("authorization", "Bearer user-token")
            .match_header("prefer", "return=representation")
            .match_body(Matcher::Json(json!([{"caption_id": 7, "vote": 4}])))
            .with_status(201)
            .with_body(r#"[{"id":99,"caption_id":7,"vote":4}]"#)
            .create_async()
            .await;

        let store = RestDataStore::new(&server.url(), "anon-key").unwrap();
        let mut row = Row::new();
        row.insert("caption_id".to_string(), json!(7));
        row.insert("vote".to_string(), json!(4));

        let stored = store
            .insert("caption_votes", &[row], "user-token")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(stored[0]["id"], json!(99));
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(RestDataStore::new("::not-a-url", "anon-key").is_err());
    }
}
