//! Networked document store over HTTP/JSON.
//!
//! Layout under the configured endpoint:
//!
//! ```text
//! GET|PUT|DELETE  /users/{user}
//! GET             /users/{user}/records          -> {"documents": [...]}
//! GET|PUT|DELETE  /users/{user}/records/{date}
//! ```
//!
//! The server is a plain document database: it neither orders listings nor
//! cascades deletes, so both happen client-side. Writes are last-writer-wins.

use crate::config::RemoteConfig;
use crate::record::{AnkleRecord, DATE_FORMAT, UserId};
use crate::store::RecordStore;
use crate::AnkleError;
use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct UserDocument {
    id: String,
    created_at: String,
}

#[derive(Debug, Deserialize)]
struct RecordListing {
    #[serde(default)]
    documents: Vec<AnkleRecord>,
}

pub struct RemoteStore {
    agent: ureq::Agent,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoteStore {
    pub fn new(endpoint: &str, api_key: Option<String>, timeout_secs: u64) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::config::Config::builder()
                .timeout_global(Some(Duration::from_secs(timeout_secs)))
                .build(),
        );
        Self {
            agent,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, AnkleError> {
        let endpoint = config
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| AnkleError::Config("remote.endpoint is not set".into()))?;
        Ok(Self::new(endpoint, config.api_key.clone(), config.timeout_secs))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn user_url(&self, user: &UserId) -> String {
        format!("{}/users/{}", self.endpoint, urlencoding::encode(user.as_str()))
    }

    fn records_url(&self, user: &UserId) -> String {
        format!("{}/records", self.user_url(user))
    }

    fn record_url(&self, user: &UserId, date: NaiveDate) -> String {
        format!("{}/{}", self.records_url(user), date.format(DATE_FORMAT))
    }

    fn authorize<B>(&self, req: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        match &self.api_key {
            Some(key) => req.header("Authorization", format!("Bearer {key}")),
            None => req,
        }
    }

    /// `None` on 404.
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, AnkleError> {
        match self.authorize(self.agent.get(url)).call() {
            Ok(mut resp) => {
                let doc = resp
                    .body_mut()
                    .read_json::<T>()
                    .map_err(|e| backend_error("GET", url, e))?;
                Ok(Some(doc))
            }
            Err(ureq::Error::StatusCode(404)) => Ok(None),
            Err(e) => Err(backend_error("GET", url, e)),
        }
    }

    fn put_json<T: Serialize>(&self, url: &str, body: &T) -> Result<(), AnkleError> {
        self.authorize(self.agent.put(url))
            .send_json(body)
            .map_err(|e| backend_error("PUT", url, e))?;
        Ok(())
    }

    /// Status only; a 2xx body may carry any fields.
    fn exists(&self, url: &str) -> Result<bool, AnkleError> {
        match self.authorize(self.agent.get(url)).call() {
            Ok(_) => Ok(true),
            Err(ureq::Error::StatusCode(404)) => Ok(false),
            Err(e) => Err(backend_error("GET", url, e)),
        }
    }

    /// `false` on 404.
    fn delete(&self, url: &str) -> Result<bool, AnkleError> {
        match self.authorize(self.agent.delete(url)).call() {
            Ok(_) => Ok(true),
            Err(ureq::Error::StatusCode(404)) => Ok(false),
            Err(e) => Err(backend_error("DELETE", url, e)),
        }
    }

    fn require_user(&self, user: &UserId) -> Result<(), AnkleError> {
        if self.user_exists(user)? {
            Ok(())
        } else {
            Err(AnkleError::UnknownUser(user.to_string()))
        }
    }
}

fn backend_error(method: &str, url: &str, e: ureq::Error) -> AnkleError {
    log::warn!("remote store {method} {url} failed: {e}");
    AnkleError::Backend(format!("{method} {url}: {e}"))
}

impl RecordStore for RemoteStore {
    fn user_exists(&self, user: &UserId) -> Result<bool, AnkleError> {
        self.exists(&self.user_url(user))
    }

    fn create_user(&self, user: &UserId) -> Result<(), AnkleError> {
        if self.user_exists(user)? {
            return Err(AnkleError::Duplicate(user.to_string()));
        }
        let doc = UserDocument {
            id: user.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };
        self.put_json(&self.user_url(user), &doc)?;
        log::info!("registered user {user}");
        Ok(())
    }

    fn upsert(&self, user: &UserId, record: &AnkleRecord) -> Result<(), AnkleError> {
        self.require_user(user)?;
        self.put_json(&self.record_url(user, record.date), record)?;
        log::debug!("upsert {user}/{}", record.date);
        Ok(())
    }

    fn get_record(&self, user: &UserId, date: NaiveDate) -> Result<Option<AnkleRecord>, AnkleError> {
        self.get_json(&self.record_url(user, date))
    }

    fn list_records(&self, user: &UserId) -> Result<Vec<AnkleRecord>, AnkleError> {
        let mut records = self
            .get_json::<RecordListing>(&self.records_url(user))?
            .map(|l| l.documents)
            .unwrap_or_default();
        records.sort_by_key(|r| r.date);
        Ok(records)
    }

    fn delete_user(&self, user: &UserId) -> Result<usize, AnkleError> {
        self.require_user(user)?;
        let records = self.list_records(user)?;
        for record in &records {
            self.delete(&self.record_url(user, record.date))?;
        }
        self.delete(&self.user_url(user))?;
        log::info!("deleted user {user} ({} records)", records.len());
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_percent_encoded() {
        let store = RemoteStore::new("https://docs.example.net/v1/", None, 5);
        let user = UserId::parse("kim min/ji").unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(store.endpoint(), "https://docs.example.net/v1");
        assert_eq!(
            store.record_url(&user, date),
            "https://docs.example.net/v1/users/kim%20min%2Fji/records/2026-10-18"
        );
    }

    #[test]
    fn from_config_requires_endpoint() {
        let config = RemoteConfig::default();
        assert!(matches!(RemoteStore::from_config(&config), Err(AnkleError::Config(_))));
    }

    #[test]
    fn unreachable_server_is_backend_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let store = RemoteStore::new("http://127.0.0.1:9", None, 2);
        let user = UserId::parse("alice").unwrap();
        assert!(matches!(store.user_exists(&user), Err(AnkleError::Backend(_))));
    }
}
