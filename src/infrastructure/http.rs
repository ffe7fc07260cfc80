//! HTTP implementation of the store traits (JSON over blocking reqwest).
//!
//! No retries: one failed request is a final failure for the caller.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};

use crate::config::Settings;
use crate::domain::{Alias, AliasMetadata, AliasState, Item, NewAlias};
use crate::infrastructure::cancel::CancelToken;
use crate::application::ApplicationError;
use crate::infrastructure::traits::{AliasStore, ItemStore, StoreError, StoreResult};
use crate::infrastructure::{InfraError, InfraResult};

/// Store backed by the service's REST API.
pub struct HttpStore {
    base_url: Url,
    token: Option<String>,
    client: Client,
}

impl HttpStore {
    pub fn new(settings: &Settings) -> InfraResult<Self> {
        let base_url = Url::parse(settings.api_url.trim_end_matches('/'))
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ApplicationError::Config {
                message: format!("api_url is not a usable base URL: {:?}", settings.api_url),
            })?;
        let client = Client::builder()
            .user_agent(concat!("mailroom/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InfraError::http("build http client", e))?;
        Ok(Self {
            base_url,
            token: settings.api_token.clone(),
            client,
        })
    }

    /// Base URL extended by `segments`, each percent-encoded as exactly one path segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send one request, honoring cancellation and the remaining deadline.
    fn send(&self, req: RequestBuilder, what: &str, cancel: &CancelToken) -> StoreResult<Response> {
        cancel.check()?;
        let mut req = req;
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(left) = cancel.remaining() {
            req = req.timeout(left);
        }

        let resp = req.send().map_err(|e| {
            if e.is_timeout() {
                StoreError::DeadlineExceeded
            } else {
                StoreError::Transport(e.to_string())
            }
        })?;

        let status = resp.status();
        debug!("{} -> {}", what, status);
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            let message = resp.text().unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }
        Ok(resp)
    }

    fn json<T: DeserializeOwned>(resp: Response) -> StoreResult<T> {
        resp.json().map_err(|e| StoreError::Decode(e.to_string()))
    }
}

impl AliasStore for HttpStore {
    #[instrument(skip(self, cancel))]
    fn fetch_alias(&self, id: &str, cancel: &CancelToken) -> StoreResult<Alias> {
        let req = self.client.get(self.url(&["aliases", id]));
        Self::json(self.send(req, &format!("alias {id}"), cancel)?)
    }

    #[instrument(skip(self, cancel))]
    fn fetch_group(&self, domain: &str, cancel: &CancelToken) -> StoreResult<Vec<Alias>> {
        let req = self
            .client
            .get(self.url(&["aliases"]))
            .query(&[("domain", domain)]);
        match self.send(req, &format!("aliases for {domain}"), cancel) {
            Ok(resp) => Self::json(resp),
            // an unknown domain is an empty group, not an error
            Err(StoreError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, cancel))]
    fn list_aliases(&self, cancel: &CancelToken) -> StoreResult<Vec<Alias>> {
        let req = self.client.get(self.url(&["aliases"]));
        Self::json(self.send(req, "aliases", cancel)?)
    }

    #[instrument(skip(self, cancel))]
    fn create_alias(&self, alias: &NewAlias, cancel: &CancelToken) -> StoreResult<Alias> {
        let req = self.client.post(self.url(&["aliases"])).json(alias);
        Self::json(self.send(req, "create alias", cancel)?)
    }

    #[instrument(skip(self, cancel))]
    fn update_state(
        &self,
        id: &str,
        state: &AliasState,
        cancel: &CancelToken,
    ) -> StoreResult<()> {
        let req = self
            .client
            .patch(self.url(&["aliases", id]))
            .json(&json!({ "state": state }));
        self.send(req, &format!("alias {id}"), cancel).map(|_| ())
    }

    #[instrument(skip(self, cancel))]
    fn update_metadata(
        &self,
        id: &str,
        fields: &AliasMetadata,
        cancel: &CancelToken,
    ) -> StoreResult<()> {
        let req = self
            .client
            .patch(self.url(&["aliases", id]))
            .json(fields);
        self.send(req, &format!("alias {id}"), cancel).map(|_| ())
    }
}

impl ItemStore for HttpStore {
    #[instrument(skip(self, cancel))]
    fn fetch_items(&self, ids: &[String], cancel: &CancelToken) -> StoreResult<Vec<Item>> {
        let req = self
            .client
            .get(self.url(&["items"]))
            .query(&[("ids", ids.join(","))]);
        Self::json(self.send(req, "items", cancel)?)
    }

    #[instrument(skip(self, cancel))]
    fn delete_item(&self, id: &str, cancel: &CancelToken) -> StoreResult<()> {
        let req = self.client.delete(self.url(&["items", id]));
        self.send(req, &format!("item {id}"), cancel).map(|_| ())
    }

    #[instrument(skip(self, cancel))]
    fn move_item(&self, id: &str, mailbox: &str, cancel: &CancelToken) -> StoreResult<()> {
        let req = self
            .client
            .patch(self.url(&["items", id]))
            .json(&json!({ "mailbox": mailbox }));
        self.send(req, &format!("item {id}"), cancel).map(|_| ())
    }

    #[instrument(skip(self, cancel))]
    fn set_read(&self, id: &str, read: bool, cancel: &CancelToken) -> StoreResult<()> {
        let req = self
            .client
            .patch(self.url(&["items", id]))
            .json(&json!({ "read": read }));
        self.send(req, &format!("item {id}"), cancel).map(|_| ())
    }
}
