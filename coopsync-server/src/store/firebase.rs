use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::watch;

use super::sse::SseParser;
use super::tree::{segments, write_node};
use super::{Query, RealtimeStore, Subscription};
use crate::configs::Store;
use crate::errors::StoreError;

#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

/// Body of a `put` or `patch` stream event.
#[derive(Debug, Deserialize)]
pub struct StreamPayload {
    pub path: String,
    pub data: Value,
}

/// Firebase Realtime Database over its REST interface.
#[derive(Clone)]
pub struct FirebaseStore {
    client: Client,
    base_url: String,
    auth: Option<String>,
    timeout: Duration,
    reconnect: Duration,
}

impl FirebaseStore {
    pub fn new(settings: &Store) -> Result<Self, StoreError> {
        let timeout = Duration::from_secs(settings.timeout_secs);

        // No overall timeout on the client: event streams stay open.
        let client = Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            auth: settings.auth.clone().filter(|auth| !auth.is_empty()),
            timeout,
            reconnect: Duration::from_secs(settings.reconnect_secs.max(1)),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path.trim_matches('/'))
    }

    fn params(&self, query: Option<&Query>, silent: bool) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        if let Some(auth) = &self.auth {
            params.push(("auth", auth.clone()));
        }
        if let Some(query) = query {
            params.push(("orderBy", format!("\"{}\"", query.order_by)));
            params.push(("limitToLast", query.limit_to_last.to_string()));
        }
        if silent {
            params.push(("print", "silent".to_string()));
        }

        params
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport_error)?;

        check_status(response).await
    }

    async fn read(&self, path: &str, query: Option<&Query>) -> Result<Option<Value>, StoreError> {
        let request = self
            .client
            .get(self.url(path))
            .query(&self.params(query, false));

        let value: Value = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        Ok((!value.is_null()).then_some(value))
    }

    async fn watch(&self, path: String, query: Option<Query>, sender: watch::Sender<Option<Value>>) {
        loop {
            match self.stream(&path, query.as_ref(), &sender).await {
                Ok(()) => tracing::debug!("Stream for {} ended, reconnecting", path),
                Err(StoreError::Rejected(reason)) => {
                    tracing::warn!("Stream for {} was cancelled: {}", path, reason);
                    return;
                }
                Err(e) => tracing::warn!("Stream for {} failed: {}", path, e),
            }

            if sender.is_closed() {
                return;
            }

            tokio::time::sleep(self.reconnect).await;
        }
    }

    async fn stream(
        &self,
        path: &str,
        query: Option<&Query>,
        sender: &watch::Sender<Option<Value>>,
    ) -> Result<(), StoreError> {
        let response = self
            .client
            .get(self.url(path))
            .query(&self.params(query, false))
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(transport_error)?;

        let mut body = check_status(response).await?.bytes_stream();
        let mut parser = SseParser::new();
        let mut tree = Value::Null;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(transport_error)?;

            for event in parser.push(&chunk) {
                match event.event.as_str() {
                    "put" | "patch" => {
                        let payload: StreamPayload = serde_json::from_str(&event.data)
                            .map_err(|e| StoreError::Malformed(e.to_string()))?;

                        apply_stream_event(&mut tree, &event.event, payload);
                        sender.send_replace((!tree.is_null()).then(|| tree.clone()));
                    }
                    "keep-alive" => {}
                    "cancel" | "auth_revoked" => {
                        return Err(StoreError::Rejected(format!("{}: {}", event.event, event.data)));
                    }
                    other => tracing::debug!("Ignoring stream event {} for {}", other, path),
                }
            }
        }

        Ok(())
    }
}

/// Folds one stream event into the locally held copy of the node.
pub fn apply_stream_event(tree: &mut Value, kind: &str, payload: StreamPayload) {
    let base = segments(&payload.path);

    match (kind, payload.data) {
        ("patch", Value::Object(fields)) => {
            for (key, value) in fields {
                let mut target = base.clone();
                target.extend(segments(&key));
                write_node(tree, &target, value);
            }
        }
        (_, data) => write_node(tree, &base, data),
    }
}

fn transport_error(error: reqwest::Error) -> StoreError {
    StoreError::Unavailable(error.to_string())
}

async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let reason = format!("{status}: {body}");

    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        Err(StoreError::Unavailable(reason))
    } else {
        Err(StoreError::Rejected(reason))
    }
}

#[async_trait]
impl RealtimeStore for FirebaseStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        self.read(path, None).await
    }

    async fn query(&self, path: &str, query: &Query) -> Result<Option<Value>, StoreError> {
        self.read(path, Some(query)).await
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let request = self
            .client
            .put(self.url(path))
            .query(&self.params(None, true))
            .json(&value);

        self.send(request).await.map(|_| ())
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        let request = self
            .client
            .patch(self.url(path))
            .query(&self.params(None, true))
            .json(&fields);

        self.send(request).await.map(|_| ())
    }

    async fn push(&self, path: &str, value: Value) -> Result<String, StoreError> {
        let request = self
            .client
            .post(self.url(path))
            .query(&self.params(None, false))
            .json(&value);

        let response: PushResponse = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        Ok(response.name)
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        let request = self
            .client
            .delete(self.url(path))
            .query(&self.params(None, true));

        self.send(request).await.map(|_| ())
    }

    async fn subscribe(&self, path: &str, query: Option<Query>) -> Result<Subscription, StoreError> {
        let (sender, receiver) = watch::channel(None);

        let store = self.clone();
        let stream_path = path.to_string();
        let task = tokio::spawn(async move {
            store.watch(stream_path, query, sender).await;
        });

        Ok(Subscription::new(path, receiver, Some(task)))
    }
}
