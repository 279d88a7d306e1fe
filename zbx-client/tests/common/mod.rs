//! Common test utilities for zbx-client integration tests
//!
//! `MockTransport` stands in for the HTTP layer: it records every request the
//! client sends and answers from a handler, so tests can assert both on what
//! went over the wire and on how many calls were made.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use zbx_client::{Session, Transport, ZabbixClient};
use zbx_core::{Error, Result};

pub const ENDPOINT: &str = "https://example/api";

type Handler = dyn Fn(&Value) -> Result<String> + Send + Sync;

/// Scripted transport that records every request
pub struct MockTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl MockTransport {
    /// Answer each request with whatever `handler` returns
    pub fn with_handler<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&Value) -> Result<String> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Answer every request with `result`, echoing the request id
    pub fn replying(result: Value) -> Arc<Self> {
        Self::with_handler(move |request| Ok(mock_response(&request["id"], result.clone())))
    }

    /// Fail every request at the transport level
    pub fn failing(message: &str) -> Arc<Self> {
        let message = message.to_string();
        Self::with_handler(move |_| Err(Error::Transport(message.clone())))
    }

    /// Number of requests that reached the transport
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Parsed bodies of all requests, in order
    pub fn requests(&self) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, body)| body.clone())
            .collect()
    }

    /// URLs all requests were posted to, in order
    pub fn urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// Methods of all requests, in order
    pub fn methods(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|request| request["method"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_json(&self, url: &str, body: String) -> Result<String> {
        let request: Value = serde_json::from_str(&body).expect("client sent invalid JSON");
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), request.clone()));
        (self.handler)(&request)
    }
}

/// Client on `ENDPOINT` without a token
pub fn client_with(transport: Arc<MockTransport>) -> ZabbixClient {
    let session = Session::with_endpoint(ENDPOINT).unwrap();
    ZabbixClient::with_transport(session, transport)
}

/// Client on `ENDPOINT` holding token "tok1"
pub async fn authenticated_client(transport: Arc<MockTransport>) -> ZabbixClient {
    let client = client_with(transport);
    client.session().set_token("tok1").await;
    client
}

/// Success response body
pub fn mock_response(id: &Value, result: Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "result": result,
        "id": id
    })
    .to_string()
}

/// Error response body
pub fn mock_error_response(id: &Value, code: i64, message: &str, data: &str) -> String {
    json!({
        "jsonrpc": "2.0",
        "error": {
            "code": code,
            "message": message,
            "data": data
        },
        "id": id
    })
    .to_string()
}

/// Answer `<kind>.get` name lookups from a fixed table of (name, id) pairs
///
/// Any other method gets an empty list.
pub fn lookup_handler(
    id_field: &'static str,
    name_field: &'static str,
    records: Vec<(&'static str, &'static str)>,
) -> impl Fn(&Value) -> Result<String> + Send + Sync + 'static {
    move |request| {
        let wanted = request["params"]["filter"][name_field][0]
            .as_str()
            .unwrap_or_default()
            .to_string();
        let matches: Vec<Value> = records
            .iter()
            .filter(|(name, _)| *name == wanted)
            .map(|(name, id)| json!({ id_field: id, name_field: name }))
            .collect();
        Ok(mock_response(&request["id"], Value::Array(matches)))
    }
}
