//! Request Transport
//!
//! Executes one HTTP request and hands back the parsed body. Any non-success
//! response rejects with the service's raw body so the normalizer can pick
//! the message out of it; status codes are not interpreted here.

use crate::config::HttpConfig;
use crate::error::CommandError;
use crate::normalize::RawRejection;
use crate::session::Session;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// `accept` header value for JSON without OData annotations (Graph style).
pub const ACCEPT_JSON_NO_METADATA: &str = "application/json;odata.metadata=none";
/// `accept` header value for JSON without OData annotations (SharePoint style).
pub const ACCEPT_JSON_NOMETADATA: &str = "application/json;odata=nometadata";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    Json,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Text(String),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub response_type: ResponseType,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            response_type: ResponseType::Json,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn accept(self, value: &str) -> Self {
        self.header("accept", value)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn bytes(mut self, body: Vec<u8>) -> Self {
        self.body = Some(RequestBody::Bytes(body));
        self
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }

    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Empty,
}

impl ResponseBody {
    pub fn into_json(self) -> Value {
        match self {
            ResponseBody::Json(value) => value,
            ResponseBody::Text(text) => Value::String(text),
            ResponseBody::Empty => Value::Null,
        }
    }

    /// Deserialize a JSON body into `T`.
    pub fn parse<T: DeserializeOwned>(self) -> Result<T, RawRejection> {
        Ok(serde_json::from_value(self.into_json())?)
    }
}

/// Executes requests on behalf of command actions.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request) -> Result<ResponseBody, RawRejection>;
}

/// reqwest-backed transport that adds the session's bearer credential.
pub struct HttpTransport {
    client: Client,
    session: Arc<Session>,
}

impl HttpTransport {
    pub fn new(session: Arc<Session>, http: &HttpConfig) -> Result<Self, CommandError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
            .timeout(Duration::from_secs(http.request_timeout_secs))
            .user_agent(concat!("tenantctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CommandError::config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, session })
    }
}

/// Token audience for a request URL: its scheme and host.
pub fn resource_of(url: &str) -> Result<String, RawRejection> {
    let parsed = Url::parse(url)
        .map_err(|e| RawRejection::message(format!("Invalid request URL {}: {}", url, e)))?;
    Ok(parsed.origin().ascii_serialization())
}

fn map_http_error(error: reqwest::Error) -> RawRejection {
    if error.is_timeout() {
        RawRejection::Network(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        RawRejection::Network(format!("Connection error: {}", error))
    } else {
        RawRejection::Network(format!("HTTP error: {}", error))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: Request) -> Result<ResponseBody, RawRejection> {
        debug!(method = ?request.method, url = %request.url, "Executing request");

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Put => self.client.put(&request.url),
            Method::Patch => self.client.patch(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };

        if !request.has_header("authorization") {
            let resource = resource_of(&request.url)?;
            let token = self
                .session
                .access_token(&resource)
                .await
                .map_err(RawRejection::Failed)?;
            builder = builder.bearer_auth(token);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Some(RequestBody::Json(body)) => builder.json(&body),
            Some(RequestBody::Text(body)) => builder.body(body),
            Some(RequestBody::Bytes(body)) => builder.body(body),
            None => builder,
        };

        let response = builder.send().await.map_err(map_http_error)?;
        let status = response.status();
        let text = response.text().await.map_err(map_http_error)?;
        debug!(status = status.as_u16(), bytes = text.len(), "Response received");

        if !status.is_success() {
            let payload = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
            return Err(RawRejection::Payload(payload));
        }

        if text.trim().is_empty() {
            return Ok(ResponseBody::Empty);
        }
        match request.response_type {
            ResponseType::Json => Ok(ResponseBody::Json(serde_json::from_str(&text)?)),
            ResponseType::Text => Ok(ResponseBody::Text(text)),
        }
    }
}
