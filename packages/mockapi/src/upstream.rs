//! Passthrough transport for requests outside `/api/`.

use crate::{ApiRequest, ApiResponse, Error};

/// A real network transport the backend forwards non-intercepted requests
/// to, unchanged.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn Upstream>`.
pub trait Upstream: Send {
    fn fetch(&mut self, request: &ApiRequest) -> Result<ApiResponse, Error>;
}

impl<T: Upstream + ?Sized> Upstream for Box<T> {
    fn fetch(&mut self, request: &ApiRequest) -> Result<ApiResponse, Error> {
        self.as_mut().fetch(request)
    }
}

/// Blocking HTTP transport over `reqwest`.
#[cfg(feature = "passthrough")]
pub struct HttpUpstream {
    client: reqwest::blocking::Client,
    base_url: url::Url,
}

#[cfg(feature = "passthrough")]
impl HttpUpstream {
    /// Create a transport resolving root-relative URLs against `base_url`.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let base_url = url::Url::parse(base_url).map_err(|e| Error::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        Ok(HttpUpstream {
            client: reqwest::blocking::Client::new(),
            base_url,
        })
    }
}

#[cfg(feature = "passthrough")]
impl Upstream for HttpUpstream {
    fn fetch(&mut self, request: &ApiRequest) -> Result<ApiResponse, Error> {
        use crate::Method;

        let url = if request.url.starts_with("http://") || request.url.starts_with("https://") {
            url::Url::parse(&request.url)
        } else {
            self.base_url.join(&request.url)
        }
        .map_err(|e| Error::InvalidUrl {
            url: request.url.clone(),
            message: e.to_string(),
        })?;

        let method = match request.method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
            Method::PUT => reqwest::Method::PUT,
            Method::PATCH => reqwest::Method::PATCH,
            Method::DELETE => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, url);
        if let Some(body) = &request.body {
            builder = builder
                .header("Content-Type", "application/json")
                .body(body.clone());
        }

        let response = builder.send()?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string();

        let mut headers = std::collections::HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.to_string(), v.to_string());
            }
        }

        let body_text = response.text()?;
        let body = serde_json::from_str(&body_text).unwrap_or(serde_json::Value::Null);

        Ok(ApiResponse {
            status,
            status_text,
            headers,
            body,
        })
    }
}
