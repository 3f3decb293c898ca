//! Request and response model for intercepted calls.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// HTTP method of an intercepted request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
        }
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "PATCH" => Ok(Method::PATCH),
            "DELETE" => Ok(Method::DELETE),
            other => Err(Error::InvalidMethod {
                method: other.to_string(),
            }),
        }
    }
}

/// One intercepted request, exactly as exercise code issued it: a URL (most
/// often root-relative, `/api/products?q=coffee`) and an optional raw JSON
/// body. The body stays text until routing so malformed JSON can be answered
/// with a 400 instead of failing earlier.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiRequest {
    #[serde(default)]
    pub method: Method,

    #[serde(default)]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self {
            method: Method::PUT,
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self {
            method: Method::PATCH,
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            url: url.into(),
            ..Default::default()
        }
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: &impl Serialize) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_string(body)?);
        Ok(self)
    }

    /// Attach a raw body without validating it.
    pub fn with_raw_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Response to an intercepted request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,

    /// Status text (e.g. "OK", "Not Found").
    pub status_text: String,

    /// Response headers.
    pub headers: HashMap<String, String>,

    /// Response body as a JSON value; `null` for empty responses.
    pub body: serde_json::Value,
}

impl ApiResponse {
    fn json(status: u16, status_text: &str, body: serde_json::Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert(
            "Content-Type".to_string(),
            "application/json".to_string(),
        );
        ApiResponse {
            status,
            status_text: status_text.to_string(),
            headers,
            body,
        }
    }

    pub fn ok(body: serde_json::Value) -> Self {
        Self::json(200, "OK", body)
    }

    pub fn created(body: serde_json::Value) -> Self {
        Self::json(201, "Created", body)
    }

    /// Empty success, as returned by DELETE.
    pub fn no_content() -> Self {
        ApiResponse {
            status: 204,
            status_text: "No Content".to_string(),
            headers: HashMap::new(),
            body: serde_json::Value::Null,
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::json(400, "Bad Request", serde_json::json!({ "error": message }))
    }

    pub fn not_found(message: &str) -> Self {
        Self::json(404, "Not Found", serde_json::json!({ "error": message }))
    }

    pub fn server_error(message: &str) -> Self {
        Self::json(
            500,
            "Internal Server Error",
            serde_json::json!({ "error": message }),
        )
    }

    pub fn bad_gateway(message: &str) -> Self {
        Self::json(502, "Bad Gateway", serde_json::json!({ "error": message }))
    }

    /// Check if the status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the status indicates a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if the status indicates a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Try to deserialize the body into a specific type.
    pub fn json_body<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.body.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_serde_is_uppercase() {
        assert_eq!(serde_json::to_string(&Method::PATCH).unwrap(), "\"PATCH\"");
        let m: Method = serde_json::from_str("\"DELETE\"").unwrap();
        assert_eq!(m, Method::DELETE);
    }

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::GET);
        assert_eq!("Put".parse::<Method>().unwrap(), Method::PUT);
        assert!(matches!(
            "TRACE".parse::<Method>(),
            Err(Error::InvalidMethod { .. })
        ));
    }

    #[test]
    fn status_class_helpers() {
        assert!(ApiResponse::ok(serde_json::json!([])).is_success());
        assert!(ApiResponse::no_content().is_success());
        assert!(ApiResponse::bad_request("nope").is_client_error());
        assert!(ApiResponse::not_found("nope").is_client_error());
        assert!(ApiResponse::server_error("boom").is_server_error());
        assert!(ApiResponse::bad_gateway("down").is_server_error());
    }

    #[test]
    fn request_builders() {
        let req = ApiRequest::post("/api/products")
            .with_body(&serde_json::json!({ "name": "X", "price": 100 }))
            .unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url, "/api/products");
        assert!(req.body.unwrap().contains("\"name\":\"X\""));
    }
}
