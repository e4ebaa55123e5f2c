//! Request framing for the three cloud endpoints

use data_encoding::BASE64;

use crate::{Command, Error, Tag};

/// Cloud host used unless a caller overrides it
pub const DEFAULT_BASE_URL: &str = "https://app.candyhouse.co";

/// Header carrying the cloud API key
pub const API_KEY_HEADER: &str = "x-api-key";

pub const CONTENT_TYPE_JSON: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A fully built request, ready for any transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
}

/// Body of the `cmd` endpoint; field order is the wire order
#[derive(serde::Serialize)]
struct CommandBody<'a> {
    cmd: i32,
    sign: &'a str,
    history: String,
}

impl Request {
    /// POST `/api/sesame2/{device_id}/cmd`
    pub fn command(
        base_url: &str,
        device_id: &str,
        api_key: &str,
        command: Command,
        tag: &Tag,
        history_label: &str,
    ) -> Result<Self, Error> {
        let body = CommandBody {
            cmd: command.code(),
            sign: tag.as_str(),
            history: BASE64.encode(history_label.as_bytes()),
        };

        Ok(Self {
            method: Method::Post,
            url: format!("{}/cmd", device_url(base_url, device_id)),
            headers: vec![
                ("Content-Type", CONTENT_TYPE_JSON.to_string()),
                (API_KEY_HEADER, api_key.to_string()),
            ],
            body: Some(serde_json::to_string(&body)?),
        })
    }

    /// GET `/api/sesame2/{device_id}`
    pub fn status(base_url: &str, device_id: &str, api_key: &str) -> Self {
        Self::get(device_url(base_url, device_id), api_key)
    }

    /// GET `/api/sesame2/{device_id}/history?page={page}&lg={lg}`
    pub fn history(base_url: &str, device_id: &str, api_key: &str, page: u32, lg: u32) -> Self {
        Self::get(
            format!(
                "{}/history?page={page}&lg={lg}",
                device_url(base_url, device_id)
            ),
            api_key,
        )
    }

    fn get(url: String, api_key: &str) -> Self {
        Self {
            method: Method::Get,
            url,
            headers: vec![(API_KEY_HEADER, api_key.to_string())],
            body: None,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn device_url(base_url: &str, device_id: &str) -> String {
    format!("{}/api/sesame2/{device_id}", base_url.trim_end_matches('/'))
}
