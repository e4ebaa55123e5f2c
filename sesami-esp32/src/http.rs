//! Blocking HTTPS transport for ESP32
//!
//! Uses `EspHttpConnection` with the ESP-IDF certificate bundle for TLS.

use embedded_svc::http::client::Client as HttpClient;
use embedded_svc::io::{Read, Write};
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
use log::*;
use sesami_mcu::{read_body, Connection, Method, Request, Response, Transport, TransportError};

/// Largest response body accepted; anything bigger fails the request
const MAX_BODY_LEN: usize = 8 * 1024;

pub struct EspTransport;

/// One HTTP client session; `esp_http_client_cleanup` runs when it drops
pub struct EspConnection {
    client: HttpClient<EspHttpConnection>,
}

impl Transport for EspTransport {
    type Connection = EspConnection;

    fn open(&mut self, url: &str) -> Result<EspConnection, TransportError> {
        debug!("Opening HTTP client for {}", url);
        let config = Configuration {
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        };
        let conn = EspHttpConnection::new(&config)
            .map_err(|e| TransportError::Connect(format!("{e:?}")))?;
        Ok(EspConnection {
            client: HttpClient::wrap(conn),
        })
    }
}

impl Connection for EspConnection {
    fn send(&mut self, request: &Request) -> Result<Response, TransportError> {
        let method = match request.method {
            Method::Get => embedded_svc::http::Method::Get,
            Method::Post => embedded_svc::http::Method::Post,
        };

        let content_length = request.body.as_ref().map(|b| b.len().to_string());
        let mut headers: Vec<(&str, &str)> = request
            .headers
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        if let Some(len) = content_length.as_deref() {
            headers.push(("Content-Length", len));
        }

        // esp_http_client_open happens here: DNS, TCP and TLS
        let mut req = self
            .client
            .request(method, &request.url, &headers)
            .map_err(|e| TransportError::Connect(format!("{e:?}")))?;

        if let Some(body) = &request.body {
            req.write_all(body.as_bytes())
                .map_err(|e| TransportError::Exchange(format!("{e:?}")))?;
            req.flush()
                .map_err(|e| TransportError::Exchange(format!("{e:?}")))?;
        }

        let mut response = req
            .submit()
            .map_err(|e| TransportError::Exchange(format!("{e:?}")))?;
        let status = response.status();

        let body = read_body(|buf| response.read(buf), MAX_BODY_LEN)?;
        Ok(Response::new(status, body))
    }
}
