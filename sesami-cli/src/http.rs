//! `reqwest::blocking` implementation of the sesami-mcu transport traits

use sesami_mcu::{Connection, Method, Request, Response, Transport, TransportError};

/// Host transport. Connections are not pooled, so each operation gets a
/// fresh connection that is closed when the operation returns.
pub struct ReqwestTransport {
    timeout: Option<std::time::Duration>,
}

pub struct ReqwestConnection {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<std::time::Duration>) -> Self {
        Self { timeout }
    }
}

impl Transport for ReqwestTransport {
    type Connection = ReqwestConnection;

    fn open(&mut self, url: &str) -> Result<ReqwestConnection, TransportError> {
        tracing::debug!("opening connection for {url}");
        let mut builder = reqwest::blocking::Client::builder().pool_max_idle_per_host(0);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        Ok(ReqwestConnection { client })
    }
}

impl Connection for ReqwestConnection {
    fn send(&mut self, request: &Request) -> Result<Response, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(classify)?;
        tracing::debug!("{} {} -> {status}", request.method.as_str(), request.url);

        Ok(Response::new(status, body))
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_connect() {
        TransportError::Connect(format_chain(&e))
    } else {
        TransportError::Exchange(format_chain(&e))
    }
}

// reqwest keeps the useful part (refused, dns, tls) in the source chain
fn format_chain(e: &dyn std::error::Error) -> String {
    let mut s = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        s.push_str(": ");
        s.push_str(&cause.to_string());
        source = cause.source();
    }
    s
}
