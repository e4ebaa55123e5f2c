//! Cloud API operations over a `Transport`

use sesami_proto::{generate_tag, Command, Request, DEFAULT_BASE_URL};

use crate::transport::{Connection, Transport, TransportError};

/// Entries per page used by `get_history`
pub const HISTORY_PAGE_SIZE: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Secret key is not 32 hex digits; raised before any I/O
    #[error("invalid secret key: {0}")]
    InvalidKey(String),
    #[error("connection failed: {0}")]
    Connection(String),
    /// Server answered with something other than 200
    #[error("request failed, status {0}")]
    RequestFailed(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("failed to encode request: {0}")]
    Encode(String),
}

impl From<sesami_proto::Error> for ApiError {
    fn from(e: sesami_proto::Error) -> Self {
        match e {
            sesami_proto::Error::InvalidKey { reason } => ApiError::InvalidKey(reason),
            sesami_proto::Error::Encode(e) => ApiError::Encode(e.to_string()),
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Connect(m) => ApiError::Connection(m),
            TransportError::Exchange(m) => ApiError::Transport(m),
        }
    }
}

/// Blocking Sesami cloud client
///
/// Holds no state between calls besides the transport and base URL; every
/// operation opens its own connection and drops it before returning.
pub struct Client<T> {
    transport: T,
    base_url: String,
}

impl<T: Transport> Client<T> {
    /// Client against the production cloud host
    pub fn new(transport: T) -> Self {
        Self::with_base_url(transport, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(transport: T, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Sign and send a lock command
    ///
    /// The secret key is checked before anything touches the network.
    pub fn send_command(
        &mut self,
        timestamp: u32,
        device_id: &str,
        command: Command,
        api_key: &str,
        secret_key: &str,
        history_label: &str,
    ) -> Result<String, ApiError> {
        let tag = generate_tag(secret_key, timestamp)?;
        let request = Request::command(
            &self.base_url,
            device_id,
            api_key,
            command,
            &tag,
            history_label,
        )?;
        log::debug!("Sending {command} to {device_id}");
        self.execute(&request)
    }

    /// Current lock status, as returned by the cloud
    pub fn get_status(&mut self, device_id: &str, api_key: &str) -> Result<String, ApiError> {
        let request = Request::status(&self.base_url, device_id, api_key);
        self.execute(&request)
    }

    /// The five most recent history entries
    pub fn get_history(&mut self, device_id: &str, api_key: &str) -> Result<String, ApiError> {
        self.get_history_page(device_id, api_key, 0, HISTORY_PAGE_SIZE)
    }

    pub fn get_history_page(
        &mut self,
        device_id: &str,
        api_key: &str,
        page: u32,
        lg: u32,
    ) -> Result<String, ApiError> {
        let request = Request::history(&self.base_url, device_id, api_key, page, lg);
        self.execute(&request)
    }

    fn execute(&mut self, request: &Request) -> Result<String, ApiError> {
        let mut conn = match self.transport.open(&request.url) {
            Ok(conn) => conn,
            Err(e) => {
                log::error!("Connection failed: {e}");
                return Err(e.into());
            }
        };

        let response = match conn.send(request) {
            Ok(response) => response,
            Err(e) => {
                log::error!("{} failed: {e}", request.method.as_str());
                return Err(e.into());
            }
        };
        drop(conn);

        response.into_body().map_err(|status| {
            log::error!(
                "{} failed, responseCode: {status}",
                request.method.as_str()
            );
            ApiError::RequestFailed(status)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use sesami_proto::{Method, Response};

    use super::*;

    const DEVICE: &str = "488ABAAB-164F-7A86-595F-DDD778CB86C3";
    const KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c";

    #[derive(Clone, Copy)]
    enum Script {
        Respond(u16, &'static str),
        FailOpen,
        FailSend,
    }

    #[derive(Default)]
    struct Calls {
        opened: Vec<String>,
        sent: Vec<Request>,
        dropped: usize,
    }

    struct FakeTransport {
        script: Script,
        calls: Rc<RefCell<Calls>>,
    }

    struct FakeConnection {
        script: Script,
        calls: Rc<RefCell<Calls>>,
    }

    impl Transport for FakeTransport {
        type Connection = FakeConnection;

        fn open(&mut self, url: &str) -> Result<FakeConnection, TransportError> {
            if let Script::FailOpen = self.script {
                return Err(TransportError::Connect(format!("{url}: unreachable")));
            }
            self.calls.borrow_mut().opened.push(url.to_string());
            Ok(FakeConnection {
                script: self.script,
                calls: self.calls.clone(),
            })
        }
    }

    impl Connection for FakeConnection {
        fn send(&mut self, request: &Request) -> Result<Response, TransportError> {
            self.calls.borrow_mut().sent.push(request.clone());
            match self.script {
                Script::Respond(status, body) => Ok(Response::new(status, body)),
                Script::FailSend => Err(TransportError::Exchange("reset by peer".to_string())),
                Script::FailOpen => unreachable!(),
            }
        }
    }

    impl Drop for FakeConnection {
        fn drop(&mut self) {
            self.calls.borrow_mut().dropped += 1;
        }
    }

    fn client(script: Script) -> (Client<FakeTransport>, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let transport = FakeTransport {
            script,
            calls: calls.clone(),
        };
        (Client::new(transport), calls)
    }

    #[test]
    fn send_command_signs_and_posts() {
        let (mut c, calls) = client(Script::Respond(200, ""));
        let body = c
            .send_command(0, DEVICE, Command::Unlock, "api-key", KEY, "esp32 unlock")
            .unwrap();
        assert_eq!(body, "");

        let calls = calls.borrow();
        assert_eq!(calls.opened.len(), 1);
        assert_eq!(calls.dropped, 1);
        let r = &calls.sent[0];
        assert_eq!(r.method, Method::Post);
        assert_eq!(
            r.url,
            format!("https://app.candyhouse.co/api/sesame2/{DEVICE}/cmd")
        );
        assert_eq!(r.header("x-api-key"), Some("api-key"));
        assert_eq!(
            r.body.as_deref(),
            Some(
                r#"{"cmd":83,"sign":"71d227183debe5248ba4608438157040","history":"ZXNwMzIgdW5sb2Nr"}"#
            )
        );
    }

    #[test]
    fn invalid_key_never_touches_network() {
        let (mut c, calls) = client(Script::Respond(200, "ok"));
        let err = c
            .send_command(0, DEVICE, Command::Lock, "k", "zz7e151628aed2a6abf7158809cf4f3c", "x")
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidKey(_)));
        assert!(calls.borrow().opened.is_empty());
        assert!(calls.borrow().sent.is_empty());
    }

    #[test]
    fn status_unescapes_body() {
        let (mut c, calls) = client(Script::Respond(200, r#"{\"CHSesame2Status\":\"active\"}"#));
        let body = c.get_status(DEVICE, "api-key").unwrap();
        assert_eq!(body, r#"{"CHSesame2Status":"active"}"#);

        let calls = calls.borrow();
        let r = &calls.sent[0];
        assert_eq!(r.method, Method::Get);
        assert_eq!(r.url, format!("https://app.candyhouse.co/api/sesame2/{DEVICE}"));
        assert_eq!(r.body, None);
    }

    #[test]
    fn history_uses_first_page_of_five() {
        let (mut c, calls) = client(Script::Respond(200, "[]"));
        assert_eq!(c.get_history(DEVICE, "api-key").unwrap(), "[]");
        assert_eq!(
            calls.borrow().sent[0].url,
            format!("https://app.candyhouse.co/api/sesame2/{DEVICE}/history?page=0&lg=5")
        );
    }

    #[test]
    fn history_page() {
        let (mut c, calls) = client(Script::Respond(200, "[]"));
        c.get_history_page(DEVICE, "k", 3, 20).unwrap();
        assert!(calls.borrow().sent[0].url.ends_with("/history?page=3&lg=20"));
    }

    #[test]
    fn non_200_is_request_failed() {
        for status in [201, 403, 404, 500] {
            let (mut c, calls) = client(Script::Respond(status, "{\"message\":\"Forbidden\"}"));
            assert!(matches!(
                c.get_status(DEVICE, "k"),
                Err(ApiError::RequestFailed(s)) if s == status
            ));
            assert!(matches!(
                c.get_history(DEVICE, "k"),
                Err(ApiError::RequestFailed(s)) if s == status
            ));
            assert!(matches!(
                c.send_command(0, DEVICE, Command::Toggle, "k", KEY, "x"),
                Err(ApiError::RequestFailed(s)) if s == status
            ));
            assert_eq!(calls.borrow().dropped, 3);
        }
    }

    #[test]
    fn connection_failure_is_single_attempt() {
        let (mut c, calls) = client(Script::FailOpen);
        assert!(matches!(
            c.get_status(DEVICE, "k"),
            Err(ApiError::Connection(_))
        ));
        assert!(matches!(
            c.send_command(0, DEVICE, Command::Lock, "k", KEY, "x"),
            Err(ApiError::Connection(_))
        ));
        assert!(calls.borrow().sent.is_empty());
    }

    #[test]
    fn exchange_failure_releases_connection() {
        let (mut c, calls) = client(Script::FailSend);
        assert!(matches!(
            c.get_history(DEVICE, "k"),
            Err(ApiError::Transport(_))
        ));
        let calls = calls.borrow();
        assert_eq!(calls.sent.len(), 1);
        assert_eq!(calls.dropped, 1);
    }

    #[test]
    fn custom_base_url() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let transport = FakeTransport {
            script: Script::Respond(200, "{}"),
            calls: calls.clone(),
        };
        let mut c = Client::with_base_url(transport, "http://127.0.0.1:9000/");
        assert_eq!(c.base_url(), "http://127.0.0.1:9000");
        c.get_status("dev", "k").unwrap();
        assert_eq!(calls.borrow().opened[0], "http://127.0.0.1:9000/api/sesame2/dev");
    }
}
