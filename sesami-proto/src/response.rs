/// The only status the cloud API treats as success
pub const STATUS_OK: u16 = 200;

/// Status code and raw body as read off the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Body with escaped quotes undone, or the status code if the request
    /// failed. The body of a failed request is dropped.
    pub fn into_body(self) -> Result<String, u16> {
        if self.is_ok() {
            Ok(unescape_quotes(&self.body))
        } else {
            Err(self.status)
        }
    }
}

/// Replace every `\"` with `"`
pub fn unescape_quotes(body: &str) -> String {
    body.replace("\\\"", "\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape() {
        assert_eq!(
            unescape_quotes(r#"{\"CHSesame2Status\":\"active\"}"#),
            r#"{"CHSesame2Status":"active"}"#
        );
    }

    #[test]
    fn unescape_idempotent_on_plain_body() {
        let body = r#"{"batteryPercentage":94,"CHSesame2Status":"locked"}"#;
        let once = unescape_quotes(body);
        assert_eq!(once, body);
        assert_eq!(unescape_quotes(&once), once);
    }

    #[test]
    fn non_200_drops_body() {
        assert_eq!(Response::new(403, "forbidden").into_body(), Err(403));
        assert_eq!(Response::new(201, "created").into_body(), Err(201));
        assert_eq!(
            Response::new(200, r#"\"active\""#).into_body(),
            Ok(r#""active""#.to_string())
        );
    }
}
