use std::fmt;

/// Classified store error for CRUD calls against the plan backend.
#[derive(Debug)]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// 401/403 — bad service key or row-level security rejection.
    Auth,
    /// 404 — unknown table or missing row.
    NotFound,
    /// 409 — constraint violation (foreign key, unique).
    Conflict,
    /// 408 or request timeout.
    Timeout,
    /// Connection refused, DNS failure, reset, etc.
    Network,
    /// 5xx — backend outage.
    ServerError,
    /// Anything else.
    Unknown,
}

impl StoreError {
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => StoreErrorKind::Auth,
            404 => StoreErrorKind::NotFound,
            408 => StoreErrorKind::Timeout,
            409 => StoreErrorKind::Conflict,
            500 | 502 | 503 | 504 => StoreErrorKind::ServerError,
            _ => StoreErrorKind::Unknown,
        };
        Self {
            kind,
            status: Some(status),
            message: truncate_body(body),
        }
    }

    pub fn network(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            StoreErrorKind::Timeout
        } else {
            StoreErrorKind::Network
        };
        Self {
            kind,
            status: None,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(status) = self.status {
            write!(f, "Store error ({}, {:?}): {}", status, self.kind, self.message)
        } else {
            write!(f, "Store error ({:?}): {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for StoreError {}

fn truncate_body(body: &str) -> String {
    if body.len() > 300 {
        let mut end = 300;
        while end > 0 && !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
