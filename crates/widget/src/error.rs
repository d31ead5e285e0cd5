use snafu::Snafu;

/// Failure of one request/response cycle against the chat endpoint.
///
/// The widget never distinguishes these variants in front of the user; all of
/// them end as the same fallback bubble. The split exists for the logs.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum BackendError {
    #[snafu(display("chat request failed on `{stage}`: {message}"))]
    Transport {
        stage: &'static str,
        message: String,
    },
    #[snafu(display("chat endpoint returned status {status} on `{stage}`"))]
    Status { stage: &'static str, status: u16 },
    #[snafu(display("failed to decode chat reply on `{stage}`: {message}"))]
    Decode {
        stage: &'static str,
        message: String,
    },
}

pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StoreError {
    #[snafu(display("key/value store is unavailable on `{stage}`: {message}"))]
    Unavailable {
        stage: &'static str,
        message: String,
    },
    #[snafu(display("failed to read key '{key}' on `{stage}`: {message}"))]
    Read {
        stage: &'static str,
        key: String,
        message: String,
    },
    #[snafu(display("failed to write key '{key}' on `{stage}`: {message}"))]
    Write {
        stage: &'static str,
        key: String,
        message: String,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SessionError {
    #[snafu(display("failed to gather entropy for a session id on `{stage}`: {source}"))]
    Entropy {
        stage: &'static str,
        source: getrandom::Error,
    },
}

pub type SessionResult<T> = Result<T, SessionError>;
