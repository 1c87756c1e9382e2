use shared::{
    domain::EntityKind,
    error::{ErrorCode, ProblemDetails},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request failed with status code {status}{}", problem_suffix(.problem))]
    Status {
        status: u16,
        code: ErrorCode,
        problem: Option<ProblemDetails>,
    },
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("invalid x-total-count header: {0:?}")]
    InvalidTotalCount(String),
    #[error("invalid server url {url:?}: {source}")]
    InvalidServerUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("{0} has no id")]
    MissingId(EntityKind),
}

impl ClientError {
    pub fn status(status: u16, problem: Option<ProblemDetails>) -> Self {
        ClientError::Status {
            status,
            code: ErrorCode::from_status(status),
            problem,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ClientError::Status { code, .. } => *code,
            _ => ErrorCode::Unknown,
        }
    }
}

fn problem_suffix(problem: &Option<ProblemDetails>) -> String {
    problem
        .as_ref()
        .and_then(ProblemDetails::summary)
        .map(|summary| format!(": {summary}"))
        .unwrap_or_default()
}
