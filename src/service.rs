use brew_macro::dto;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required input missing or blank; never reaches upstream.
    #[error("{0}")]
    Validation(Box<str>),
    #[error("cannot connect to ML service at {upstream}")]
    UpstreamUnreachable { upstream: Box<str> },
    #[error("{0}")]
    UpstreamFailure(Box<str>),
    /// Any failure of the coarse-grained operations, reported without detail.
    #[error("failed to fetch {0}")]
    FetchFailed(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

pub const ERROR_UNAVAILABLE: &str = "ML service unavailable";
pub const ERROR_INTERNAL: &str = "internal server error";

#[dto(response)]
#[derive(PartialEq)]
pub struct HttpErrorBody {
    pub error: Box<str>,
    #[cfg_attr(
        any(feature = "server-http2", feature = "client-http2"),
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub message: Option<Box<str>>,
}

impl Error {
    pub fn body(&self) -> HttpErrorBody {
        match self {
            Error::Validation(_) | Error::FetchFailed(_) => HttpErrorBody {
                error: self.to_string().into(),
                message: None,
            },
            Error::UpstreamUnreachable { .. } => HttpErrorBody {
                error: ERROR_UNAVAILABLE.into(),
                message: Some(self.to_string().into()),
            },
            Error::UpstreamFailure(message) => HttpErrorBody {
                error: ERROR_INTERNAL.into(),
                message: Some(message.clone()),
            },
        }
    }
}

#[cfg(feature = "server-http2")]
impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Error::Validation(_) => axum::http::StatusCode::BAD_REQUEST,
            Error::UpstreamUnreachable { .. } => axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Error::UpstreamFailure(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            Error::FetchFailed(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, axum::Json(self.body())).into_response()
    }
}
