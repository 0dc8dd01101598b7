use async_trait::async_trait;
use thiserror::Error;

/// One text-generation request: a free-form instruction plus the fixed
/// persona preamble and model identifier the feature was configured with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub message: String,
    pub preamble: String,
    pub model: String,
}

impl GenerationRequest {
    pub fn new(
        message: impl Into<String>,
        preamble: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            preamble: preamble.into(),
            model: model.into(),
        }
    }
}

/// Errors raised by a [`GenerationClient`].
///
/// One failed call surfaces one user-visible fallback message at the
/// feature boundary; the client performs no retries of its own.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed to reach the service")]
    Http(#[from] reqwest::Error),
    #[error("generation service answered {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("generation response carried no text payload")]
    MalformedResponse,
}

/// Common interface to the remote text-generation collaborator.
///
/// Mirrors the shape of the wire contract: prompt in, raw text out. The
/// caller owns formatting and persistence of the reply.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use lomo::{GenerationClient, GenerationError, GenerationRequest};
///
/// struct Canned;
///
/// #[async_trait]
/// impl GenerationClient for Canned {
///     async fn generate(&self, _: &GenerationRequest) -> Result<String, GenerationError> {
///         Ok("Apply early.".to_string())
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let req = GenerationRequest::new("when?", "be brief", "command-r-08-2024");
/// assert_eq!(Canned.generate(&req).await.unwrap(), "Apply early.");
/// # });
/// ```
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Produce one raw text reply for `request`.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}
