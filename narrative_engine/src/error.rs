//! Engine error taxonomy.

use thiserror::Error;

/// Errors the engine surfaces to the host.
///
/// Conditions and actions are total and fail closed; unknown identifiers
/// resolve to absent/false and malformed actions are skipped. Only boundary
/// cases become errors: unparseable content, and player input that does not
/// match an offered choice, which the host answers with a re-prompt and
/// never a state change.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("content parse error: {0}")]
    ContentParse(#[from] toml::de::Error),

    #[error("no active conversation")]
    NoConversation,

    #[error("input {input:?} does not match an offered choice")]
    InvalidChoice { input: String },
}
