use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsensusError {
    #[error("no coding passes provided")]
    NoPassesProvided,

    #[error("agreement fraction must be within (0, 1], got {0}")]
    InvalidAgreementFraction(f64),

    #[error("pass '{persona}' failed: {message}")]
    Producer { persona: String, message: String },

    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[cfg(feature = "http")]
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
}
