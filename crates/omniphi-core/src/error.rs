use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("message decode failed: {0}")]
    MsgDecode(String),

    #[error("message encode failed: {0}")]
    MsgEncode(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
