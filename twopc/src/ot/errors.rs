use crypto_core::CryptoError;

#[derive(Debug, thiserror::Error)]
pub enum OtError {
    #[error("group element outside the expected subgroup")]
    Group,

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("unexpected {0} message during transfer")]
    UnexpectedMessage(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
