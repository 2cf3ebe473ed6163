use crypto_hash::HashError;
use std::{error::Error, fmt::Display};
use utils::ArithError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CipherError {
    /// 不合法的模数位长度
    InvalidKeySize { min: usize, real: usize },

    /// 密钥生成的重试次数耗尽
    PrimeGenerationFailure(String),

    /// 模数太短, 无法容纳摘要和盐值
    EncodingError(String),

    /// 签名长度错误或签名代表超出范围
    MalformedSignature(String),

    ValidateFailed(String),

    InvalidPublicKey(String),

    InvalidPrivateKey(String),

    Arith(ArithError),

    Hash(HashError),
}

impl Display for CipherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKeySize { min, real } => f.write_fmt(format_args!(
                "Invalid key size `{real}`, need an even bit length not less than `{min}`"
            )),
            Self::PrimeGenerationFailure(s) => {
                f.write_fmt(format_args!("prime generation failure: {s}"))
            }
            Self::EncodingError(s) => f.write_fmt(format_args!("encoding error: {s}")),
            Self::MalformedSignature(s) => f.write_fmt(format_args!("malformed signature: {s}")),
            Self::ValidateFailed(s) => f.write_fmt(format_args!("validate failed: {s}")),
            Self::InvalidPublicKey(s) => f.write_fmt(format_args!("invalid public key: {s}")),
            Self::InvalidPrivateKey(s) => f.write_fmt(format_args!("invalid private key: {s}")),
            Self::Arith(e) => Display::fmt(e, f),
            Self::Hash(e) => Display::fmt(e, f),
        }
    }
}

impl Error for CipherError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arith(e) => Some(e),
            Self::Hash(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArithError> for CipherError {
    fn from(value: ArithError) -> Self {
        Self::Arith(value)
    }
}

impl From<HashError> for CipherError {
    fn from(value: HashError) -> Self {
        Self::Hash(value)
    }
}
