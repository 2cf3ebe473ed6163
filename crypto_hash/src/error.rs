use std::{error::Error, fmt::Display};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HashError {
    /// 不支持的摘要算法名或标识号
    UnknownHasher(String),

    /// MGF1输出长度超过$hLen \cdot 2^{32}$
    MaskTooLong { mask_len: usize, limit: u128 },
}

impl Display for HashError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashError::UnknownHasher(s) => {
                f.write_fmt(format_args!("`{s}` is not a supported hash function"))
            }
            HashError::MaskTooLong { mask_len, limit } => f.write_fmt(format_args!(
                "mask length `{mask_len}` exceeds the limit `{limit}`"
            )),
        }
    }
}

impl Error for HashError {}
