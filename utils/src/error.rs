use std::{error::Error, fmt::Display};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArithError {
    /// `gcd(a, m) != 1`, 不存在模逆元
    NoInverse,

    /// `gcd(0, 0)`无定义
    UndefinedGcd,

    /// 整数无法以`len`字节大端序表示
    IntegerTooLarge { len: usize },

    /// 素数的位长度至少为2
    InvalidPrimeBits(usize),

    /// 尝试了`0`个候选数后仍未找到素数
    PrimeSearchExhausted(usize),

    /// 素数搜索被其它任务取消
    PrimeSearchCancelled,
}

impl Display for ArithError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoInverse => f.write_str("no modular inverse, the operands are not coprime"),
            Self::UndefinedGcd => f.write_str("gcd(0, 0) is undefined"),
            Self::IntegerTooLarge { len } => {
                f.write_fmt(format_args!("integer too large to encode in `{len}` bytes"))
            }
            Self::InvalidPrimeBits(bits) => {
                f.write_fmt(format_args!("prime size must be at least 2 bits, got `{bits}`"))
            }
            Self::PrimeSearchExhausted(n) => {
                f.write_fmt(format_args!("no prime found after `{n}` candidates"))
            }
            Self::PrimeSearchCancelled => f.write_str("prime search cancelled"),
        }
    }
}

impl Error for ArithError {}
