mod error;
pub use error::CipherError;

pub use rand::{DefaultRand, Rand, SyncRand};

pub mod rsa;

pub trait Sign {
    // 写入sign之前不清空
    fn sign(&self, msg: &[u8], sign: &mut Vec<u8>) -> Result<(), CipherError>;
}

pub trait Verify {
    /// 签名不匹配时返回`false`, 不返回错误
    fn verify(&self, msg: &[u8], sign: &[u8]) -> bool;
}

pub trait Signer: Sign + Verify {}

impl<T> Signer for T where T: Sign + Verify {}
