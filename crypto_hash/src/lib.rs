//! 可插拔的消息摘要原语.
//!
//! 签名核心只通过`DigestX`使用摘要算法, 摘要长度`hLen`由`digest_bits_x`给出.
//! 具体算法来自RustCrypto的`sha1`/`sha2`/`sha3`, 运行时由`HasherType`选择.

mod error;
pub use error::HashError;

mod builder;
pub use builder::{Hasher, HasherType};

pub use sha1::Sha1;
pub use sha2::{Sha224, Sha256, Sha384, Sha512};
pub use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};

pub trait DigestX {
    /// 摘要的位长度
    fn digest_bits_x(&self) -> usize;
    fn write_x(&mut self, data: &[u8]);
    /// 输出摘要并重置到初始状态
    fn finish_x(&mut self) -> Vec<u8>;
    fn reset_x(&mut self);

    /// 摘要的字节长度`hLen`
    fn digest_len_x(&self) -> usize {
        (self.digest_bits_x() + 7) >> 3
    }

    /// 丢弃已写入的数据, 计算`data`的摘要
    fn digest_x(&mut self, data: &[u8]) -> Vec<u8> {
        self.reset_x();
        self.write_x(data);
        self.finish_x()
    }
}

impl<T: DigestX + ?Sized> DigestX for &mut T {
    fn digest_bits_x(&self) -> usize {
        (**self).digest_bits_x()
    }

    fn write_x(&mut self, data: &[u8]) {
        (**self).write_x(data)
    }

    fn finish_x(&mut self) -> Vec<u8> {
        (**self).finish_x()
    }

    fn reset_x(&mut self) {
        (**self).reset_x()
    }
}

macro_rules! impl_digest_x {
    ($($NAME: ty),+) => {
        $(
            impl DigestX for $NAME {
                fn digest_bits_x(&self) -> usize {
                    <$NAME as digest::Digest>::output_size() << 3
                }

                fn write_x(&mut self, data: &[u8]) {
                    digest::Digest::update(self, data)
                }

                fn finish_x(&mut self) -> Vec<u8> {
                    digest::Digest::finalize_reset(self).to_vec()
                }

                fn reset_x(&mut self) {
                    digest::Digest::reset(self)
                }
            }
        )+
    };
}

impl_digest_x!(Sha1, Sha224, Sha256, Sha384, Sha512, Sha3_224, Sha3_256, Sha3_384, Sha3_512);

#[cfg(test)]
mod tests {
    use crate::{DigestX, Sha256, Sha3_256};

    #[test]
    fn digest_x() {
        let mut h = Sha256::default();
        assert_eq!(h.digest_bits_x(), 256);
        assert_eq!(h.digest_len_x(), 32);
        assert_eq!(
            hex::encode(h.digest_x(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );

        h.write_x(b"a");
        h.write_x(b"bc");
        assert_eq!(
            hex::encode(h.finish_x()),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );

        let mut h = Sha3_256::default();
        assert_eq!(
            hex::encode(h.digest_x(b"")),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }
}
