use crate::{DigestX, HashError};
use digest::DynDigest;
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

macro_rules! impl_hasher_type {
    ($NAME: ident, $([$ITEM: tt $(=$VAL: literal)?, $STR: literal, $IMPL: ty]),+) => {
        #[repr(u32)]
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum $NAME {
            $($ITEM $(=$VAL)?,)+
        }

        impl $NAME {
            pub const ALL: &'static [$NAME] = &[$(Self::$ITEM,)+];

            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$ITEM => $STR,)+
                }
            }

            /// 该算法的一个新实例
            pub fn hasher(self) -> Hasher {
                let inner: Box<dyn DynDigest + Send> = match self {
                    $(Self::$ITEM => Box::<$IMPL>::default(),)+
                };
                Hasher { ty: self, inner }
            }
        }

        impl TryFrom<u32> for $NAME {
            type Error = HashError;

            fn try_from(value: u32) -> Result<Self, Self::Error> {
                match value {
                    $(x if x == Self::$ITEM as u32 => Ok(Self::$ITEM),)+
                    _ => Err(HashError::UnknownHasher(format!("{value:#x}"))),
                }
            }
        }

        impl FromStr for $NAME {
            type Err = HashError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lower = s.trim().to_ascii_lowercase();
                match lower.as_str() {
                    $($STR => Ok(Self::$ITEM),)+
                    _ => Err(HashError::UnknownHasher(s.to_string())),
                }
            }
        }

    };
}

impl_hasher_type!(
    HasherType,
    [SHA1 = 0x20, "sha1", sha1::Sha1],
    [SHA2_224, "sha2-224", sha2::Sha224],
    [SHA2_256, "sha2-256", sha2::Sha256],
    [SHA2_384, "sha2-384", sha2::Sha384],
    [SHA2_512, "sha2-512", sha2::Sha512],
    [SHA3_224 = 0x30, "sha3-224", sha3::Sha3_224],
    [SHA3_256, "sha3-256", sha3::Sha3_256],
    [SHA3_384, "sha3-384", sha3::Sha3_384],
    [SHA3_512, "sha3-512", sha3::Sha3_512]
);

impl HasherType {
    /// 摘要字节长度`hLen`
    pub fn digest_len(self) -> usize {
        self.hasher().digest_len_x()
    }
}

impl Default for HasherType {
    fn default() -> Self {
        Self::SHA3_256
    }
}

impl Display for HasherType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 运行时选择的摘要算法
pub struct Hasher {
    ty: HasherType,
    inner: Box<dyn DynDigest + Send>,
}

impl Hasher {
    pub fn hasher_type(&self) -> HasherType {
        self.ty
    }
}

impl From<HasherType> for Hasher {
    fn from(value: HasherType) -> Self {
        value.hasher()
    }
}

impl Clone for Hasher {
    fn clone(&self) -> Self {
        // a fresh instance, pending input is not carried over
        self.ty.hasher()
    }
}

impl DigestX for Hasher {
    fn digest_bits_x(&self) -> usize {
        self.inner.output_size() << 3
    }

    fn write_x(&mut self, data: &[u8]) {
        self.inner.update(data)
    }

    fn finish_x(&mut self) -> Vec<u8> {
        self.inner.finalize_reset().into_vec()
    }

    fn reset_x(&mut self) {
        self.inner.reset()
    }
}
