//! RSA-PSS
//!
//! - 随机选择两个质数$p$和$q$($p\neq q$), 则模数$n=p*q$. 模数的字节长度$k$满足: $2^{(k-1)*8}\le n \lt 2^{k*8}$;
//! - $\lambda(n) = lcm(p-1, q-1)$, 公钥指数$e$满足$gcd(e, \lambda(n)) = 1$;
//! - 私钥指数$d$满足: $d*e \equiv 1 \mod \lambda(n)$;
//!
//! 签名: $s = EM^d \mod n$, `EM`为消息摘要的PSS编码;
//!
//! 验证: $EM = s^e \mod n$, 再检查`EM`的PSS编码.
//!

use crate::{CipherError, Rand, Sign, Verify};
use crypto_hash::HasherType;

mod key;
pub use key::{PrivateKey, PublicKey};

mod keygen;
pub use keygen::KeyGenerator;

mod flag;

mod mgf;
pub use mgf::{mgf1, mgf1_xor};

mod pss;
pub use pss::{
    emsa_pss_encode, emsa_pss_encode_with_salt, emsa_pss_verify, PSSSign, PSSVerify, SaltLen,
};


/// 生成`bits`位模数的密钥对, 其它参数取默认值
pub fn generate_key_pair<R: Rand + Send>(
    bits: usize,
    rng: &mut R,
) -> Result<(PublicKey, PrivateKey), CipherError> {
    KeyGenerator::new(bits).generate(rng)
}

/// 使用`hasher`和`sLen = hLen`签名
pub fn sign<R: Rand>(
    key: &PrivateKey,
    hasher: HasherType,
    msg: &[u8],
    rng: R,
) -> Result<Vec<u8>, CipherError> {
    let signer = PSSSign::new(key.clone(), hasher.hasher(), rng, SaltLen::Digest)?;
    let mut sig = Vec::with_capacity(signer.key_len());
    signer.sign(msg, &mut sig)?;
    Ok(sig)
}

/// 使用`hasher`和`sLen = hLen`验证, 签名不合法时返回`false`
pub fn verify(key: &PublicKey, hasher: HasherType, msg: &[u8], signature: &[u8]) -> bool {
    PSSVerify::new(key.clone(), hasher.hasher(), SaltLen::Digest)
        .map(|v| v.verify(msg, signature))
        .unwrap_or(false)
}

// 从低位开始逐位清零, 覆盖原有的存储
#[cfg(feature = "sec-zeroize-drop")]
fn wipe(x: &mut num_bigint::BigUint) {
    for i in 0..x.bits() {
        x.set_bit(i, false);
    }
}
