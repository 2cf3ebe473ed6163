//! = RFC 8017
//!
//! == PKCS #1: RSA Cryptography Specification Version 2.2
//!
//! === PSS(Probabilistic Signature Scheme)
//!
//! ```txt
//! M' = 0x00 * 8 || mHash || salt
//! H = Hash(M')
//! DB = PS || 0x01 || salt, PS = 0x00 * (emLen - sLen - hLen - 2)
//! maskedDB = DB ^ MGF1(H, emLen - hLen - 1)
//! EM = maskedDB || H || 0xbc
//! ```
//!
//! `maskedDB`最高的`8 * emLen - emBits`位被清零, 使得`EM`表示的整数小于模数.

use crate::rsa::mgf::mgf1_xor;
use crate::rsa::{PrivateKey, PublicKey};
use crate::{CipherError, Rand, Sign, Verify};
use crypto_hash::DigestX;
use log::trace;
use num_bigint::BigUint;
use std::cell::RefCell;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use subtle::ConstantTimeEq;
use utils::BigUintExt;
#[cfg(feature = "sec-zeroize")]
use zeroize::Zeroize;

const TRAILER: u8 = 0xbc;

/// 盐值长度
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SaltLen {
    /// `sLen = hLen`
    #[default]
    Digest,
    /// `sLen = emLen - hLen - 2`
    Max,
    Fixed(usize),
}

impl SaltLen {
    pub fn resolve(self, em_len: usize, h_len: usize) -> usize {
        match self {
            SaltLen::Digest => h_len,
            SaltLen::Max => em_len.saturating_sub(h_len + 2),
            SaltLen::Fixed(x) => x,
        }
    }
}

impl FromStr for SaltLen {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "digest" | "hash" => Ok(Self::Digest),
            "max" | "auto" => Ok(Self::Max),
            x => x.parse::<usize>().map(Self::Fixed).map_err(|_| {
                CipherError::EncodingError(format!(
                    "`{s}` is not a salt length, expect `digest`, `max` or a number"
                ))
            }),
        }
    }
}

impl Display for SaltLen {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SaltLen::Digest => f.write_str("digest"),
            SaltLen::Max => f.write_str("max"),
            SaltLen::Fixed(x) => write!(f, "{x}"),
        }
    }
}

fn em_len_of(em_bits: usize) -> usize {
    (em_bits + 7) >> 3
}

/// H = Hash(0x00 * 8 || mHash || salt)
fn hash_m_prime<H: DigestX>(hf: &mut H, m_hash: &[u8], salt: &[u8]) -> Vec<u8> {
    hf.reset_x();
    hf.write_x([0u8; 8].as_slice());
    hf.write_x(m_hash);
    hf.write_x(salt);
    hf.finish_x()
}

/// EMSA-PSS-ENCODE, 盐值由`rng`生成.
pub fn emsa_pss_encode<H: DigestX, R: Rand>(
    hf: &mut H,
    m_hash: &[u8],
    em_bits: usize,
    salt_len: usize,
    rng: &mut R,
) -> Result<Vec<u8>, CipherError> {
    check_em_len(em_len_of(em_bits), hf.digest_len_x(), salt_len)
        .map_err(CipherError::EncodingError)?;

    let mut salt = vec![0u8; salt_len];
    rng.rand(salt.as_mut_slice());
    let em = emsa_pss_encode_with_salt(hf, m_hash, em_bits, salt.as_slice());
    #[cfg(feature = "sec-zeroize")]
    salt.zeroize();

    em
}

/// EMSA-PSS-ENCODE, 使用给定的盐值.
pub fn emsa_pss_encode_with_salt<H: DigestX>(
    hf: &mut H,
    m_hash: &[u8],
    em_bits: usize,
    salt: &[u8],
) -> Result<Vec<u8>, CipherError> {
    let (em_len, h_len, s_len) = (em_len_of(em_bits), hf.digest_len_x(), salt.len());
    if m_hash.len() != h_len {
        return Err(CipherError::EncodingError(format!(
            "pss: message digest length `{}` not match to hash length `{h_len}`",
            m_hash.len()
        )));
    }
    check_em_len(em_len, h_len, s_len).map_err(CipherError::EncodingError)?;

    let h = hash_m_prime(hf, m_hash, salt);

    // em = maskedDB || H || 0xbc
    // db = ps || 0x01 || salt
    let db_len = em_len - h_len - 1;
    let mut em = vec![0u8; em_len];
    em[db_len - s_len - 1] = 0x01;
    em[(db_len - s_len)..db_len].copy_from_slice(salt);
    em[db_len..(em_len - 1)].copy_from_slice(h.as_slice());
    em[em_len - 1] = TRAILER;

    let (db, tail) = em.split_at_mut(db_len);
    if let Err(e) = mgf1_xor(hf, &tail[..h_len], db) {
        #[cfg(feature = "sec-zeroize")]
        em.zeroize();
        return Err(e.into());
    }
    em[0] &= 0xffu8 >> ((em_len << 3) - em_bits);

    Ok(em)
}

/// EMSA-PSS-VERIFY, `em`的长度必须为$\lceil emBits / 8 \rceil$.
pub fn emsa_pss_verify<H: DigestX>(
    hf: &mut H,
    m_hash: &[u8],
    em: &[u8],
    em_bits: usize,
    salt_len: usize,
) -> Result<(), CipherError> {
    let (em_len, h_len) = (em_len_of(em_bits), hf.digest_len_x());

    if m_hash.len() != h_len {
        return Err(CipherError::ValidateFailed(
            "pss: invalid message digest length".to_string(),
        ));
    } else if em.len() != em_len {
        return Err(CipherError::ValidateFailed(
            "pss: invalid encoded message length".to_string(),
        ));
    }
    check_em_len(em_len, h_len, salt_len).map_err(CipherError::ValidateFailed)?;

    if em[em_len - 1] != TRAILER {
        return Err(CipherError::ValidateFailed(
            "pss: invalid tail flag".to_string(),
        ));
    }

    let zero_bits = (em_len << 3) - em_bits;
    let db_len = em_len - h_len - 1;
    let (masked_db, h) = (&em[..db_len], &em[db_len..(em_len - 1)]);
    if masked_db[0] & !(0xffu8 >> zero_bits) != 0 {
        return Err(CipherError::ValidateFailed(
            "pss: invalid head tag".to_string(),
        ));
    }

    let mut db = masked_db.to_vec();
    mgf1_xor(hf, h, db.as_mut_slice())?;
    db[0] &= 0xffu8 >> zero_bits;

    // db = ps || 0x01 || salt
    let ps_len = db_len - salt_len - 1;
    let res = if db[..ps_len].iter().any(|&x| x != 0) {
        Err(CipherError::ValidateFailed(
            "pss: invalid db head".to_string(),
        ))
    } else if db[ps_len] != 0x01 {
        Err(CipherError::ValidateFailed(
            "pss: invalid db body".to_string(),
        ))
    } else {
        let h2 = hash_m_prime(hf, m_hash, &db[(ps_len + 1)..]);
        if bool::from(h2.as_slice().ct_eq(h)) {
            Ok(())
        } else {
            Err(CipherError::ValidateFailed(
                "pss: invalid signature".to_string(),
            ))
        }
    };

    #[cfg(feature = "sec-zeroize")]
    db.zeroize();

    res
}

fn check_em_len(em_len: usize, h_len: usize, s_len: usize) -> Result<(), String> {
    match h_len.checked_add(s_len).and_then(|x| x.checked_add(2)) {
        Some(x) if x <= em_len => Ok(()),
        _ => Err(format!(
            "pss: the modulus is too short for hash length `{h_len}` and salt length `{s_len}`"
        )),
    }
}

pub struct PSSVerify<H: DigestX> {
    key: PublicKey,
    salt_len: SaltLen,
    hf: RefCell<H>,
}

pub struct PSSSign<H: DigestX, R: Rand> {
    key: PrivateKey,
    pss: PSSVerify<H>,
    rd: RefCell<R>,
}

impl<H: DigestX, R: Rand> AsRef<PSSVerify<H>> for PSSSign<H, R> {
    fn as_ref(&self) -> &PSSVerify<H> {
        &self.pss
    }
}

impl<H: DigestX> AsRef<PublicKey> for PSSVerify<H> {
    fn as_ref(&self) -> &PublicKey {
        &self.key
    }
}

impl<H: DigestX, R: Rand> AsRef<PrivateKey> for PSSSign<H, R> {
    fn as_ref(&self) -> &PrivateKey {
        &self.key
    }
}

impl<H: DigestX, R: Rand> From<PSSSign<H, R>> for PSSVerify<H> {
    fn from(value: PSSSign<H, R>) -> Self {
        value.pss
    }
}

impl<H: DigestX> PSSVerify<H> {
    /// `hasher`: message digest generator;
    /// `salt_len`: 盐值长度, 每次验证时根据模数长度计算.
    pub fn new(key: PublicKey, hasher: H, salt_len: SaltLen) -> Result<Self, CipherError> {
        key.is_valid()?;
        Ok(Self {
            key,
            salt_len,
            hf: RefCell::new(hasher),
        })
    }

    pub fn salt_len(&self) -> usize {
        self.salt_len.resolve(self.em_len(), self.hash_len())
    }

    /// 签名的字节长度
    pub fn key_len(&self) -> usize {
        self.key.key_len()
    }

    pub fn key_bits(&self) -> usize {
        self.key.modulus_bits()
    }

    pub fn em_len(&self) -> usize {
        self.key.em_len()
    }

    /// 编码消息的位数
    pub fn em_bits(&self) -> usize {
        self.key.em_bits()
    }

    pub fn hash_len(&self) -> usize {
        self.hf.borrow().digest_len_x()
    }

    fn verify_inner(&self, msg: &[u8], signature: &[u8]) -> Result<(), CipherError> {
        if signature.len() != self.key_len() {
            return Err(CipherError::MalformedSignature(format!(
                "pss: signature length `{}` not match to key length `{}`",
                signature.len(),
                self.key_len()
            )));
        }

        let s = BigUintExt::<BigUint>::os2ip(signature);
        let m = self.key.rsavp1(&s)?;
        let em = BigUintExt(&m)
            .i2osp(self.em_len())
            .map_err(|e| CipherError::MalformedSignature(e.to_string()))?;

        let salt_len = self.salt_len();
        let mut hf = self.hf.borrow_mut();
        let m_hash = hf.digest_x(msg);
        emsa_pss_verify(&mut *hf, m_hash.as_slice(), em.as_slice(), self.em_bits(), salt_len)
    }
}

impl<H: DigestX, R: Rand> PSSSign<H, R> {
    /// `hasher`: message digest generator;
    /// `rng`: 生成盐值的随机源;
    /// `salt_len`: 盐值长度, 每次签名时根据模数长度计算, 模数太短时签名返回`CipherError::EncodingError`.
    pub fn new(key: PrivateKey, hasher: H, rng: R, salt_len: SaltLen) -> Result<Self, CipherError> {
        let pss = PSSVerify::new(key.public_key(), hasher, salt_len)?;
        Ok(Self {
            key,
            pss,
            rd: RefCell::new(rng),
        })
    }

    pub fn salt_len(&self) -> usize {
        self.pss.salt_len()
    }

    pub fn key_len(&self) -> usize {
        self.pss.key_len()
    }

    pub fn key_bits(&self) -> usize {
        self.pss.key_bits()
    }

    pub fn em_len(&self) -> usize {
        self.pss.em_len()
    }

    pub fn em_bits(&self) -> usize {
        self.pss.em_bits()
    }

    pub fn hash_len(&self) -> usize {
        self.pss.hash_len()
    }

    fn sign_inner(&self, msg: &[u8], signature: &mut Vec<u8>) -> Result<(), CipherError> {
        let salt_len = self.salt_len();
        let mut em = {
            let (mut hf, mut rd) = (self.pss.hf.borrow_mut(), self.rd.borrow_mut());
            let m_hash = hf.digest_x(msg);
            emsa_pss_encode(
                &mut *hf,
                m_hash.as_slice(),
                self.em_bits(),
                salt_len,
                &mut *rd,
            )?
        };

        let m = BigUintExt::<BigUint>::os2ip(em.as_slice());
        #[cfg(feature = "sec-zeroize")]
        em.zeroize();
        #[cfg(not(feature = "sec-zeroize"))]
        em.clear();

        let s = self.key.rsasp1(&m)?;
        let start = signature.len();
        signature.resize(start + self.key_len(), 0);
        BigUintExt(&s).i2osp_into(&mut signature[start..])?;
        Ok(())
    }
}

impl<H: DigestX> Verify for PSSVerify<H> {
    fn verify(&self, msg: &[u8], sign: &[u8]) -> bool {
        match self.verify_inner(msg, sign) {
            Ok(()) => true,
            Err(e) => {
                trace!("{e}");
                false
            }
        }
    }
}

impl<H: DigestX, R: Rand> Verify for PSSSign<H, R> {
    fn verify(&self, msg: &[u8], sign: &[u8]) -> bool {
        self.pss.verify(msg, sign)
    }
}

impl<H: DigestX, R: Rand> Sign for PSSSign<H, R> {
    fn sign(&self, msg: &[u8], sign: &mut Vec<u8>) -> Result<(), CipherError> {
        self.sign_inner(msg, sign)
    }
}
