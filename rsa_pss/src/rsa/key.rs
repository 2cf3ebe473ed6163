//! RSA公私钥及原始RSA变换(RFC 8017 5.2 RSASP1/RSAVP1)
use crate::CipherError;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use utils::BigUintExt;

#[derive(Clone, Debug, PartialOrd, PartialEq, Ord, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    // n = p * q
    n: BigUint,
    // public exponent, gcd(e, lcm(p-1, q-1)) = 1
    e: BigUint,
}

/// 私钥不保存素因子`p, q`, 私钥运算直接计算$c^d \mod n$.
#[derive(Clone, Serialize, Deserialize)]
pub struct PrivateKey {
    n: BigUint,
    e: BigUint,
    // d * e = 1 % lcm(p-1, q-1)
    d: BigUint,
}

impl PublicKey {
    /// note: not to check the `n` and `e` are right RSA parameters
    pub fn new_uncheck(n: BigUint, e: BigUint) -> Self {
        Self { n, e }
    }

    pub fn new(n: BigUint, e: BigUint) -> Result<Self, CipherError> {
        let key = Self::new_uncheck(n, e);
        key.is_valid()?;
        Ok(key)
    }

    /// n
    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    /// e
    pub fn exponent(&self) -> &BigUint {
        &self.e
    }

    /// modBits
    pub fn modulus_bits(&self) -> usize {
        self.n.bits() as usize
    }

    /// 签名的字节长度$k = \lceil modBits / 8 \rceil$
    pub fn key_len(&self) -> usize {
        (self.modulus_bits() + 7) >> 3
    }

    /// 编码消息的位数$emBits = modBits - 1$
    pub fn em_bits(&self) -> usize {
        self.modulus_bits().saturating_sub(1)
    }

    /// $emLen = \lceil (modBits - 1) / 8 \rceil$
    pub fn em_len(&self) -> usize {
        (self.em_bits() + 7) >> 3
    }

    /// RSAVP1: $m = s^e \mod n$
    pub fn rsavp1(&self, s: &BigUint) -> Result<BigUint, CipherError> {
        if s < &self.n {
            Ok(BigUintExt(s).modpow(&self.e, &self.n))
        } else {
            Err(CipherError::MalformedSignature(
                "rsavp1: signature representative out of range".to_string(),
            ))
        }
    }

    pub fn is_valid(&self) -> Result<(), CipherError> {
        if self.n <= BigUint::one() || self.n.is_even() {
            Err(CipherError::InvalidPublicKey(
                "rsa: the modulus must be an odd number greater than 1".to_string(),
            ))
        } else if self.e < BigUint::from(3u8) || self.e.is_even() {
            Err(CipherError::InvalidPublicKey(format!(
                "rsa: invalid public exponent {:#x}",
                self.e
            )))
        } else if self.e >= self.n {
            Err(CipherError::InvalidPublicKey(
                "rsa: public exponent is not less than the modulus".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl PrivateKey {
    /// note: not to check the `n`, `e` and `d` are right RSA parameters
    pub fn new_uncheck(n: BigUint, e: BigUint, d: BigUint) -> Self {
        Self { n, e, d }
    }

    pub fn new(n: BigUint, e: BigUint, d: BigUint) -> Result<Self, CipherError> {
        let key = Self::new_uncheck(n, e, d);
        key.is_valid()?;
        Ok(key)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::new_uncheck(self.n.clone(), self.e.clone())
    }

    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    pub fn public_exponent(&self) -> &BigUint {
        &self.e
    }

    pub fn private_exponent(&self) -> &BigUint {
        &self.d
    }

    pub fn modulus_bits(&self) -> usize {
        self.n.bits() as usize
    }

    /// RSASP1: $s = m^d \mod n$
    ///
    /// 迭代次数固定为`modBits`, 与`d`的实际位长度无关.
    pub fn rsasp1(&self, m: &BigUint) -> Result<BigUint, CipherError> {
        if m < &self.n {
            Ok(BigUintExt(m).modpow_with_width(&self.d, &self.n, self.n.bits()))
        } else {
            Err(CipherError::EncodingError(
                "rsasp1: message representative out of range".to_string(),
            ))
        }
    }

    /// 没有素因子时无法完整校验, 这里检查公钥部分, `0 < d < n`, 以及$(2^e)^d \equiv 2 \mod n$.
    pub fn is_valid(&self) -> Result<(), CipherError> {
        self.public_key()
            .is_valid()
            .map_err(|e| CipherError::InvalidPrivateKey(e.to_string()))?;

        if self.d.is_zero() || self.d >= self.n {
            return Err(CipherError::InvalidPrivateKey(
                "rsa: private exponent out of range".to_string(),
            ));
        }

        let m = BigUint::from(2u8);
        let c = BigUintExt(&m).modpow(&self.e, &self.n);
        if BigUintExt(&c).modpow(&self.d, &self.n) != m {
            return Err(CipherError::InvalidPrivateKey(
                "rsa: private exponent does not match the public key".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(feature = "sec-zeroize-drop")]
impl Drop for PrivateKey {
    fn drop(&mut self) {
        super::wipe(&mut self.d);
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{n={:#x}, e={:#x}}}", self.n, self.e)
    }
}

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("n", &self.n)
            .field("e", &self.e)
            .finish_non_exhaustive()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n && self.e == other.e && self.d == other.d
    }
}

impl Eq for PrivateKey {}

#[cfg(test)]
mod tests {
    use crate::rsa::{PrivateKey, PublicKey};
    use crate::CipherError;
    use num_bigint::BigUint;
    use num_traits::Num;

    fn big(s: &str) -> BigUint {
        BigUint::from_str_radix(s, 10).unwrap()
    }

    // gnutls test key
    fn small_key() -> PrivateKey {
        PrivateKey::new_uncheck(
            big("290684273230919398108010081414538931343"),
            BigUint::from(65537u32),
            big("31877380284581499213530787347443987241"),
        )
    }

    #[test]
    fn key_basics() {
        let key = small_key();
        key.is_valid().unwrap();
        let pk = key.public_key();
        pk.is_valid().unwrap();
        assert_eq!(pk.modulus_bits(), 128);
        assert_eq!(pk.key_len(), 16);
        assert_eq!(pk.em_bits(), 127);
        assert_eq!(pk.em_len(), 16);

        let m = BigUint::from(42u32);
        let s = key.rsasp1(&m).unwrap();
        assert_eq!(pk.rsavp1(&s).unwrap(), m);
        assert_eq!(s, m.modpow(key.private_exponent(), key.modulus()));
    }

    #[test]
    fn primitive_range() {
        let key = small_key();
        let pk = key.public_key();
        let n = pk.modulus().clone();
        assert!(matches!(
            pk.rsavp1(&n),
            Err(CipherError::MalformedSignature(_))
        ));
        assert!(matches!(
            key.rsasp1(&(&n + 1u32)),
            Err(CipherError::EncodingError(_))
        ));
    }

    #[test]
    fn invalid_keys() {
        let cases = [
            (BigUint::from(1u32), BigUint::from(3u32)),
            (BigUint::from(3233u32 + 1), BigUint::from(17u32)),
            (BigUint::from(3233u32), BigUint::from(1u32)),
            (BigUint::from(3233u32), BigUint::from(16u32)),
            (BigUint::from(3233u32), BigUint::from(3235u32)),
        ];
        for (n, e) in cases {
            assert!(PublicKey::new(n, e).is_err());
        }
        // 3233 = 61 * 53, lcm(60, 52) = 780, 17 * 413 = 7021 = 9 * 780 + 1
        PrivateKey::new(
            BigUint::from(3233u32),
            BigUint::from(17u32),
            BigUint::from(413u32),
        )
        .unwrap();
        assert!(matches!(
            PrivateKey::new(
                BigUint::from(3233u32),
                BigUint::from(17u32),
                BigUint::from(415u32)
            ),
            Err(CipherError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn debug_hides_private_exponent() {
        let key = small_key();
        let s = format!("{:?}", key);
        assert!(!s.contains(&key.private_exponent().to_string()));
    }
}
