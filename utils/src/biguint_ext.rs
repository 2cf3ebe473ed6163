use crate::ArithError;
use num_bigint::{BigInt, BigUint};
use num_traits::{Euclid, One, Zero};
use rand::Rand;
use std::borrow::Borrow;
use std::ops::Deref;
#[cfg(feature = "sec-zeroize")]
use zeroize::Zeroize;

/// 大整数运算扩展: 模幂, 最大公约数, 模逆, 定长大端序编解码(I2OSP/OS2IP), 随机数生成.
pub struct BigUintExt<T: Borrow<BigUint>>(pub T);

impl<T: Borrow<BigUint>> Deref for BigUintExt<T> {
    type Target = BigUint;
    fn deref(&self) -> &Self::Target {
        self.0.borrow()
    }
}

impl<T: Borrow<BigUint>> BigUintExt<T> {
    /// $self^{exp} \mod modulus$
    ///
    /// Montgomery ladder: 每一位都做一次乘法和一次平方, 分支结构与指数位无关.
    /// 迭代次数等于`exp`的位长度, 私钥运算需使用`modpow_with_width`固定迭代次数.
    ///
    /// panic: `modulus == 0`
    pub fn modpow(&self, exp: &BigUint, modulus: &BigUint) -> BigUint {
        self.modpow_with_width(exp, modulus, 0)
    }

    /// 同`modpow`, 迭代`max(width, exp.bits())`次, 使运算时间不依赖于指数的实际位长度.
    pub fn modpow_with_width(&self, exp: &BigUint, modulus: &BigUint, width: u64) -> BigUint {
        assert!(!modulus.is_zero(), "modpow: the modulus is zero");
        if modulus.is_one() {
            return BigUint::zero();
        }

        let width = width.max(exp.bits());
        let (mut r0, mut r1) = (BigUint::one(), self.deref() % modulus);
        for i in (0..width).rev() {
            // r1 = r0 * base
            if exp.bit(i) {
                r0 = (&r0 * &r1) % modulus;
                r1 = (&r1 * &r1) % modulus;
            } else {
                r1 = (&r0 * &r1) % modulus;
                r0 = (&r0 * &r0) % modulus;
            }
        }

        r0
    }

    /// 欧几里得算法, `gcd(0, 0)`返回`ArithError::UndefinedGcd`
    pub fn gcd(&self, other: &BigUint) -> Result<BigUint, ArithError> {
        let (mut a, mut b) = (self.deref().clone(), other.clone());
        if a.is_zero() && b.is_zero() {
            return Err(ArithError::UndefinedGcd);
        }

        while !b.is_zero() {
            let r = &a % &b;
            a = std::mem::replace(&mut b, r);
        }

        Ok(a)
    }

    /// $lcm(a, b) = a / gcd(a, b) * b$
    pub fn lcm(&self, other: &BigUint) -> Result<BigUint, ArithError> {
        let g = self.gcd(other)?;
        Ok(self.deref() / g * other)
    }

    /// 扩展欧几里得算法求$self^{-1} \mod modulus$.
    ///
    /// 维持不变式: $old_r \equiv old_s \cdot self \pmod{modulus}$, 结束时$old_r = gcd(self, modulus)$.
    pub fn modinv(&self, modulus: &BigUint) -> Result<BigUint, ArithError> {
        if modulus.is_zero() {
            return Err(ArithError::NoInverse);
        } else if modulus.is_one() {
            return Ok(BigUint::zero());
        }

        let m = BigInt::from(modulus.clone());
        let (mut old_r, mut r) = (BigInt::from(self.deref() % modulus), m.clone());
        let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());

        while !r.is_zero() {
            let q = &old_r / &r;
            let next_r = &old_r - &q * &r;
            old_r = std::mem::replace(&mut r, next_r);
            let next_s = &old_s - &q * &s;
            old_s = std::mem::replace(&mut s, next_s);
        }

        if !old_r.is_one() {
            return Err(ArithError::NoInverse);
        }

        let (_, inv) = old_s.rem_euclid(&m).into_parts();
        Ok(inv)
    }

    /// I2OSP: 转换为`len`字节的大端序字节串, 高位补0.
    pub fn i2osp(&self, len: usize) -> Result<Vec<u8>, ArithError> {
        let mut out = vec![0u8; len];
        self.i2osp_into(out.as_mut_slice())?;
        Ok(out)
    }

    /// 同`i2osp`, 写入`out`, `len = out.len()`.
    pub fn i2osp_into(&self, out: &mut [u8]) -> Result<(), ArithError> {
        let len = out.len();
        if self.bits() as usize > len << 3 {
            return Err(ArithError::IntegerTooLarge { len });
        }

        out.fill(0);
        if !self.is_zero() {
            let mut be = self.to_bytes_be();
            out[(len - be.len())..].copy_from_slice(be.as_slice());
            #[cfg(feature = "sec-zeroize")]
            be.zeroize();
        }

        Ok(())
    }

    /// 生成[0..self)之间的均匀随机数
    ///
    /// panic: `self == 0`
    pub fn gen_random<R: Rand>(&self, rng: &mut R) -> BigUint {
        assert!(!self.is_zero(), "gen_random: empty range");
        let bits = self.bits() as usize;
        let mut n = vec![0u8; (bits + 7) >> 3];
        let extra = (n.len() << 3) - bits;

        loop {
            rng.rand(n.as_mut_slice());
            n[0] &= 0xffu8 >> extra;
            let r = BigUint::from_bytes_be(n.as_slice());
            if self.deref() > &r {
                #[cfg(feature = "sec-zeroize")]
                n.zeroize();
                return r;
            }
        }
    }
}

impl BigUintExt<BigUint> {
    /// OS2IP: 大端序字节串转换为非负整数
    pub fn os2ip(bytes: &[u8]) -> BigUint {
        BigUint::from_bytes_be(bytes)
    }

    /// 生成恰好`bits`位的随机数, 即第`bits-1`位为1. `bits == 0`时返回0.
    pub fn random_bits<R: Rand>(bits: usize, rng: &mut R) -> BigUint {
        if bits == 0 {
            return BigUint::zero();
        }

        let mut buf = vec![0u8; (bits + 7) >> 3];
        let extra = (buf.len() << 3) - bits;
        rng.rand(buf.as_mut_slice());
        buf[0] &= 0xffu8 >> extra;
        buf[0] |= 0x80u8 >> extra;

        let n = BigUint::from_bytes_be(buf.as_slice());
        #[cfg(feature = "sec-zeroize")]
        buf.zeroize();
        n
    }
}

#[cfg(test)]
mod tests {
    use crate::{ArithError, BigUintExt};
    use num_bigint::BigUint;
    use num_traits::{Num, One, Zero};
    use rand::DefaultRand;

    fn big(s: &str) -> BigUint {
        BigUint::from_str_radix(s, 10).expect("can't convert str to big uint")
    }

    #[test]
    fn modpow() {
        // (base, exp, modulus, out)
        let cases = [
            ("4", "13", "497", "445"),
            ("2", "10", "1000", "24"),
            ("3", "0", "7", "1"),
            ("0", "5", "7", "0"),
            ("5", "3", "1", "0"),
            ("2", "1000000006", "1000000007", "1"),
        ];

        for (b, e, m, out) in cases {
            let (b, e, m) = (big(b), big(e), big(m));
            assert_eq!(BigUintExt(&b).modpow(&e, &m), big(out), "{b}^{e} mod {m}");
            assert_eq!(BigUintExt(&b).modpow(&e, &m), b.modpow(&e, &m));
        }
    }

    #[test]
    fn modpow_fixed_width() {
        let (m, mut rng) = (
            big("94560208308847015747498523884063394671606671904944666360068158221458669711639"),
            DefaultRand::default(),
        );
        for _ in 0..8 {
            let (b, e) = (BigUintExt(&m).gen_random(&mut rng), BigUintExt(&m).gen_random(&mut rng));
            assert_eq!(
                BigUintExt(&b).modpow_with_width(&e, &m, m.bits()),
                b.modpow(&e, &m)
            );
        }
        assert!(BigUintExt(BigUint::from(9u8))
            .modpow_with_width(&BigUint::zero(), &m, 256)
            .is_one());
    }

    #[test]
    fn gcd() {
        let cases = [(0u32, 5u32, 5u32), (12, 18, 6), (17, 5, 1), (65537, 0, 65537)];
        for (a, b, g) in cases {
            let a = BigUint::from(a);
            assert_eq!(BigUintExt(&a).gcd(&BigUint::from(b)), Ok(BigUint::from(g)));
        }

        assert_eq!(
            BigUintExt(BigUint::zero()).gcd(&BigUint::zero()),
            Err(ArithError::UndefinedGcd)
        );
        assert_eq!(
            BigUintExt(BigUint::from(4u8)).lcm(&BigUint::from(6u8)),
            Ok(BigUint::from(12u8))
        );
    }

    #[test]
    fn mod_inv() {
        // the test cases come from the int_test.go in the golang source code
        let cases = [
            ("1234567", "458948883992"),
            ("239487239847", "2410312426921032588552076022197566074856950548502459942654116941958108831682612228890093858261341614673227141477904012196503648957050582631942730706805009223062734745341073406696246014589361659774041027169249453200378729434170325843778659198143763193776859869524088940195577346119843545301547043747207749969763750084308926339295559968882457872412993810129130294592999947926365264059284647209730384947211681434464714438488520940127459844288859336526896320919633919"),
            ("3", "13"),
            ("65537", "3120"),
        ];

        for (a, n) in cases {
            let (a, n) = (big(a), big(n));
            let inv = BigUintExt(&a).modinv(&n).expect("inverse exist");
            assert!(inv < n);
            assert!(((&a * &inv) % &n).is_one(), "{a} * {inv} != 1 % {n}");
        }

        assert_eq!(
            BigUintExt(BigUint::from(6u8)).modinv(&BigUint::from(9u8)),
            Err(ArithError::NoInverse)
        );
    }

    #[test]
    fn octet_string() {
        let x = BigUint::from(0x0102u32);
        assert_eq!(BigUintExt(&x).i2osp(4), Ok(vec![0, 0, 1, 2]));
        assert_eq!(BigUintExt(&x).i2osp(2), Ok(vec![1, 2]));
        assert_eq!(
            BigUintExt(&x).i2osp(1),
            Err(ArithError::IntegerTooLarge { len: 1 })
        );
        assert_eq!(BigUintExt(BigUint::zero()).i2osp(3), Ok(vec![0, 0, 0]));
        assert_eq!(BigUintExt::<BigUint>::os2ip(&[0, 0, 1, 2]), x);
        assert!(BigUintExt::<BigUint>::os2ip(&[]).is_zero());
    }

    #[test]
    fn random_bits() {
        let mut rng = DefaultRand::default();
        for bits in [1usize, 2, 7, 8, 9, 63, 64, 65, 256, 257] {
            for _ in 0..16 {
                let r = BigUintExt::<BigUint>::random_bits(bits, &mut rng);
                assert_eq!(r.bits() as usize, bits);
            }
        }
        assert!(BigUintExt::<BigUint>::random_bits(0, &mut rng).is_zero());
    }

    #[test]
    fn gen_random_in_range() {
        let (mut rng, bound) = (DefaultRand::default(), BigUint::from(3u8));
        let mut seen = [false; 3];
        for _ in 0..256 {
            let r = BigUintExt(&bound).gen_random(&mut rng);
            assert!(r < bound);
            seen[r.iter_u32_digits().next().unwrap_or(0) as usize] = true;
        }
        assert!(seen.iter().all(|&x| x));
    }
}
