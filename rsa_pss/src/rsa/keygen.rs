//! RSA密钥生成
//!
//! - 随机选择两个`bits/2`位的素数$p \neq q$, 每个素数最高两位为1, 因此$n = p \cdot q$恰好`bits`位;
//! - $\lambda(n) = lcm(p-1, q-1)$, 公钥指数固定为$e = 65537$, 若$gcd(e, \lambda) \neq 1$则重新选择$p, q$;
//! - $d = e^{-1} \mod \lambda(n)$.
//!
//! `p`和`q`的搜索可以并行进行, 任意一个搜索失败时, 另一个搜索在下一个候选数之前停止.

use crate::rsa::flag::FlagCancel;
use crate::rsa::{PrivateKey, PublicKey};
use crate::{CipherError, Rand, SyncRand};
use log::{debug, trace};
use num_bigint::BigUint;
use num_traits::One;
use std::sync::atomic::AtomicBool;
use utils::{ArithError, BigUintExt, PrimeSearch};

/// 密钥生成参数
#[derive(Clone, Debug)]
pub struct KeyGenerator {
    bits: usize,
    test_rounds: usize,
    keygen_attempts: usize,
    prime_attempts: usize,
    parallel: bool,
}

// n = p * q, lambda = lcm(p-1, q-1), e * d = 1 % lambda
pub(super) struct KeyFactors {
    pub(super) p: BigUint,
    pub(super) q: BigUint,
    pub(super) n: BigUint,
    pub(super) lambda: BigUint,
    pub(super) e: BigUint,
    pub(super) d: BigUint,
}

impl KeyGenerator {
    pub const MIN_BITS: usize = 512;
    pub const PUBLIC_EXPONENT: u32 = 65537;
    pub const DEFAULT_KEYGEN_ATTEMPTS: usize = 64;

    pub fn new(bits: usize) -> Self {
        Self {
            bits,
            test_rounds: 0,
            keygen_attempts: Self::DEFAULT_KEYGEN_ATTEMPTS,
            prime_attempts: 0,
            parallel: true,
        }
    }

    /// Miller-Rabin测试轮数, `0`表示按密钥长度选择: $max(40, bits / 64)$
    pub fn test_rounds(mut self, rounds: usize) -> Self {
        self.test_rounds = rounds;
        self
    }

    /// 重新选择素数对的次数上限
    pub fn keygen_attempts(mut self, attempts: usize) -> Self {
        self.keygen_attempts = attempts.max(1);
        self
    }

    /// 每个素数的候选数上限, `0`表示`PrimeSearch::default_attempts`
    pub fn prime_search_attempts(mut self, attempts: usize) -> Self {
        self.prime_attempts = attempts;
        self
    }

    /// 是否在当前rayon线程池中并行搜索`p`和`q`
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn default_test_rounds(bits: usize) -> usize {
        (bits >> 6).max(40)
    }

    fn rounds(&self) -> usize {
        if self.test_rounds == 0 {
            Self::default_test_rounds(self.bits)
        } else {
            self.test_rounds
        }
    }

    fn prime_search<'a>(&self, half: usize, rounds: usize) -> PrimeSearch<'a> {
        let attempts = if self.prime_attempts == 0 {
            PrimeSearch::default_attempts(half)
        } else {
            self.prime_attempts
        };
        PrimeSearch::new(half, rounds).attempts(attempts)
    }

    pub fn generate<R: Rand + Send>(
        &self,
        rng: &mut R,
    ) -> Result<(PublicKey, PrivateKey), CipherError> {
        let mut f = self.generate_factors(rng)?;
        let (n, e, d) = (
            std::mem::take(&mut f.n),
            std::mem::take(&mut f.e),
            std::mem::take(&mut f.d),
        );

        Ok((
            PublicKey::new_uncheck(n.clone(), e.clone()),
            PrivateKey::new_uncheck(n, e, d),
        ))
    }

    pub(super) fn generate_factors<R: Rand + Send>(
        &self,
        rng: &mut R,
    ) -> Result<KeyFactors, CipherError> {
        if self.bits < Self::MIN_BITS || self.bits & 1 != 0 {
            return Err(CipherError::InvalidKeySize {
                min: Self::MIN_BITS,
                real: self.bits,
            });
        }

        let (half, rounds) = (self.bits >> 1, self.rounds());
        let e = BigUint::from(Self::PUBLIC_EXPONENT);
        debug!(
            "rsa keygen: bits={}, rounds={}, parallel={}",
            self.bits, rounds, self.parallel
        );

        for attempt in 1..=self.keygen_attempts {
            let (p, mut q) = self.search_pair(half, rounds, rng)?;
            if p == q {
                trace!("rsa keygen: p == q, regenerate q");
                q = self.prime_search(half, rounds).run(rng).map_err(gen_failure)?;
                if p == q {
                    continue;
                }
            }

            let n = &p * &q;
            if n.bits() as usize != self.bits {
                trace!("rsa keygen: modulus has {} bits, retry", n.bits());
                continue;
            }

            let lambda = BigUintExt(&p - 1u32).lcm(&(&q - 1u32))?;
            if !BigUintExt(&e).gcd(&lambda)?.is_one() {
                trace!("rsa keygen: e is not coprime with lambda(n), retry");
                continue;
            }

            let d = BigUintExt(&e).modinv(&lambda)?;
            debug!("rsa keygen: done after {attempt} attempt(s)");
            return Ok(KeyFactors {
                p,
                q,
                n,
                lambda,
                e,
                d,
            });
        }

        Err(CipherError::PrimeGenerationFailure(format!(
            "no valid prime pair after `{}` attempts",
            self.keygen_attempts
        )))
    }

    fn search_pair<R: Rand + Send>(
        &self,
        half: usize,
        rounds: usize,
        rng: &mut R,
    ) -> Result<(BigUint, BigUint), CipherError> {
        if !self.parallel {
            let p = self.prime_search(half, rounds).run(rng).map_err(gen_failure)?;
            let q = self.prime_search(half, rounds).run(rng).map_err(gen_failure)?;
            return Ok((p, q));
        }

        let cancel = AtomicBool::new(false);
        let shared = SyncRand::new(rng);
        let search = || {
            let guard = FlagCancel::new(&cancel);
            let mut rng = &shared;
            let res = self
                .prime_search(half, rounds)
                .cancel_on(&cancel)
                .run(&mut rng);
            if res.is_ok() {
                guard.disarm();
            }
            res
        };

        match rayon::join(&search, &search) {
            (Ok(p), Ok(q)) => Ok((p, q)),
            (Err(ArithError::PrimeSearchCancelled), Err(e)) | (Err(e), _) | (_, Err(e)) => {
                Err(gen_failure(e))
            }
        }
    }
}

fn gen_failure(e: ArithError) -> CipherError {
    CipherError::PrimeGenerationFailure(e.to_string())
}

#[cfg(feature = "sec-zeroize-drop")]
impl Drop for KeyFactors {
    fn drop(&mut self) {
        for x in [&mut self.p, &mut self.q, &mut self.lambda, &mut self.d] {
            super::wipe(x);
        }
    }
}
