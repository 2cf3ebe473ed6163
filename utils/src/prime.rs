use crate::{ArithError, BigUintExt};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand::Rand;
use std::borrow::Borrow;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};

// primes below 256
const SMALL_PRIMES: [u8; 54] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

// 3 * 5 * ... * 53
const SMALL_PRIMES_PRODUCT: u64 = 16294579238595022365u64;

impl<T: Borrow<BigUint>> BigUintExt<T> {
    /// 素性测试: 小素数直接判断, 再做小素数试除, 最后做`test_rounds`轮Miller-Rabin测试.
    ///
    /// 对于随机奇数输入, 误判为素数的概率至多为$4^{-t}$.
    pub fn probably_prime_test<Rng: Rand>(&self, test_rounds: usize, rng: &mut Rng) -> bool {
        if self.bits() <= 8 {
            return self
                .to_u8()
                .map(|x| SMALL_PRIMES.binary_search(&x).is_ok())
                .unwrap_or(false);
        } else if self.is_even() {
            return false;
        }

        for &p in SMALL_PRIMES.iter().skip(1) {
            if (self.deref() % p as u32).is_zero() {
                return false;
            }
        }

        self.miller_rabin(test_rounds, rng)
    }

    /// Miller-Rabin素数测试
    ///
    /// $n - 1 = 2^s \cdot d$, 每轮随机选择见证数$a \in [2, n-2]$, 计算$x = a^d \mod n$,
    /// 若$x = 1$或$x = n-1$本轮通过, 否则最多再平方`s-1`次, 出现$n-1$则通过, 否则`n`为合数.
    pub fn miller_rabin<Rng: Rand>(&self, rounds: usize, rng: &mut Rng) -> bool {
        let n = self.deref();
        match n.to_u8() {
            Some(0 | 1) => return false,
            Some(2 | 3) => return true,
            _ => {}
        }
        if n.is_even() {
            return false;
        }

        let n_m1 = n - 1u32;
        let s = n_m1.trailing_zeros().unwrap_or(0);
        let d = &n_m1 >> s;
        // a - 2 in [0, n-4]
        let span = BigUintExt(n - 3u32);

        'witness: for _ in 0..rounds {
            let a = span.gen_random(rng) + 2u32;
            let mut x = BigUintExt(a).modpow(&d, n);
            if x.is_one() || x == n_m1 {
                continue;
            }

            for _ in 1..s {
                x = (&x * &x) % n;
                if x == n_m1 {
                    continue 'witness;
                }
            }

            return false;
        }

        true
    }
}

/// 有界的随机素数搜索.
///
/// 每个候选数恰好`bits`位, 最高两位和最低位被置1, 两个这样的素数之积恰好`2*bits`位.
/// 超过`attempts`个候选数仍未找到素数时失败; 设置了取消标志时, 每个候选数之前检查一次.
pub struct PrimeSearch<'a> {
    bits: usize,
    rounds: usize,
    attempts: usize,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> PrimeSearch<'a> {
    pub fn new(bits: usize, rounds: usize) -> Self {
        Self {
            bits,
            rounds,
            attempts: Self::default_attempts(bits),
            cancel: None,
        }
    }

    /// 默认的候选数上限, 约为`bits`位素数平均间隔的数十倍
    pub fn default_attempts(bits: usize) -> usize {
        (bits << 6).max(1024)
    }

    pub fn attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn cancel_on(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .map(|f| f.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    pub fn run<Rng: Rand>(&self, rng: &mut Rng) -> Result<BigUint, ArithError> {
        if self.bits < 2 {
            return Err(ArithError::InvalidPrimeBits(self.bits));
        }

        for _ in 0..self.attempts {
            if self.is_cancelled() {
                return Err(ArithError::PrimeSearchCancelled);
            }

            let mut n = BigUintExt::<BigUint>::random_bits(self.bits, rng);
            n.set_bit(self.bits as u64 - 2, true);
            n.set_bit(0, true);

            // 跳过小素数的倍数, 候选数加2直到不再是小素数的倍数
            let r = (&n % SMALL_PRIMES_PRODUCT).to_u64().unwrap_or(0);
            let delta = (0u64..(1 << 20))
                .step_by(2)
                .find(|delta| {
                    let m = r + delta;
                    SMALL_PRIMES[1..16]
                        .iter()
                        .all(|&p| m % p as u64 != 0 || (self.bits <= 6 && m == p as u64))
                })
                .unwrap_or(0);
            n += delta;

            let n = BigUintExt(n);
            if n.bits() as usize == self.bits && n.probably_prime_test(self.rounds, rng) {
                return Ok(n.0);
            }
        }

        Err(ArithError::PrimeSearchExhausted(self.attempts))
    }
}

#[cfg(test)]
mod tests {
    use crate::{ArithError, BigUintExt, PrimeSearch};
    use num_bigint::BigUint;
    use num_traits::Num;
    use rand::DefaultRand;
    use std::sync::atomic::AtomicBool;

    fn big(s: &str) -> BigUint {
        BigUint::from_str_radix(s, 10).expect("convert string to big uint failed")
    }

    #[test]
    fn gen_small_prime() {
        let mut rng = DefaultRand::default();
        for bits_len in 2..16 {
            let p = PrimeSearch::new(bits_len, 20).run(&mut rng).unwrap();
            assert_eq!(p.bits() as usize, bits_len);
            assert!(BigUintExt(p).probably_prime_test(31, &mut rng));
        }
    }

    #[test]
    fn prime_search_bounds() {
        let mut rng = DefaultRand::default();
        assert_eq!(
            PrimeSearch::new(1, 20).run(&mut rng),
            Err(ArithError::InvalidPrimeBits(1))
        );

        let cancel = AtomicBool::new(true);
        assert_eq!(
            PrimeSearch::new(256, 20).cancel_on(&cancel).run(&mut rng),
            Err(ArithError::PrimeSearchCancelled)
        );
    }

    #[test]
    fn known_primes() {
        let cases = [
            "2",
            "3",
            "5",
            "7",
            "31",
            "61",
            "251",
            "257",
            "65537",
            "13756265695458089029",
            "13496181268022124907",
            "10953742525620032441",
            "17908251027575790097",
            "18699199384836356663",
            "98920366548084643601728869055592650835572950932266967461790948584315647051443",
            "94560208308847015747498523884063394671606671904944666360068158221458669711639",
            // Curve25519: 2^255-19
            "57896044618658097711785492504343953926634992332820282019728792003956564819949",
            // E-521: 2^521-1
            "6864797660130609714981900799081393217269435300143305409394463459185543183397656052122559640661454554977296311391480858037121987999716643812574028291115057151",
        ];

        let mut rng = DefaultRand::default();
        for s in cases {
            let n = BigUintExt(big(s));
            assert!(n.probably_prime_test(20, &mut rng), "prime `{s}` test failed");
            assert!(n.miller_rabin(20, &mut rng), "prime `{s}` miller-rabin failed");
        }
    }

    #[test]
    fn known_composites() {
        let cases = [
            "0",
            "1",
            "4",
            "9",
            "255",
            // Carmichael numbers
            "561",
            "1105",
            "1729",
            "2465",
            "2821",
            "6601",
            "8911",
            // strong pseudoprime to base 2
            "2047",
            "3215031751",
            "82793403787388584738507275144194252681",
            // strong pseudoprime to prime bases 2 through 29
            "1195068768795265792518361315725116351898245581",
        ];

        let mut rng = DefaultRand::default();
        for s in cases {
            let n = BigUintExt(big(s));
            for _ in 0..8 {
                assert!(
                    !n.miller_rabin(10, &mut rng),
                    "composite `{s}` passed miller-rabin"
                );
            }
            assert!(!n.probably_prime_test(10, &mut rng), "composite `{s}` test failed");
        }
    }
}
