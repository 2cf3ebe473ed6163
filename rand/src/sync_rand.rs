use crate::Rand;
use std::sync::{Mutex, PoisonError};

/// 将一个随机源包装为可在多个线程间共享的随机源.
///
/// 每个线程持有`&SyncRand`, 通过`&SyncRand`实现的`Rand`取随机数, 每次取数时加锁.
pub struct SyncRand<'a, R: Rand + Send + ?Sized> {
    inner: Mutex<&'a mut R>,
}

impl<'a, R: Rand + Send + ?Sized> SyncRand<'a, R> {
    pub fn new(rng: &'a mut R) -> Self {
        Self {
            inner: Mutex::new(rng),
        }
    }
}

impl<'a, 'b, R: Rand + Send + ?Sized> Rand for &'b SyncRand<'a, R> {
    fn rand(&mut self, random: &mut [u8]) {
        // 持锁线程panic时随机源本身没有中间状态, 继续使用
        let mut rng = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        rng.rand(random);
    }
}

#[cfg(test)]
mod tests {
    use crate::{DefaultRand, Rand, SyncRand};

    #[test]
    fn shared_between_threads() {
        let mut rng = DefaultRand::default();
        let shared = SyncRand::new(&mut rng);

        let (a, b) = std::thread::scope(|s| {
            let ha = s.spawn(|| {
                let mut buf = [0u8; 16];
                (&shared).rand(&mut buf);
                buf
            });
            let hb = s.spawn(|| {
                let mut buf = [0u8; 16];
                (&shared).rand(&mut buf);
                buf
            });
            (ha.join().unwrap(), hb.join().unwrap())
        });

        assert_ne!(a, b);
    }
}
