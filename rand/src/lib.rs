//! 随机源. 所有需要随机数的操作都显式接收一个实现了`Rand`的随机源, 不使用全局状态.

use xrand::rngs::OsRng;
use xrand::RngCore;

mod sync_rand;
pub use sync_rand::SyncRand;

pub trait Rand {
    fn rand(&mut self, random: &mut [u8]);
}

impl<T: Rand + ?Sized> Rand for &mut T {
    fn rand(&mut self, random: &mut [u8]) {
        (**self).rand(random)
    }
}

/// 操作系统的密码学安全随机源(getrandom), 无内部状态, 可以在线程间自由复制
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultRand;

impl Rand for DefaultRand {
    fn rand(&mut self, random: &mut [u8]) {
        OsRng.fill_bytes(random);
    }
}
