use std::sync::atomic::{AtomicBool, Ordering};

/// 并行搜索素数时, 一个任务失败(或panic)后通过`cancel`通知其它任务停止.
pub(super) struct FlagCancel<'a> {
    cancel: &'a AtomicBool,
    armed: bool,
}

impl<'a> FlagCancel<'a> {
    pub(super) fn new(cancel: &'a AtomicBool) -> Self {
        Self {
            cancel,
            armed: true,
        }
    }

    /// 任务成功结束, drop时不再设置取消标志
    pub(super) fn disarm(mut self) {
        self.armed = false;
    }
}

impl<'a> Drop for FlagCancel<'a> {
    fn drop(&mut self) {
        if self.armed {
            self.cancel.store(true, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FlagCancel;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn flag_cancel() {
        let cancel = AtomicBool::new(false);
        FlagCancel::new(&cancel).disarm();
        assert!(!cancel.load(Ordering::Acquire));

        {
            let _guard = FlagCancel::new(&cancel);
        }
        assert!(cancel.load(Ordering::Acquire));
    }
}
