use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::trace;

use crate::proc::ProcessId;

#[derive(Debug)]
struct PoolInner {
    total: f64,
    free: f64,
    reservations: BTreeMap<ProcessId, f64>,
}

#[derive(Debug)]
pub struct ResourcePool {
    inner: Mutex<PoolInner>,
}

impl ResourcePool {
    /// 容量须为正且有限；由调用方（配置校验）保证。
    pub fn new(total: f64) -> Self {
        Self {
            inner: Mutex::new(PoolInner {
                total,
                free: total,
                reservations: BTreeMap::new(),
            }),
        }
    }

    /// 预留：当且仅当 `free >= amount` 时扣减并返回 true，否则不改变状态。
    /// 同一 owner 的多次预留会累加。
    pub fn reserve(&self, owner: ProcessId, amount: f64) -> bool {
        if !amount.is_finite() || amount < 0.0 {
            return false;
        }
        let mut inner = self.inner.lock();
        if inner.free < amount {
            trace!(%owner, amount, free = inner.free, "预留失败：容量不足");
            return false;
        }
        inner.free -= amount;
        *inner.reservations.entry(owner).or_insert(0.0) += amount;
        trace!(%owner, amount, free = inner.free, "预留成功");
        true
    }

    /// 归还 owner 的全部预留；没有预留时返回 false（重复释放是 no-op）。
    pub fn release(&self, owner: ProcessId) -> bool {
        let mut inner = self.inner.lock();
        let Some(amount) = inner.reservations.remove(&owner) else {
            return false;
        };
        if inner.reservations.is_empty() {
            inner.free = inner.total;
        } else {
            inner.free = (inner.free + amount).min(inner.total);
        }
        trace!(%owner, amount, free = inner.free, "释放预留");
        true
    }

    /// `1 - free/total`，范围 [0, 1]
    pub fn usage_fraction(&self) -> f64 {
        let inner = self.inner.lock();
        (1.0 - inner.free / inner.total).clamp(0.0, 1.0)
    }

    pub fn free(&self) -> f64 {
        self.inner.lock().free
    }

    pub fn total(&self) -> f64 {
        self.inner.lock().total
    }

    pub fn reserved(&self, owner: ProcessId) -> Option<f64> {
        self.inner.lock().reservations.get(&owner).copied()
    }

    pub fn reservation_count(&self) -> usize {
        self.inner.lock().reservations.len()
    }

    /// 所有活跃预留之和
    pub fn reserved_total(&self) -> f64 {
        self.inner.lock().reservations.values().sum()
    }
}
