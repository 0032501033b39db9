//! 共享资源池
//!
//! 固定容量的计数器，按进程 id 记录预留量。不变式：
//! `free + Σ reservations == total`，且 `free` 永不为负。

mod resource_pool;

pub use resource_pool::ResourcePool;

/// 每个新建实体默认预留的资源量
pub const DEFAULT_ENTITY_COST: f64 = 100.0;
