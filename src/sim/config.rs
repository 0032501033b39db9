//! 内核配置
//!
//! 构造驱动器时唯一识别的配置；校验失败即 `InvalidConfiguration`。

use serde::{Deserialize, Serialize};

use super::time::SimTime;
use crate::error::{KernelError, KernelResult};
use crate::pool::DEFAULT_ENTITY_COST;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// 每个 tick 推进的仿真秒数
    pub time_step: f64,
    /// 资源池容量
    pub total_capacity: f64,
    /// 每个新建实体固定预留的资源量
    pub entity_cost: f64,
    /// 每隔多少 tick 报告一次进度；0 表示不报告
    pub progress_every: u64,
    /// 待投递事件上限；None 表示不限
    pub event_queue_limit: Option<usize>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            time_step: 0.1,
            total_capacity: 10_000.0,
            entity_cost: DEFAULT_ENTITY_COST,
            progress_every: 100,
            event_queue_limit: None,
        }
    }
}

impl KernelConfig {
    pub fn new(time_step: f64, total_capacity: f64) -> Self {
        Self {
            time_step,
            total_capacity,
            ..Self::default()
        }
    }

    /// 校验并返回每个 tick 的步长。
    pub fn validate(&self) -> KernelResult<SimTime> {
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(KernelError::InvalidConfiguration(format!(
                "time_step must be > 0, got {}",
                self.time_step
            )));
        }
        let step = SimTime::from_secs_f64(self.time_step);
        if step == SimTime::ZERO {
            return Err(KernelError::InvalidConfiguration(format!(
                "time_step {} is below 1ns resolution",
                self.time_step
            )));
        }
        if step == SimTime(u64::MAX) {
            return Err(KernelError::InvalidConfiguration(format!(
                "time_step {} exceeds the clock range",
                self.time_step
            )));
        }
        if !self.total_capacity.is_finite() || self.total_capacity <= 0.0 {
            return Err(KernelError::InvalidConfiguration(format!(
                "total_capacity must be > 0, got {}",
                self.total_capacity
            )));
        }
        if !self.entity_cost.is_finite() || self.entity_cost < 0.0 {
            return Err(KernelError::InvalidConfiguration(format!(
                "entity_cost must be >= 0, got {}",
                self.entity_cost
            )));
        }
        if self.event_queue_limit == Some(0) {
            return Err(KernelError::InvalidConfiguration(
                "event_queue_limit must be > 0 when set".to_string(),
            ));
        }
        Ok(step)
    }
}
