//! 内核错误类型
//!
//! 稳态错误都是按操作可恢复的；只有 `InvalidConfiguration` 会阻止内核启动。

use thiserror::Error;

use crate::proc::ProcessId;
use crate::sim::{EventKind, SimTime};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    /// 进程 id 未知或已终止
    #[error("process {0} not found")]
    NotFound(ProcessId),

    #[error("insufficient capacity for {owner}: requested {requested}, free {free}")]
    InsufficientCapacity {
        owner: ProcessId,
        requested: f64,
        free: f64,
    },

    /// 某个事件处理器执行失败；只影响这一次调用
    #[error("handler #{handler} failed on {kind:?} from {source_pid} at {at:?}: {message}")]
    HandlerFailure {
        kind: EventKind,
        source_pid: ProcessId,
        handler: usize,
        at: SimTime,
        message: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// 再推进一个步长会超出时钟表示范围；仿真必须停止
    #[error("clock overflow: {now:?} + {step:?} exceeds u64 nanoseconds")]
    ClockOverflow { now: SimTime, step: SimTime },

    #[error("event queue full (limit {limit})")]
    QueueFull { limit: usize },

    #[error("scenario error: {0}")]
    Scenario(String),
}

pub type KernelResult<T> = Result<T, KernelError>;
