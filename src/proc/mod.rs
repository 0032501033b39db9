//! 进程管理模块
//!
//! 进程标识、属性、每 tick 行为钩子以及进程表（调度器）。

mod id;
mod process;
mod ready_entry;
mod table;

pub use id::ProcessId;
pub use process::{
    Attributes, Behavior, ConstantDecay, DEFAULT_DECAY_PER_SEC, DEFAULT_PRIORITY,
    DEFAULT_VITALITY, ProcessSnapshot, ProcessState, TickContext, Vitals,
};
pub use table::{ProcessTable, StepOutcome};
