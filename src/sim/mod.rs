//! 仿真核心模块
//!
//! 此模块包含离散时间仿真内核的核心组件：仿真时间、事件与分发器、
//! 驱动器、配置以及场景文件。

// 子模块声明
mod config;
mod dispatcher;
mod driver;
mod event;
mod observer;
mod pending_event;
mod scenario;
mod time;

// 重新导出公共接口
pub use config::KernelConfig;
pub use dispatcher::{
    EventDispatcher, FlushReport, HandlerError, HandlerResult, SubscriptionId,
};
pub use driver::{AdvanceReport, Progress, SimulationDriver, TickReport};
pub use event::{Event, EventKind};
pub use observer::Observer;
pub use scenario::{EntitySpec, EventSpec, GeneSpec, Scenario};
pub use time::SimTime;
