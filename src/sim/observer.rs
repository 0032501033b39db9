//! 观察者 trait
//!
//! 运行循环把每个 tick 的结果和周期性进度交给外部观察者。

use super::driver::{Progress, TickReport};

/// 仿真观察者：由宿主实现（例如命令行输出、实时节流）。
pub trait Observer {
    fn on_tick(&mut self, _report: &TickReport) {}
    fn on_progress(&mut self, _progress: &Progress) {}
}

impl Observer for () {}
