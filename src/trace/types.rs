use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use crate::proc::ProcessId;
use crate::sim::EventKind;

/// 轨迹事件类型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEventKind {
    /// 内核元信息（作为 t=0 的第一条事件）
    Meta {
        time_step_ns: u64,
        total_capacity: f64,
        entity_cost: f64,
    },
    /// 进程被准入并完成预留
    Admit {
        pid: ProcessId,
        name: String,
        priority: i32,
        reserved: f64,
    },
    /// 事件投递给全部处理器
    Deliver {
        event_kind: EventKind,
        source: ProcessId,
        /// 事件自身的时间戳（ns）；`t_ns` 是实际投递时刻
        at_ns: u64,
    },
    HandlerFailed {
        event_kind: EventKind,
        source: ProcessId,
        handler: usize,
        message: String,
    },
    /// 活力耗尽的进程被回收
    Retire {
        pid: ProcessId,
        age: f64,
        released: bool,
    },
    Progress {
        tick: u64,
        usage_fraction: f64,
        live: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEvent {
    /// 仿真时间（纳秒，和 `SimTime.0` 同口径）
    pub t_ns: u64,
    #[serde(flatten)]
    pub kind: TraceEventKind,
}

/// 一个简单的事件收集器（存内存，仿真结束写 JSON 文件）
#[derive(Debug, Default)]
pub struct TraceLogger {
    pub events: Vec<TraceEvent>,
}

impl TraceLogger {
    pub fn push(&mut self, t_ns: u64, kind: TraceEventKind) {
        self.events.push(TraceEvent { t_ns, kind });
    }

    pub fn write_json(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(&self.events).map_err(io::Error::other)?;
        fs::write(path, json)
    }
}
