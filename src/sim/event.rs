//! 事件
//!
//! 事件是不可变的 (时间戳, 类型, 来源) 三元组；时间戳表示事件何时
//! 变为可投递，而不是何时被投递。

use serde::{Deserialize, Serialize};

use super::time::SimTime;
use crate::proc::ProcessId;

/// 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CellDivision,
    GeneExpression,
    ProteinSynthesis,
    SignalReception,
    /// 进程活力耗尽被回收时由驱动器发出
    Apoptosis,
    Mutation,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::CellDivision,
        EventKind::GeneExpression,
        EventKind::ProteinSynthesis,
        EventKind::SignalReception,
        EventKind::Apoptosis,
        EventKind::Mutation,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub at: SimTime,
    pub kind: EventKind,
    pub source: ProcessId,
}

impl Event {
    pub fn new(at: SimTime, kind: EventKind, source: ProcessId) -> Self {
        Self { at, kind, source }
    }
}
