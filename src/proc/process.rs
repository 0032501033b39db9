//! 进程
//!
//! 进程本身只知道生命周期、优先级与活力值；具体的生物学属性由
//! `Behavior` 实现者（例如 `bio::Organism`）在每个 tick 中修改。

use serde::{Deserialize, Serialize};
use std::fmt;

use super::id::ProcessId;
use crate::sim::{EventDispatcher, SimTime};

pub const DEFAULT_PRIORITY: i32 = 5;
pub const DEFAULT_VITALITY: f64 = 100.0;
pub const DEFAULT_DECAY_PER_SEC: f64 = 0.5;

/// 进程生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    Ready,
    Running,
    /// 内核自身不会进入该状态，留给外部协作者使用
    Blocked,
    Terminated,
}

/// 每个 tick 被外部行为修改的标量
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub vitality: f64,
    /// 累计年龄（秒）
    pub age: f64,
}

/// 一次 tick 更新时传给行为的上下文。
pub struct TickContext<'a> {
    pub pid: ProcessId,
    pub now: SimTime,
    pub dt: SimTime,
    /// 行为可以借此发出（未来的）事件
    pub events: &'a EventDispatcher,
}

/// 每 tick 的变更钩子，由外部协作者提供。
///
/// 在进程表锁内被调用：实现者可以 `emit` 事件，但不能回调进程表。
pub trait Behavior: Send + 'static {
    fn on_tick(&mut self, vitals: &mut Vitals, ctx: &TickContext<'_>);
}

/// 最简单的行为：活力按固定速率线性衰减，最低到 0。
#[derive(Debug, Clone, Copy)]
pub struct ConstantDecay {
    pub per_sec: f64,
}

impl Default for ConstantDecay {
    fn default() -> Self {
        Self {
            per_sec: DEFAULT_DECAY_PER_SEC,
        }
    }
}

impl Behavior for ConstantDecay {
    fn on_tick(&mut self, vitals: &mut Vitals, ctx: &TickContext<'_>) {
        vitals.vitality = (vitals.vitality - ctx.dt.as_secs_f64() * self.per_sec).max(0.0);
    }
}

/// 进程准入时的初始属性
pub struct Attributes {
    pub priority: i32,
    pub vitality: f64,
    pub behavior: Box<dyn Behavior>,
}

impl Attributes {
    pub fn new(priority: i32, vitality: f64, behavior: impl Behavior) -> Self {
        Self {
            priority,
            vitality,
            behavior: Box::new(behavior),
        }
    }

    pub fn with_priority(priority: i32) -> Self {
        Self {
            priority,
            ..Self::default()
        }
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Self::new(DEFAULT_PRIORITY, DEFAULT_VITALITY, ConstantDecay::default())
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attributes")
            .field("priority", &self.priority)
            .field("vitality", &self.vitality)
            .finish_non_exhaustive()
    }
}

/// 进程的只读快照（`inspect` 的返回值）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    pub id: ProcessId,
    pub name: String,
    pub state: ProcessState,
    pub priority: i32,
    pub vitality: f64,
    pub age: f64,
}

/// 进程表独占持有的进程记录；外部只通过 id 访问。
pub(crate) struct Process {
    pub(crate) id: ProcessId,
    pub(crate) name: String,
    pub(crate) state: ProcessState,
    pub(crate) priority: i32,
    pub(crate) vitals: Vitals,
    pub(crate) queued: bool,
    behavior: Box<dyn Behavior>,
}

impl Process {
    pub(crate) fn new(id: ProcessId, name: String, attrs: Attributes) -> Self {
        Self {
            id,
            name,
            state: ProcessState::Ready,
            priority: attrs.priority,
            vitals: Vitals {
                vitality: attrs.vitality,
                age: 0.0,
            },
            queued: true,
            behavior: attrs.behavior,
        }
    }

    /// 年龄先增长，然后交给行为修改活力等属性。
    pub(crate) fn update(&mut self, ctx: &TickContext<'_>) {
        self.vitals.age += ctx.dt.as_secs_f64();
        self.behavior.on_tick(&mut self.vitals, ctx);
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.vitals.vitality <= 0.0
    }

    pub(crate) fn snapshot(&self) -> ProcessSnapshot {
        ProcessSnapshot {
            id: self.id,
            name: self.name.clone(),
            state: self.state,
            priority: self.priority,
            vitality: self.vitals.vitality,
            age: self.vitals.age,
        }
    }
}
