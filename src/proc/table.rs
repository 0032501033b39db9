//! 进程表（调度器）
//!
//! 独占持有所有存活进程，维护按优先级排序的就绪队列。所有操作都在
//! 同一把内部锁下完成，调用方看不到中间状态。

use parking_lot::Mutex;
use std::collections::{BTreeMap, BinaryHeap};
use tracing::{debug, trace};

use super::id::ProcessId;
use super::process::{Attributes, Process, ProcessSnapshot, ProcessState, TickContext};
use super::ready_entry::ReadyEntry;
use crate::sim::{EventDispatcher, SimTime};

#[derive(Default)]
struct TableInner {
    live: BTreeMap<ProcessId, Process>,
    /// 已终止进程的最终快照；id 永不复用
    retired: BTreeMap<ProcessId, ProcessSnapshot>,
    ready: BinaryHeap<ReadyEntry>,
    next_id: u64,
    next_seq: u64,
}

impl TableInner {
    fn push_ready(&mut self, id: ProcessId, priority: i32) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.ready.push(ReadyEntry { priority, seq, id });
    }
}

/// 单步更新的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// 更新完成，进程回到 READY
    Alive,
    /// 活力耗尽，进程停在 RUNNING，等待驱动器终止
    Exhausted,
}

#[derive(Default)]
pub struct ProcessTable {
    inner: Mutex<TableInner>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 准入一个进程：分配新 id，状态 READY，同时进入索引和就绪队列。
    pub fn admit(&self, name: impl Into<String>, attrs: Attributes) -> ProcessId {
        match self.admit_with(name, attrs, |_| Ok::<(), std::convert::Infallible>(())) {
            Ok(id) => id,
            Err(never) => match never {},
        }
    }

    /// 带准入守卫的准入：`guard` 在表锁内以候选 id 调用，
    /// 只有守卫成功时才真正占用该 id 并插入进程。
    pub fn admit_with<E>(
        &self,
        name: impl Into<String>,
        attrs: Attributes,
        guard: impl FnOnce(ProcessId) -> Result<(), E>,
    ) -> Result<ProcessId, E> {
        let mut inner = self.inner.lock();
        let id = ProcessId(inner.next_id);
        guard(id)?;
        inner.next_id += 1;

        let priority = attrs.priority;
        let process = Process::new(id, name.into(), attrs);
        trace!(%id, name = %process.name, priority, "准入进程");
        inner.live.insert(id, process);
        inner.push_ready(id, priority);

        debug!(live = inner.live.len(), ready = inner.ready.len(), "进程表已更新");
        Ok(id)
    }

    /// 取出下一个要运行的进程：优先级值最小者优先，同优先级按到达顺序。
    pub fn select_next(&self) -> Option<ProcessId> {
        let mut inner = self.inner.lock();
        let entry = inner.ready.pop()?;
        if let Some(p) = inner.live.get_mut(&entry.id) {
            p.queued = false;
        }
        Some(entry.id)
    }

    /// 把一个已被选出的存活进程重新放回就绪队列（作为新到达者）。
    pub fn requeue(&self, id: ProcessId) -> bool {
        let mut inner = self.inner.lock();
        let priority = match inner.live.get_mut(&id) {
            Some(p) if !p.queued => {
                p.queued = true;
                p.priority
            }
            _ => return false,
        };
        inner.push_ready(id, priority);
        true
    }

    /// 终止进程；未知或已终止的 id 返回 false。
    pub fn terminate(&self, id: ProcessId) -> bool {
        self.retire(id).is_some()
    }

    /// 终止进程并返回其最终快照。
    pub fn retire(&self, id: ProcessId) -> Option<ProcessSnapshot> {
        let mut inner = self.inner.lock();
        let mut process = inner.live.remove(&id)?;
        process.state = ProcessState::Terminated;
        if process.queued {
            inner.ready.retain(|e| e.id != id);
        }
        let snap = process.snapshot();
        inner.retired.insert(id, snap.clone());
        trace!(%id, age = snap.age, "进程终止");
        Some(snap)
    }

    /// 所有存活进程的 id（升序），是一次一致性快照。
    pub fn snapshot_live(&self) -> Vec<ProcessId> {
        self.inner.lock().live.keys().copied().collect()
    }

    /// 对单个进程执行一次 tick 更新：READY → RUNNING → READY。
    ///
    /// 返回 `None` 表示 id 不存在（或已终止）。
    pub fn step(
        &self,
        id: ProcessId,
        now: SimTime,
        dt: SimTime,
        events: &EventDispatcher,
    ) -> Option<StepOutcome> {
        let mut inner = self.inner.lock();
        let process = inner.live.get_mut(&id)?;
        process.state = ProcessState::Running;
        let ctx = TickContext {
            pid: id,
            now,
            dt,
            events,
        };
        process.update(&ctx);
        if process.is_exhausted() {
            return Some(StepOutcome::Exhausted);
        }
        process.state = ProcessState::Ready;
        Some(StepOutcome::Alive)
    }

    /// 存活或已终止进程的快照。
    pub fn inspect(&self, id: ProcessId) -> Option<ProcessSnapshot> {
        let inner = self.inner.lock();
        match inner.live.get(&id) {
            Some(p) => Some(p.snapshot()),
            None => inner.retired.get(&id).cloned(),
        }
    }

    pub fn contains_live(&self, id: ProcessId) -> bool {
        self.inner.lock().live.contains_key(&id)
    }

    pub fn live_count(&self) -> usize {
        self.inner.lock().live.len()
    }

    /// 曾经分配过的 id 总数
    pub fn admitted_count(&self) -> u64 {
        self.inner.lock().next_id
    }

    pub fn ready_len(&self) -> usize {
        self.inner.lock().ready.len()
    }
}
