//! 事件分发器
//!
//! 按时间戳排序的待投递队列，加上 事件类型 → 处理器列表 的注册表。
//! 处理器在内部锁之外被调用，因此处理器内部可以继续 `emit`/`subscribe`。

use parking_lot::Mutex;
use std::collections::{BTreeMap, BinaryHeap};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::event::{Event, EventKind};
use super::pending_event::PendingEvent;
use super::time::SimTime;
use crate::error::{KernelError, KernelResult};

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = Result<(), HandlerError>;

type Handler = Arc<dyn Fn(&Event) -> HandlerResult + Send + Sync>;

/// `subscribe` 返回的句柄，可用于 `unsubscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// 一次 `flush_due` 的结果
#[derive(Debug, Default)]
pub struct FlushReport {
    /// 按投递顺序排列
    pub delivered: Vec<Event>,
    /// 每个失败的处理器调用一条 `KernelError::HandlerFailure`
    pub failures: Vec<KernelError>,
}

#[derive(Default)]
struct DispatcherInner {
    pending: BinaryHeap<PendingEvent>,
    next_seq: u64,
    handlers: BTreeMap<EventKind, Vec<(SubscriptionId, Handler)>>,
    next_sub: u64,
    limit: Option<usize>,
}

#[derive(Default)]
pub struct EventDispatcher {
    inner: Mutex<DispatcherInner>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 带待投递上限的分发器；超过上限时 `emit` 返回 `QueueFull`。
    pub fn with_limit(limit: usize) -> Self {
        let d = Self::default();
        d.inner.lock().limit = Some(limit);
        d
    }

    /// 追加处理器；同一类型的处理器按注册顺序调用。
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) -> HandlerResult + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        let id = SubscriptionId(inner.next_sub);
        inner.next_sub += 1;
        inner
            .handlers
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.lock();
        for list in inner.handlers.values_mut() {
            if let Some(pos) = list.iter().position(|(sid, _)| *sid == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn emit(&self, event: Event) -> KernelResult<()> {
        let mut inner = self.inner.lock();
        if let Some(limit) = inner.limit {
            if inner.pending.len() >= limit {
                return Err(KernelError::QueueFull { limit });
            }
        }
        let seq = inner.next_seq;
        inner.next_seq = inner.next_seq.wrapping_add(1);
        trace!(at = ?event.at, kind = ?event.kind, source = %event.source, seq, "事件入队");
        inner.pending.push(PendingEvent { seq, event });
        Ok(())
    }

    /// 投递所有 `at <= now` 的事件，时间升序、同时间按插入顺序。
    ///
    /// 单个处理器失败（返回错误或 panic）只记录在报告里，不影响其它处理器
    /// 与其它事件。
    pub fn flush_due(&self, now: SimTime) -> FlushReport {
        let mut report = FlushReport::default();
        while let Some((event, handlers)) = self.pop_due(now) {
            for (idx, handler) in handlers.iter().enumerate() {
                if let Err(message) = invoke(handler, &event) {
                    warn!(kind = ?event.kind, source = %event.source, handler = idx, %message, "事件处理器失败");
                    report.failures.push(KernelError::HandlerFailure {
                        kind: event.kind,
                        source_pid: event.source,
                        handler: idx,
                        at: event.at,
                        message,
                    });
                }
            }
            report.delivered.push(event);
        }
        if !report.delivered.is_empty() {
            debug!(
                now = ?now,
                delivered = report.delivered.len(),
                failures = report.failures.len(),
                remaining = self.pending(),
                "事件投递完成"
            );
        }
        report
    }

    fn pop_due(&self, now: SimTime) -> Option<(Event, Vec<Handler>)> {
        let mut inner = self.inner.lock();
        if inner.pending.peek()?.event.at > now {
            return None;
        }
        let item = inner.pending.pop()?;
        let handlers = inner
            .handlers
            .get(&item.event.kind)
            .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();
        Some((item.event, handlers))
    }

    pub fn pending(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.inner.lock().handlers.get(&kind).map_or(0, Vec::len)
    }
}

fn invoke(handler: &Handler, event: &Event) -> Result<(), String> {
    match panic::catch_unwind(AssertUnwindSafe(|| handler(event))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
