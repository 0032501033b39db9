//! 仿真驱动器
//!
//! 持有唯一的仿真时钟、资源池、进程表与事件分发器，并按固定步长
//! 推进 tick：投递到期事件 → 按 id 升序更新存活进程 → 回收活力耗尽者。

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::config::KernelConfig;
use super::dispatcher::{EventDispatcher, HandlerResult, SubscriptionId};
use super::event::{Event, EventKind};
use super::observer::Observer;
use super::time::SimTime;
use crate::error::{KernelError, KernelResult};
use crate::pool::ResourcePool;
use crate::proc::{Attributes, ProcessId, ProcessSnapshot, ProcessTable, StepOutcome};
use crate::trace::{TraceEventKind, TraceLogger};

/// 单个 tick 的结果
#[derive(Debug)]
pub struct TickReport {
    /// 已完成的 tick 数（含本次）
    pub tick: u64,
    pub now: SimTime,
    pub delivered: usize,
    pub failures: Vec<KernelError>,
    /// 本 tick 被回收的进程（id 升序）
    pub retired: Vec<ProcessId>,
}

/// 周期性进度报告
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// 本次运行内的 tick 序号（从 0 开始）
    pub tick: u64,
    pub now: SimTime,
    pub usage_fraction: f64,
    pub live: usize,
}

/// `advance`/`run` 的汇总
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvanceReport {
    pub now: SimTime,
    pub usage_fraction: f64,
    /// 曾经创建过的实体总数
    pub created: u64,
    pub live: usize,
    /// 本次运行实际执行的 tick 数
    pub ticks: u64,
    /// 时钟溢出导致运行提前停止
    pub halted: bool,
    pub handler_failures: usize,
}

pub struct SimulationDriver {
    config: KernelConfig,
    step: SimTime,
    now: SimTime,
    ticks: u64,
    pool: Arc<ResourcePool>,
    table: ProcessTable,
    events: Arc<EventDispatcher>,
    trace: Option<TraceLogger>,
}

impl SimulationDriver {
    pub fn new(config: KernelConfig) -> KernelResult<Self> {
        let step = config.validate()?;
        let events = match config.event_queue_limit {
            Some(limit) => EventDispatcher::with_limit(limit),
            None => EventDispatcher::new(),
        };
        info!(
            time_step = config.time_step,
            total_capacity = config.total_capacity,
            entity_cost = config.entity_cost,
            "内核已初始化"
        );
        Ok(Self {
            pool: Arc::new(ResourcePool::new(config.total_capacity)),
            table: ProcessTable::new(),
            events: Arc::new(events),
            config,
            step,
            now: SimTime::ZERO,
            ticks: 0,
            trace: None,
        })
    }

    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn step(&self) -> SimTime {
        self.step
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn processes(&self) -> &ProcessTable {
        &self.table
    }

    /// 资源池的共享句柄；事件处理器可以持有它并在投递期间查询。
    pub fn pool(&self) -> Arc<ResourcePool> {
        Arc::clone(&self.pool)
    }

    /// 分发器的共享句柄；事件处理器可以持有它并在投递期间继续 `emit`。
    pub fn events(&self) -> Arc<EventDispatcher> {
        Arc::clone(&self.events)
    }

    /// 准入进程并预留固定的实体成本；容量不足时拒绝准入，不占用 id。
    #[tracing::instrument(skip(self, name, attrs), fields(name = tracing::field::Empty))]
    pub fn create_entity(
        &mut self,
        name: impl Into<String>,
        attrs: Attributes,
    ) -> KernelResult<ProcessId> {
        let name = name.into();
        tracing::Span::current().record("name", name.as_str());
        let cost = self.config.entity_cost;
        let priority = attrs.priority;
        let pool = &self.pool;
        let admitted = self.table.admit_with(name.clone(), attrs, |id| {
            if pool.reserve(id, cost) {
                Ok(())
            } else {
                Err(KernelError::InsufficientCapacity {
                    owner: id,
                    requested: cost,
                    free: pool.free(),
                })
            }
        });
        let id = match admitted {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "拒绝准入");
                return Err(e);
            }
        };
        debug!(%id, free = self.pool.free(), "实体已创建");
        let t_ns = self.now.0;
        if let Some(trace) = self.trace.as_mut() {
            trace.push(
                t_ns,
                TraceEventKind::Admit {
                    pid: id,
                    name,
                    priority,
                    reserved: cost,
                },
            );
        }
        Ok(id)
    }

    /// 存活进程的额外预留请求。
    pub fn request(&self, id: ProcessId, amount: f64) -> KernelResult<()> {
        if !self.table.contains_live(id) {
            return Err(KernelError::NotFound(id));
        }
        if self.pool.reserve(id, amount) {
            Ok(())
        } else {
            Err(KernelError::InsufficientCapacity {
                owner: id,
                requested: amount,
                free: self.pool.free(),
            })
        }
    }

    pub fn inspect(&self, id: ProcessId) -> KernelResult<ProcessSnapshot> {
        self.table.inspect(id).ok_or(KernelError::NotFound(id))
    }

    /// 外部观察者订阅事件。
    pub fn on<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) -> HandlerResult + Send + Sync + 'static,
    {
        self.events.subscribe(kind, handler)
    }

    pub fn emit(&self, event: Event) -> KernelResult<()> {
        self.events.emit(event)
    }

    pub fn usage_fraction(&self) -> f64 {
        self.pool.usage_fraction()
    }

    pub fn live_count(&self) -> usize {
        self.table.live_count()
    }

    pub fn created_count(&self) -> u64 {
        self.table.admitted_count()
    }

    /// 开启轨迹记录，并写入一条 meta 事件。
    pub fn enable_trace(&mut self) {
        let mut trace = TraceLogger::default();
        trace.push(
            self.now.0,
            TraceEventKind::Meta {
                time_step_ns: self.step.0,
                total_capacity: self.config.total_capacity,
                entity_cost: self.config.entity_cost,
            },
        );
        self.trace = Some(trace);
    }

    pub fn take_trace(&mut self) -> Option<TraceLogger> {
        self.trace.take()
    }

    /// 推进一个 tick。时钟无法再前进一个完整步长时返回 `ClockOverflow`，
    /// 状态保持不变。
    #[tracing::instrument(skip(self), fields(tick = self.ticks + 1))]
    pub fn tick(&mut self) -> KernelResult<TickReport> {
        self.now = self
            .now
            .checked_add(self.step)
            .ok_or(KernelError::ClockOverflow {
                now: self.now,
                step: self.step,
            })?;
        self.ticks += 1;
        let now = self.now;

        let flush = self.events.flush_due(now);
        if let Some(trace) = self.trace.as_mut() {
            for ev in &flush.delivered {
                trace.push(
                    now.0,
                    TraceEventKind::Deliver {
                        event_kind: ev.kind,
                        source: ev.source,
                        at_ns: ev.at.0,
                    },
                );
            }
            for failure in &flush.failures {
                if let KernelError::HandlerFailure {
                    kind,
                    source_pid,
                    handler,
                    message,
                    ..
                } = failure
                {
                    trace.push(
                        now.0,
                        TraceEventKind::HandlerFailed {
                            event_kind: *kind,
                            source: *source_pid,
                            handler: *handler,
                            message: message.clone(),
                        },
                    );
                }
            }
        }

        let mut retired = Vec::new();
        for id in self.table.snapshot_live() {
            if self.table.step(id, now, self.step, &self.events) != Some(StepOutcome::Exhausted) {
                continue;
            }
            let Some(snap) = self.table.retire(id) else {
                continue;
            };
            let released = self.pool.release(id);
            debug!(%id, age = snap.age, released, "回收进程");
            if let Err(e) = self.events.emit(Event::new(now, EventKind::Apoptosis, id)) {
                warn!(%id, error = %e, "无法发出 apoptosis 事件");
            }
            if let Some(trace) = self.trace.as_mut() {
                trace.push(
                    now.0,
                    TraceEventKind::Retire {
                        pid: id,
                        age: snap.age,
                        released,
                    },
                );
            }
            retired.push(id);
        }

        Ok(TickReport {
            tick: self.ticks,
            now,
            delivered: flush.delivered.len(),
            failures: flush.failures,
            retired,
        })
    }

    /// 运行 `floor(duration / step)` 个 tick，不带观察者。
    pub fn advance(&mut self, duration: SimTime) -> AdvanceReport {
        self.run(duration, &mut ())
    }

    /// 运行 `floor(duration / step)` 个 tick，每个 tick 通知观察者，
    /// 每 `progress_every` 个 tick 报告一次进度。时钟溢出时记录错误并停止。
    pub fn run(&mut self, duration: SimTime, observer: &mut dyn Observer) -> AdvanceReport {
        let count = duration.0 / self.step.0;
        let every = self.config.progress_every;
        info!(ticks = count, from = ?self.now, "▶️  开始运行仿真");

        let mut handler_failures = 0;
        let mut ran = 0;
        let mut halted = false;
        for i in 0..count {
            let report = match self.tick() {
                Ok(report) => report,
                Err(e) => {
                    error!(error = %e, tick = i, "仿真停止");
                    halted = true;
                    break;
                }
            };
            ran += 1;
            handler_failures += report.failures.len();
            observer.on_tick(&report);

            if every > 0 && i % every == 0 {
                let progress = Progress {
                    tick: i,
                    now: self.now,
                    usage_fraction: self.pool.usage_fraction(),
                    live: self.table.live_count(),
                };
                info!(
                    tick = i,
                    time_s = progress.now.as_secs_f64(),
                    usage_pct = progress.usage_fraction * 100.0,
                    live = progress.live,
                    "进度"
                );
                if let Some(trace) = self.trace.as_mut() {
                    trace.push(
                        progress.now.0,
                        TraceEventKind::Progress {
                            tick: i,
                            usage_fraction: progress.usage_fraction,
                            live: progress.live,
                        },
                    );
                }
                observer.on_progress(&progress);
            }
        }

        let summary = AdvanceReport {
            now: self.now,
            usage_fraction: self.pool.usage_fraction(),
            created: self.table.admitted_count(),
            live: self.table.live_count(),
            ticks: ran,
            halted,
            handler_failures,
        };
        info!(
            final_time = ?summary.now,
            usage_pct = summary.usage_fraction * 100.0,
            created = summary.created,
            live = summary.live,
            "✅ 仿真完成"
        );
        summary
    }
}
