//! 待投递事件
//!
//! 定义事件队列条目及其优先级比较。

use super::event::Event;
use std::cmp::Ordering;

/// 待投递事件，包含事件本身与插入序号。
pub(crate) struct PendingEvent {
    pub(crate) seq: u64,
    pub(crate) event: Event,
}

// BinaryHeap 是 max-heap；我们需要最小时间优先，因此反向比较。
impl Ord for PendingEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.event.at.cmp(&other.event.at) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            ord => ord,
        }
        .reverse()
    }
}

impl PartialOrd for PendingEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PendingEvent {
    fn eq(&self, other: &Self) -> bool {
        self.event.at == other.event.at && self.seq == other.seq
    }
}

impl Eq for PendingEvent {}
