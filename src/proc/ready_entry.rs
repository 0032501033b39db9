//! 就绪队列条目
//!
//! 按 (优先级, 到达序号) 排序，值越小越先被选中。

use super::id::ProcessId;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ReadyEntry {
    pub(crate) priority: i32,
    pub(crate) seq: u64,
    pub(crate) id: ProcessId,
}

// BinaryHeap 是 max-heap；我们需要最小优先级优先，因此反向比较。
impl Ord for ReadyEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.priority.cmp(&other.priority) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            ord => ord,
        }
        .reverse()
    }
}

impl PartialOrd for ReadyEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ReadyEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for ReadyEntry {}
