//! 结构化运行轨迹（用于离线分析）
//!
//! 用 JSON 事件而不是解析文本日志；仿真期间存内存，结束后由宿主写文件。

mod types;

pub use types::{TraceEvent, TraceEventKind, TraceLogger};
