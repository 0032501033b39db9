//! 生物学协作者
//!
//! 内核只认识 `Behavior`；这里给出一个具体实现：带基因组与蛋白质的
//! 有机体，每个 tick 消耗能量并让蛋白质降解。

mod gene;
mod organism;
mod protein;

pub use gene::Gene;
pub use organism::{DEFAULT_METABOLIC_RATE, Organism};
pub use protein::{DEFAULT_HALF_LIFE, Protein};
