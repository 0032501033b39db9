use serde::{Deserialize, Serialize};

pub const DEFAULT_HALF_LIFE: f64 = 10.0;

fn default_half_life() -> f64 {
    DEFAULT_HALF_LIFE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Protein {
    pub name: String,
    pub origin_gene: String,
    #[serde(default)]
    pub concentration: f64,
    #[serde(default = "default_half_life")]
    pub half_life: f64,
}

impl Protein {
    pub fn new(name: impl Into<String>, origin_gene: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin_gene: origin_gene.into(),
            concentration: 0.0,
            half_life: DEFAULT_HALF_LIFE,
        }
    }

    /// 每次调用按 `1 - 1/half_life` 衰减一次
    pub fn degrade(&mut self) {
        self.concentration *= 1.0 - 1.0 / self.half_life;
    }
}
