use serde::{Deserialize, Serialize};

/// 每次表达提升的基础幅度
const EXPRESSION_INCREMENT: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub name: String,
    pub sequence: String,
    #[serde(default)]
    pub expression_level: f64,
}

impl Gene {
    pub fn new(name: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
            expression_level: 0.0,
        }
    }

    /// 表达水平提升 `0.1 * factor`，上限 1.0；返回新的表达水平。
    pub fn express(&mut self, factor: f64) -> f64 {
        self.expression_level = (self.expression_level + EXPRESSION_INCREMENT * factor).min(1.0);
        self.expression_level
    }
}
