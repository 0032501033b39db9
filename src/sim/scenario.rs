use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use super::config::KernelConfig;
use super::driver::SimulationDriver;
use super::event::{Event, EventKind};
use super::time::SimTime;
use crate::bio::{Gene, Organism, Protein};
use crate::error::{KernelError, KernelResult};
use crate::proc::{Attributes, DEFAULT_PRIORITY, DEFAULT_VITALITY, ProcessId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub schema_version: u32,
    #[serde(default)]
    pub config: Option<KernelConfig>,
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
    #[serde(default)]
    pub events: Vec<EventSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySpec {
    pub name: String,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub vitality: Option<f64>,
    #[serde(default)]
    pub metabolic_rate: Option<f64>,
    #[serde(default)]
    pub genes: Vec<GeneSpec>,
    #[serde(default)]
    pub proteins: Vec<Protein>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneSpec {
    pub name: String,
    pub sequence: String,
    /// 创建时立即表达一次的倍数
    #[serde(default)]
    pub express: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSpec {
    /// 可投递时间（秒）
    pub at: f64,
    pub kind: EventKind,
    /// `entities` 中的下标
    pub source: usize,
}

impl EntitySpec {
    fn organism(&self) -> Organism {
        let mut org = Organism::new(
            self.genes
                .iter()
                .map(|g| Gene::new(g.name.clone(), g.sequence.clone())),
        );
        if let Some(rate) = self.metabolic_rate {
            org = org.with_metabolic_rate(rate);
        }
        for g in &self.genes {
            if let Some(factor) = g.express {
                org.express_gene(&g.name, factor);
            }
        }
        for p in &self.proteins {
            org.add_protein(p.clone());
        }
        org
    }

    pub fn attributes(&self) -> Attributes {
        Attributes::new(
            self.priority.unwrap_or(DEFAULT_PRIORITY),
            self.vitality.unwrap_or(DEFAULT_VITALITY),
            self.organism(),
        )
    }
}

impl Scenario {
    pub fn from_json(raw: &str) -> KernelResult<Self> {
        serde_json::from_str(raw).map_err(|e| KernelError::Scenario(e.to_string()))
    }

    pub fn load(path: &Path) -> KernelResult<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| KernelError::Scenario(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    /// 两个各带两条基因的有机体
    pub fn demo() -> Self {
        let entity = |name: &str, genes: [(&str, &str); 2]| EntitySpec {
            name: name.to_string(),
            priority: None,
            vitality: None,
            metabolic_rate: None,
            genes: genes
                .iter()
                .map(|(n, s)| GeneSpec {
                    name: n.to_string(),
                    sequence: s.to_string(),
                    express: None,
                })
                .collect(),
            proteins: Vec::new(),
        };
        Self {
            schema_version: 1,
            config: None,
            entities: vec![
                entity(
                    "Organism_1",
                    [
                        ("GROWTH_GENE", "ATCGATCGATCG"),
                        ("ENERGY_GENE", "GCTAGCTAGCTA"),
                    ],
                ),
                entity(
                    "Organism_2",
                    [
                        ("SURVIVAL_GENE", "TACGTACGTACG"),
                        ("REPRODUCTION_GENE", "AAAAAATTTTTT"),
                    ],
                ),
            ],
            events: Vec::new(),
        }
    }

    /// 蛋白质半衰期必须为正且有限，否则降解会产生 NaN 或负浓度。
    pub fn validate(&self) -> KernelResult<()> {
        for entity in &self.entities {
            for p in &entity.proteins {
                if !p.half_life.is_finite() || p.half_life <= 0.0 {
                    return Err(KernelError::Scenario(format!(
                        "entity {}: protein {} has invalid half_life {}",
                        entity.name, p.name, p.half_life
                    )));
                }
            }
        }
        Ok(())
    }

    /// 创建全部实体并发出预定事件。
    ///
    /// 容量不足的实体被拒绝准入并跳过；返回值与 `entities` 一一对应。
    pub fn apply(&self, driver: &mut SimulationDriver) -> KernelResult<Vec<Option<ProcessId>>> {
        self.validate()?;
        let mut ids = Vec::with_capacity(self.entities.len());
        for spec in &self.entities {
            match driver.create_entity(spec.name.clone(), spec.attributes()) {
                Ok(id) => ids.push(Some(id)),
                Err(e @ KernelError::InsufficientCapacity { .. }) => {
                    warn!(name = %spec.name, error = %e, "实体未创建");
                    ids.push(None);
                }
                Err(e) => return Err(e),
            }
        }

        for ev in &self.events {
            let source = ids.get(ev.source).copied().flatten().ok_or_else(|| {
                KernelError::Scenario(format!("event source {} has no live entity", ev.source))
            })?;
            driver.emit(Event::new(SimTime::from_secs_f64(ev.at), ev.kind, source))?;
        }

        info!(
            entities = ids.iter().filter(|id| id.is_some()).count(),
            events = self.events.len(),
            "场景已加载"
        );
        Ok(ids)
    }
}
