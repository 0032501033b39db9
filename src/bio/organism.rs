use std::collections::BTreeMap;
use tracing::trace;

use super::gene::Gene;
use super::protein::Protein;
use crate::proc::{Behavior, TickContext, Vitals};

/// 每仿真秒消耗的能量
pub const DEFAULT_METABOLIC_RATE: f64 = 0.5;

/// 有机体：基因组 + 蛋白质组，作为进程的每 tick 行为。
#[derive(Debug, Clone)]
pub struct Organism {
    pub genome: BTreeMap<String, Gene>,
    pub proteins: BTreeMap<String, Protein>,
    pub metabolic_rate: f64,
}

impl Default for Organism {
    fn default() -> Self {
        Self {
            genome: BTreeMap::new(),
            proteins: BTreeMap::new(),
            metabolic_rate: DEFAULT_METABOLIC_RATE,
        }
    }
}

impl Organism {
    pub fn new(genes: impl IntoIterator<Item = Gene>) -> Self {
        let mut org = Self::default();
        for gene in genes {
            org.add_gene(gene);
        }
        org
    }

    pub fn with_metabolic_rate(mut self, rate: f64) -> Self {
        self.metabolic_rate = rate;
        self
    }

    /// 同名基因会被替换
    pub fn add_gene(&mut self, gene: Gene) {
        self.genome.insert(gene.name.clone(), gene);
    }

    pub fn add_protein(&mut self, protein: Protein) {
        self.proteins.insert(protein.name.clone(), protein);
    }

    /// 表达指定基因；未知基因名返回 None。
    pub fn express_gene(&mut self, name: &str, factor: f64) -> Option<f64> {
        self.genome.get_mut(name).map(|g| g.express(factor))
    }
}

impl Behavior for Organism {
    fn on_tick(&mut self, vitals: &mut Vitals, ctx: &TickContext<'_>) {
        let dt = ctx.dt.as_secs_f64();
        vitals.vitality = (vitals.vitality - dt * self.metabolic_rate).max(0.0);
        for protein in self.proteins.values_mut() {
            protein.degrade();
        }
        trace!(pid = %ctx.pid, vitality = vitals.vitality, "有机体代谢");
    }
}
