//! Stage executor: resolves the DAG for a target and materializes each stage
//! in dependency order.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::relation::Relation;
use crate::schema::{Stage, StageKind, StageResolver, RAW_KEY, RAW_RELATIONS};
use crate::source::{MemorySource, RawSource};
use crate::transform::{self, JoinLoss};
use crate::ui::{Phase, SilentUi, Ui};

/// Rows materialized by one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub name: &'static str,
    pub rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub stages: Vec<StageReport>,
    pub join_losses: Vec<JoinLoss>,
}

impl RunReport {
    pub fn rows(&self, stage: &str) -> Option<usize> {
        self.stages.iter().find(|s| s.name == stage).map(|s| s.rows)
    }

    /// Rows dropped across every join boundary, both sides counted
    pub fn dropped_rows(&self) -> usize {
        self.join_losses
            .iter()
            .map(|l| l.left_unmatched + l.right_unmatched)
            .sum()
    }
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub output: Relation,
    pub report: RunReport,
}

pub struct Pipeline {
    config: PipelineConfig,
    stages: Vec<&'static Stage>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let stages = StageResolver::new().resolve(&config.target)?;
        Ok(Self { config, stages })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Stages this pipeline will materialize, parents first
    pub fn stages(&self) -> &[&'static Stage] {
        &self.stages
    }

    /// Materialize every resolved stage and return the target relation.
    ///
    /// Each stage sees its inputs fully materialized. Any error aborts the
    /// whole run; nothing is handed back for writing.
    pub fn run(&self, source: &impl RawSource, ui: &mut impl Ui) -> Result<PipelineRun> {
        let mut materialized: HashMap<&'static str, Relation> = HashMap::new();
        let mut report = RunReport::default();

        tracing::info!(
            source = %source.describe(),
            target = %self.config.target,
            generation = self.config.generation,
            "starting pipeline run"
        );
        ui.set_info(format!("{} → {}", source.describe(), self.config.target));

        for (n, stage) in self.stages.iter().enumerate() {
            let phase = match stage.kind {
                StageKind::Source(_) => Phase::Loading,
                _ => Phase::Transforming,
            };
            ui.set_phase(phase);
            ui.stage_started(stage.name, n, self.stages.len());

            let relation = self
                .execute(stage, &materialized, source, &mut report.join_losses)
                .with_context(|| format!("Stage {} failed", stage.name))?;

            tracing::info!(stage = stage.name, rows = relation.len(), "materialized");
            ui.stage_finished(stage.name, relation.len());
            report.stages.push(StageReport {
                name: stage.name,
                rows: relation.len(),
            });
            materialized.insert(stage.name, relation);
        }

        let output = materialized
            .remove(self.config.target.as_str())
            .ok_or_else(|| PipelineError::UnknownStage(self.config.target.clone()))?;

        if report.dropped_rows() > 0 {
            tracing::warn!(
                dropped = report.dropped_rows(),
                "inner joins dropped rows without a match"
            );
        }

        Ok(PipelineRun { output, report })
    }

    /// The target relation's fields, from a run over empty raw relations
    pub fn output_schema(&self) -> Result<Relation> {
        let source = RAW_RELATIONS
            .iter()
            .fold(MemorySource::new(), |source, schema| {
                source.with(schema, transform::empty_raw(schema))
            });
        Ok(self.run(&source, &mut SilentUi::new())?.output)
    }

    fn execute(
        &self,
        stage: &Stage,
        materialized: &HashMap<&'static str, Relation>,
        source: &impl RawSource,
        losses: &mut Vec<JoinLoss>,
    ) -> Result<Relation> {
        let input = |n: usize| stage_input(stage, materialized, n);
        let config = &self.config;

        let relation = match stage.kind {
            StageKind::Source(schema) => source
                .read(schema)
                .with_context(|| format!("Failed to read {}", schema.raw_table))?
                .renamed(stage.name),
            StageKind::Staging(schema) => transform::stage(input(0)?, schema)?,
            StageKind::Join => {
                let (joined, join_losses) = transform::inner_join_all(
                    &[input(0)?, input(1)?, input(2)?],
                    RAW_KEY,
                    stage.name,
                )?;
                losses.extend(join_losses);
                joined
            }
            StageKind::Rename => transform::rename_columns(input(0)?.clone(), stage.name)?,
            StageKind::Filter => {
                transform::filter_generation(input(0)?, config.generation, stage.name)?
            }
            StageKind::Bmi => transform::calculate_bmi(input(0)?, config.zero_height, stage.name)?,
            StageKind::EggHatchTime => transform::calculate_egg_hatch_time(input(0)?, stage.name)?,
            StageKind::BaseStats => transform::calculate_base_stats(input(0)?, stage.name)?,
            StageKind::TypeCount => transform::count_types(input(0)?, stage.name)?,
            StageKind::BmiRank => transform::rank_bmi(input(0)?, config.rank_method, stage.name)?,
            StageKind::Assemble => {
                let metrics = (1..stage.inputs.len())
                    .map(input)
                    .collect::<Result<Vec<_>, _>>()?;
                let (enriched, join_losses) =
                    transform::assemble(input(0)?, &metrics, stage.name)?;
                losses.extend(join_losses);
                enriched
            }
        };

        Ok(relation)
    }
}

fn stage_input<'a>(
    stage: &Stage,
    materialized: &'a HashMap<&'static str, Relation>,
    n: usize,
) -> Result<&'a Relation, PipelineError> {
    stage
        .inputs
        .get(n)
        .and_then(|name| materialized.get(name))
        .ok_or_else(|| PipelineError::UnknownStage(format!("input {} of {}", n, stage.name)))
}
