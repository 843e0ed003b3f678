use super::relations::{POKEMON_BASE, POKEMON_BATTLE, POKEMON_REPRODUCTION};
use super::types::RelationSchema;
use crate::error::{PipelineError, Result};
use std::collections::{HashMap, HashSet};

/// What a stage computes
#[derive(Debug, Clone, Copy)]
pub enum StageKind {
    /// Raw relation read from the external source
    Source(&'static RelationSchema),
    /// Projection of a raw relation onto its schema
    Staging(&'static RelationSchema),
    Join,
    Rename,
    Filter,
    Bmi,
    EggHatchTime,
    BaseStats,
    TypeCount,
    BmiRank,
    Assemble,
}

/// A node in the pipeline DAG
#[derive(Debug, Clone)]
pub struct Stage {
    pub name: &'static str,
    pub kind: StageKind,
    pub inputs: &'static [&'static str],
    pub description: &'static str,
}

/// Name of the fully enriched output stage
pub const FINAL_STAGE: &str = "pokemon";

pub static STAGES: &[Stage] = &[
    Stage {
        name: "raw_pokemon_base",
        kind: StageKind::Source(&POKEMON_BASE),
        inputs: &[],
        description: "Raw base table",
    },
    Stage {
        name: "raw_pokemon_battle",
        kind: StageKind::Source(&POKEMON_BATTLE),
        inputs: &[],
        description: "Raw battle table",
    },
    Stage {
        name: "raw_pokemon_reproduction",
        kind: StageKind::Source(&POKEMON_REPRODUCTION),
        inputs: &[],
        description: "Raw reproduction table",
    },
    Stage {
        name: "stg_pokemon_base",
        kind: StageKind::Staging(&POKEMON_BASE),
        inputs: &["raw_pokemon_base"],
        description: "Typed projection of the base table",
    },
    Stage {
        name: "stg_pokemon_battle",
        kind: StageKind::Staging(&POKEMON_BATTLE),
        inputs: &["raw_pokemon_battle"],
        description: "Typed projection of the battle table",
    },
    Stage {
        name: "stg_pokemon_reproduction",
        kind: StageKind::Staging(&POKEMON_REPRODUCTION),
        inputs: &["raw_pokemon_reproduction"],
        description: "Typed projection of the reproduction table",
    },
    Stage {
        name: "joined_pokemon",
        kind: StageKind::Join,
        inputs: &[
            "stg_pokemon_base",
            "stg_pokemon_battle",
            "stg_pokemon_reproduction",
        ],
        description: "Inner join of the staged tables on ID",
    },
    Stage {
        name: "renamed_pokemon",
        kind: StageKind::Rename,
        inputs: &["joined_pokemon"],
        description: "Canonical snake_case column names",
    },
    Stage {
        name: "filtered_pokemon",
        kind: StageKind::Filter,
        inputs: &["renamed_pokemon"],
        description: "Rows of the configured generation",
    },
    Stage {
        name: "calculated_bmi",
        kind: StageKind::Bmi,
        inputs: &["filtered_pokemon"],
        description: "weight_kilograms / height_meters^2",
    },
    Stage {
        name: "calculated_egg_hatch_time",
        kind: StageKind::EggHatchTime,
        inputs: &["filtered_pokemon"],
        description: "ceil(egg_steps / 100)",
    },
    Stage {
        name: "calculated_base_stats",
        kind: StageKind::BaseStats,
        inputs: &["filtered_pokemon"],
        description: "Sum of the six combat stats",
    },
    Stage {
        name: "type_count",
        kind: StageKind::TypeCount,
        inputs: &["filtered_pokemon"],
        description: "Number of rows sharing type_1",
    },
    Stage {
        name: "ranked_bmi",
        kind: StageKind::BmiRank,
        inputs: &["calculated_bmi"],
        description: "BMI rank, highest first, ordered by id",
    },
    Stage {
        name: FINAL_STAGE,
        kind: StageKind::Assemble,
        inputs: &[
            "filtered_pokemon",
            "ranked_bmi",
            "calculated_base_stats",
            "calculated_egg_hatch_time",
            "type_count",
        ],
        description: "Filtered rows enriched with every metric",
    },
];

pub fn get_stage(name: &str) -> Option<&'static Stage> {
    STAGES.iter().find(|s| s.name == name)
}

/// Resolves which stages must run to materialize a target
pub struct StageResolver {
    /// Map of stage name -> stages it reads
    deps: HashMap<&'static str, &'static [&'static str]>,
}

impl StageResolver {
    pub fn new() -> Self {
        let deps = STAGES.iter().map(|s| (s.name, s.inputs)).collect();
        Self { deps }
    }

    /// The target and all of its ancestors, parents before children
    pub fn resolve(&self, target: &str) -> Result<Vec<&'static Stage>> {
        if get_stage(target).is_none() {
            return Err(PipelineError::UnknownStage(target.to_string()));
        }

        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut temp_visited: HashSet<&str> = HashSet::new();
        self.visit(target, &mut visited, &mut temp_visited, &mut result)?;

        Ok(result)
    }

    fn visit<'a>(
        &self,
        name: &'a str,
        visited: &mut HashSet<&'a str>,
        temp_visited: &mut HashSet<&'a str>,
        result: &mut Vec<&'static Stage>,
    ) -> Result<()> {
        if temp_visited.contains(name) {
            return Err(PipelineError::CircularDependency(name.to_string()));
        }
        if visited.contains(name) {
            return Ok(());
        }

        temp_visited.insert(name);

        let stage = get_stage(name).ok_or_else(|| PipelineError::UnknownStage(name.to_string()))?;
        if let Some(inputs) = self.deps.get(name) {
            for input in inputs.iter() {
                self.visit(input, visited, temp_visited, result)?;
            }
        }

        temp_visited.remove(name);
        visited.insert(name);
        result.push(stage);

        Ok(())
    }

    /// Every stage in dependency order
    pub fn all_stages_ordered(&self) -> Result<Vec<&'static Stage>> {
        self.resolve(FINAL_STAGE)
    }
}

impl Default for StageResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_bmi_rank_includes_parents() {
        let resolver = StageResolver::new();
        let stages = resolver.resolve("ranked_bmi").unwrap();
        let names: Vec<_> = stages.iter().map(|s| s.name).collect();

        assert!(names.contains(&"calculated_bmi"));
        assert!(names.contains(&"filtered_pokemon"));
        assert!(names.contains(&"raw_pokemon_reproduction"));
        assert!(!names.contains(&"type_count"));
        assert_eq!(names.last(), Some(&"ranked_bmi"));

        let pos = |n: &str| names.iter().position(|&s| s == n).unwrap();
        assert!(pos("joined_pokemon") < pos("renamed_pokemon"));
        assert!(pos("renamed_pokemon") < pos("filtered_pokemon"));
        assert!(pos("calculated_bmi") < pos("ranked_bmi"));
    }

    #[test]
    fn test_all_stages_cover_the_dag() {
        let resolver = StageResolver::new();
        let stages = resolver.all_stages_ordered().unwrap();
        assert_eq!(stages.len(), STAGES.len());
        assert_eq!(stages.last().map(|s| s.name), Some(FINAL_STAGE));
    }

    #[test]
    fn test_unknown_stage_error() {
        let resolver = StageResolver::new();
        let result = resolver.resolve("nonexistent");
        assert_eq!(
            result.unwrap_err(),
            PipelineError::UnknownStage("nonexistent".to_string())
        );
    }

    #[test]
    fn test_every_input_is_a_known_stage() {
        for stage in STAGES {
            for input in stage.inputs {
                assert!(get_stage(input).is_some(), "{} reads unknown {}", stage.name, input);
            }
        }
    }
}
