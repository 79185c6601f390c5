//! Board seeds: the static stage list plus the initial deal assignment.
//!
//! Seeds are read from TOML or JSON (chosen by file extension) or taken from
//! the built-in sample board.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use pipeboard_shared::{Deal, PipeboardError, Result, Stage, StageId};

/// Initial board content supplied by the host at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSeed {
    pub stages: Vec<StageSeed>,
}

/// A stage and the deals it starts with, top to bottom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSeed {
    pub id: StageId,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub deals: Vec<Deal>,
}

impl StageSeed {
    pub(crate) fn into_parts(self) -> (Stage, Vec<Deal>) {
        (
            Stage::new(self.id, self.name, self.color),
            self.deals,
        )
    }
}

impl BoardSeed {
    /// The five-stage sample pipeline.
    pub fn sample() -> Self {
        let stage = |id: &str, name: &str, color: &str, deals: Vec<Deal>| StageSeed {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            deals,
        };

        Self {
            stages: vec![
                stage(
                    "new",
                    "Leads In",
                    "blue",
                    vec![
                        Deal::new("1", "Website Redesign", 12_000)
                            .with_company("Acme Corp")
                            .with_tags(["Web", "Urgent"]),
                        Deal::new("2", "SEO Audit", 3_500)
                            .with_company("Local Biz")
                            .with_tasks_due(true),
                    ],
                ),
                stage(
                    "contact",
                    "Contact Made",
                    "yellow",
                    vec![Deal::new("3", "Marketing Campaign", 15_000).with_company("TechStart Inc")],
                ),
                stage(
                    "qualified",
                    "Qualified",
                    "magenta",
                    vec![
                        Deal::new("4", "App Development", 45_000)
                            .with_company("MobileFirst")
                            .with_tags(["App"]),
                    ],
                ),
                stage("offer", "Offer Sent", "#f97316", vec![]),
                stage(
                    "won",
                    "Closed Won",
                    "green",
                    vec![
                        Deal::new("5", "Logo Design", 500)
                            .with_company("Bakery")
                            .with_tags(["Design"]),
                    ],
                ),
            ],
        }
    }

    /// Check that the seed can back a board: at least one stage, unique stage
    /// ids, every deal id unique across the whole board, no repeated tag on a
    /// deal.
    pub fn validate(&self) -> Result<()> {
        if self.stages.is_empty() {
            return Err(PipeboardError::validation("a board needs at least one stage"));
        }

        let mut stage_ids = HashSet::new();
        let mut deal_ids = HashSet::new();
        for stage in &self.stages {
            if !stage_ids.insert(&stage.id) {
                return Err(PipeboardError::validation(format!(
                    "duplicate stage id '{}'",
                    stage.id
                )));
            }
            for deal in &stage.deals {
                if !deal_ids.insert(&deal.id) {
                    return Err(PipeboardError::validation(format!(
                        "duplicate deal id '{}' (in stage '{}')",
                        deal.id, stage.id
                    )));
                }
                let mut tags = HashSet::new();
                if let Some(dup) = deal.tags.iter().find(|t| !tags.insert(t.as_str())) {
                    return Err(PipeboardError::validation(format!(
                        "deal '{}' repeats tag '{dup}'",
                        deal.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Parse a TOML seed.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PipeboardError::parse(format!("invalid seed: {e}")))
    }

    /// Parse a JSON seed.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| PipeboardError::parse(format!("invalid seed: {e}")))
    }
}

/// Load a seed file; `.json` files are parsed as JSON, everything else as TOML.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_seed(path: &Path) -> Result<BoardSeed> {
    let content = std::fs::read_to_string(path).map_err(|e| PipeboardError::io(path, e))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let seed = if is_json {
        BoardSeed::from_json(&content)?
    } else {
        BoardSeed::from_toml(&content)?
    };
    seed.validate()?;

    debug!(stages = seed.stages.len(), "seed loaded");
    Ok(seed)
}

/// Load `path` when given, else fall back to the sample board.
pub fn load_seed_or_sample(path: Option<&Path>) -> Result<BoardSeed> {
    match path {
        Some(p) => load_seed(p),
        None => Ok(BoardSeed::sample()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_seed_is_valid() {
        let seed = BoardSeed::sample();
        seed.validate().expect("sample validates");
        assert_eq!(seed.stages.len(), 5);
        let total: usize = seed.stages.iter().map(|s| s.deals.len()).sum();
        assert_eq!(total, 5);
        assert!(seed.stages[3].deals.is_empty());
    }

    #[test]
    fn toml_seed_parses() {
        let content = r##"
[[stages]]
id = "new"
name = "Leads In"
color = "blue"

[[stages.deals]]
id = "D1"
title = "Website Redesign"
company = "Acme Corp"
value = 12000
tags = ["Web"]

[[stages.deals]]
id = "D2"
title = "SEO Audit"
value = 3500
tasks_due = true

[[stages]]
id = "won"
name = "Closed Won"
color = "#22c55e"
"##;
        let seed = BoardSeed::from_toml(content).expect("parse");
        seed.validate().expect("valid");
        assert_eq!(seed.stages.len(), 2);
        assert_eq!(seed.stages[0].deals.len(), 2);
        assert!(seed.stages[0].deals[1].tasks_due);
        assert!(seed.stages[1].deals.is_empty());
    }

    #[test]
    fn json_seed_parses() {
        let content = r#"{"stages":[{"id":"new","name":"New","color":"red",
            "deals":[{"id":"1","title":"T","value":5}]}]}"#;
        let seed = BoardSeed::from_json(content).expect("parse");
        assert_eq!(seed.stages[0].deals[0].value, 5);
    }

    #[test]
    fn duplicate_deal_across_stages_is_rejected() {
        let mut seed = BoardSeed::sample();
        let dup = seed.stages[0].deals[0].clone();
        seed.stages[4].deals.push(dup);
        let err = seed.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate deal id '1'"));
    }

    #[test]
    fn duplicate_stage_and_empty_board_are_rejected() {
        let mut seed = BoardSeed::sample();
        seed.stages[1].id = "new".into();
        assert!(seed.validate().unwrap_err().to_string().contains("duplicate stage"));

        let empty = BoardSeed { stages: vec![] };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn repeated_tag_is_rejected() {
        let mut seed = BoardSeed::sample();
        seed.stages[0].deals[0].tags = vec!["Web".into(), "Web".into()];
        assert!(seed.validate().unwrap_err().to_string().contains("repeats tag"));
    }

    #[test]
    fn load_seed_picks_format_by_extension() {
        let path = std::env::temp_dir().join(format!("pipeboard-seed-{}.json", std::process::id()));
        let json = serde_json::to_string(&BoardSeed::sample()).expect("serialize");
        std::fs::write(&path, json).expect("write");
        let seed = load_seed(&path).expect("load");
        std::fs::remove_file(&path).ok();
        assert_eq!(seed.stages.len(), 5);
    }

    #[test]
    fn missing_seed_file_is_io_error() {
        let err = load_seed(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, PipeboardError::Io { .. }));
    }
}
