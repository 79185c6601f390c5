//! Board Store: which stage owns which deal, and in what order.
//!
//! The store is the single source of truth for the board. Outside this crate
//! it is only ever handed out by shared reference; all mutation goes through
//! the drag controller.

use std::collections::HashSet;

use tracing::debug;

use pipeboard_shared::{Deal, DealId, PipeboardError, Result, Stage, StageId, TargetId};

use crate::seed::BoardSeed;

/// One lane: its static stage configuration plus the ordered deals it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Lane {
    stage: Stage,
    deals: Vec<Deal>,
}

/// Count and summed value of a stage, as shown in its column header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageSummary {
    pub count: usize,
    pub total_value: u64,
}

/// A full copy of the deal assignment, taken so it can be restored later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    lanes: Vec<Lane>,
}

/// Ordered mapping from stage to deals.
///
/// Invariant: every deal id appears in exactly one stage's sequence, exactly
/// once. `from_seed` establishes it and `move_deal` preserves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardStore {
    lanes: Vec<Lane>,
}

impl BoardStore {
    /// Build a store from seed data, rejecting seeds that break the
    /// uniqueness invariant.
    pub fn from_seed(seed: BoardSeed) -> Result<Self> {
        seed.validate()?;
        let lanes = seed
            .stages
            .into_iter()
            .map(|s| {
                let (stage, deals) = s.into_parts();
                Lane { stage, deals }
            })
            .collect();
        Ok(Self { lanes })
    }

    /// Stages in their configured left-to-right order.
    pub fn stages(&self) -> impl Iterator<Item = &Stage> {
        self.lanes.iter().map(|l| &l.stage)
    }

    pub fn stage_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn stage(&self, id: &StageId) -> Option<&Stage> {
        self.lane(id).map(|l| &l.stage)
    }

    /// Position of a stage in the configured order.
    pub fn stage_position(&self, id: &StageId) -> Option<usize> {
        self.lanes.iter().position(|l| &l.stage.id == id)
    }

    /// Stage at a position in the configured order.
    pub fn stage_at(&self, position: usize) -> Option<&Stage> {
        self.lanes.get(position).map(|l| &l.stage)
    }

    /// Ordered deals of a stage, top to bottom.
    pub fn deals(&self, stage: &StageId) -> Option<&[Deal]> {
        self.lane(stage).map(|l| l.deals.as_slice())
    }

    /// Ordered deal ids of a stage.
    pub fn deal_ids(&self, stage: &StageId) -> Vec<DealId> {
        self.lane(stage)
            .map(|l| l.deals.iter().map(|d| d.id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn deal(&self, id: &DealId) -> Option<&Deal> {
        self.lanes
            .iter()
            .flat_map(|l| l.deals.iter())
            .find(|d| &d.id == id)
    }

    /// Total number of deals on the board.
    pub fn deal_count(&self) -> usize {
        self.lanes.iter().map(|l| l.deals.len()).sum()
    }

    /// The stage currently owning `deal`, by linear scan.
    pub fn find_stage_of(&self, deal: &DealId) -> Option<&StageId> {
        self.lanes
            .iter()
            .find(|l| l.deals.iter().any(|d| &d.id == deal))
            .map(|l| &l.stage.id)
    }

    /// Resolve a hovered element to the stage that contains it. A stage
    /// target resolves to itself when it is part of the board.
    pub fn find_container(&self, target: &TargetId) -> Option<&StageId> {
        match target {
            TargetId::Stage(id) => self.lane(id).map(|l| &l.stage.id),
            TargetId::Deal(id) => self.find_stage_of(id),
        }
    }

    /// Position of `deal` within `stage`.
    pub fn index_of(&self, stage: &StageId, deal: &DealId) -> Option<usize> {
        self.lane(stage)?.deals.iter().position(|d| &d.id == deal)
    }

    pub fn stage_summary(&self, stage: &StageId) -> Option<StageSummary> {
        self.lane(stage).map(|l| StageSummary {
            count: l.deals.len(),
            total_value: l.deals.iter().map(|d| d.value).sum(),
        })
    }

    /// Move `deal` out of `from` and into `to` at `at_index`, clamped to
    /// `[0, len]` of the destination after removal. Returns the index the deal
    /// landed at.
    ///
    /// Nothing changes when `deal` is not in `from` or either stage is unknown.
    /// `from == to` is allowed and reorders within the stage.
    pub(crate) fn move_deal(
        &mut self,
        deal: &DealId,
        from: &StageId,
        to: &StageId,
        at_index: usize,
    ) -> Result<usize> {
        let from_pos = self
            .stage_position(from)
            .ok_or_else(|| PipeboardError::UnknownStage(from.clone()))?;
        let to_pos = self
            .stage_position(to)
            .ok_or_else(|| PipeboardError::UnknownStage(to.clone()))?;
        let deal_pos = self.lanes[from_pos]
            .deals
            .iter()
            .position(|d| &d.id == deal)
            .ok_or_else(|| match self.find_stage_of(deal) {
                Some(_) => PipeboardError::DealNotInStage {
                    deal: deal.clone(),
                    stage: from.clone(),
                },
                None => PipeboardError::UnknownDeal(deal.clone()),
            })?;

        let moved = self.lanes[from_pos].deals.remove(deal_pos);
        let dest = &mut self.lanes[to_pos].deals;
        let index = at_index.min(dest.len());
        dest.insert(index, moved);

        debug!(%deal, %from, %to, requested = at_index, index, "deal moved");
        Ok(index)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            lanes: self.lanes.clone(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: BoardSnapshot) {
        self.lanes = snapshot.lanes;
    }

    /// Verify that every deal id appears exactly once across all stages.
    pub fn check_invariants(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for lane in &self.lanes {
            for deal in &lane.deals {
                if !seen.insert(&deal.id) {
                    return Err(PipeboardError::validation(format!(
                        "deal '{}' appears more than once",
                        deal.id
                    )));
                }
            }
        }
        Ok(())
    }

    fn lane(&self, id: &StageId) -> Option<&Lane> {
        self.lanes.iter().find(|l| &l.stage.id == id)
    }
}
