use super::{VoteAggregate, VoteChange, VoteType};

/// Client-side vote state that shows a toggle before the server confirms it.
///
/// `predict` applies the toggle to the displayed aggregate right away. The caller then
/// issues the real vote and either `confirm`s the aggregate the server returned or
/// `revert`s to the last one the server agreed to.
#[derive(Debug, Clone)]
pub struct OptimisticVote {
    confirmed: VoteAggregate,
    shown: VoteAggregate,
}

impl OptimisticVote {
    pub fn new(confirmed: VoteAggregate) -> Self {
        Self {
            shown: confirmed.clone(),
            confirmed,
        }
    }

    pub fn shown(&self) -> &VoteAggregate {
        &self.shown
    }

    pub fn confirmed(&self) -> &VoteAggregate {
        &self.confirmed
    }

    pub fn is_pending(&self) -> bool {
        self.shown != self.confirmed
    }

    pub fn predict(&mut self, viewer_id: uuid::Uuid, vote: VoteType) -> VoteChange {
        self.shown.toggle(viewer_id, vote)
    }

    pub fn confirm(&mut self, aggregate: VoteAggregate) {
        self.shown = aggregate.clone();
        self.confirmed = aggregate;
    }

    pub fn revert(&mut self) {
        self.shown = self.confirmed.clone();
    }
}
