use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Up,
    Down,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(format!("unknown vote type: {other}")),
        }
    }
}

/// What a single toggle did to one viewer's vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VoteChange {
    Added { vote: VoteType },
    Removed { vote: VoteType },
    Switched { from: VoteType, to: VoteType },
}

impl VoteChange {
    /// Clicking the same button twice un-votes; clicking the other one switches.
    pub fn resolve(previous: Option<VoteType>, requested: VoteType) -> Self {
        match previous {
            None => Self::Added { vote: requested },
            Some(prev) if prev == requested => Self::Removed { vote: prev },
            Some(prev) => Self::Switched {
                from: prev,
                to: requested,
            },
        }
    }

    /// The viewer's vote after the change.
    pub fn current(&self) -> Option<VoteType> {
        match self {
            Self::Added { vote } => Some(*vote),
            Self::Removed { .. } => None,
            Self::Switched { to, .. } => Some(*to),
        }
    }
}

/// Up/down counters plus the per-viewer map they are derived from.
///
/// The counters always equal the number of map entries holding that vote type.
/// Every mutation goes through [`VoteAggregate::apply`], which adjusts both together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteAggregate {
    pub upvotes: u32,
    pub downvotes: u32,
    /// Never serialized: callers see their own vote through [`VoteAggregate::result_for`].
    #[serde(skip_serializing, default)]
    pub user_votes: HashMap<uuid::Uuid, VoteType>,
}

impl VoteAggregate {
    /// Rebuild an aggregate from stored vote rows, counting rather than trusting
    /// any cached counter.
    pub fn from_votes<I>(votes: I) -> Self
    where
        I: IntoIterator<Item = (uuid::Uuid, VoteType)>,
    {
        let user_votes: HashMap<_, _> = votes.into_iter().collect();
        let upvotes = count_of(&user_votes, VoteType::Up);
        let downvotes = count_of(&user_votes, VoteType::Down);
        Self {
            upvotes,
            downvotes,
            user_votes,
        }
    }

    pub fn vote_of(&self, viewer_id: uuid::Uuid) -> Option<VoteType> {
        self.user_votes.get(&viewer_id).copied()
    }

    pub fn net(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }

    /// Toggle `viewer_id`'s vote and report what changed.
    pub fn toggle(&mut self, viewer_id: uuid::Uuid, requested: VoteType) -> VoteChange {
        let change = VoteChange::resolve(self.vote_of(viewer_id), requested);
        self.apply(viewer_id, change);
        change
    }

    pub fn apply(&mut self, viewer_id: uuid::Uuid, change: VoteChange) {
        match change {
            VoteChange::Added { vote } => {
                self.user_votes.insert(viewer_id, vote);
                self.increment(vote);
            }
            VoteChange::Removed { vote } => {
                self.user_votes.remove(&viewer_id);
                self.decrement(vote);
            }
            VoteChange::Switched { from, to } => {
                self.user_votes.insert(viewer_id, to);
                self.decrement(from);
                self.increment(to);
            }
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.upvotes == count_of(&self.user_votes, VoteType::Up)
            && self.downvotes == count_of(&self.user_votes, VoteType::Down)
    }

    /// Counters plus the caller's own vote, without exposing anyone else's.
    pub fn result_for(&self, viewer_id: Option<uuid::Uuid>) -> VoteResult {
        VoteResult {
            viewer_vote: viewer_id.and_then(|id| self.vote_of(id)),
            upvotes: self.upvotes,
            downvotes: self.downvotes,
        }
    }

    fn increment(&mut self, vote: VoteType) {
        match vote {
            VoteType::Up => self.upvotes += 1,
            VoteType::Down => self.downvotes += 1,
        }
    }

    fn decrement(&mut self, vote: VoteType) {
        match vote {
            VoteType::Up => self.upvotes = self.upvotes.saturating_sub(1),
            VoteType::Down => self.downvotes = self.downvotes.saturating_sub(1),
        }
    }
}

fn count_of(votes: &HashMap<uuid::Uuid, VoteType>, vote: VoteType) -> u32 {
    votes.values().filter(|v| **v == vote).count() as u32
}

/// Result of a vote toggle as seen by the viewer who cast it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResult {
    pub viewer_vote: Option<VoteType>,
    pub upvotes: u32,
    pub downvotes: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_first_vote_is_added() {
        let viewer = Uuid::new_v4();
        let mut votes = VoteAggregate::default();

        let change = votes.toggle(viewer, VoteType::Up);

        assert_eq!(change, VoteChange::Added { vote: VoteType::Up });
        assert_eq!(votes.upvotes, 1);
        assert_eq!(votes.downvotes, 0);
        assert_eq!(votes.vote_of(viewer), Some(VoteType::Up));
    }

    #[test]
    fn test_same_vote_twice_restores_aggregate() {
        let viewer = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut votes = VoteAggregate::from_votes([(other, VoteType::Down)]);
        let before = votes.clone();

        votes.toggle(viewer, VoteType::Up);
        let change = votes.toggle(viewer, VoteType::Up);

        assert_eq!(change, VoteChange::Removed { vote: VoteType::Up });
        assert_eq!(votes, before);
        assert!(votes.vote_of(viewer).is_none());
    }

    #[test]
    fn test_up_then_down_switches() {
        let viewer = Uuid::new_v4();
        let mut votes = VoteAggregate::default();

        votes.toggle(viewer, VoteType::Up);
        let change = votes.toggle(viewer, VoteType::Down);

        assert_eq!(
            change,
            VoteChange::Switched {
                from: VoteType::Up,
                to: VoteType::Down
            }
        );
        assert_eq!(votes.upvotes, 0);
        assert_eq!(votes.downvotes, 1);
        assert_eq!(votes.user_votes.len(), 1);
        assert_eq!(votes.vote_of(viewer), Some(VoteType::Down));
    }

    #[test]
    fn test_counters_match_map_over_mixed_sequence() {
        let viewers: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let script = [
            (0, VoteType::Up),
            (1, VoteType::Down),
            (2, VoteType::Up),
            (0, VoteType::Down),
            (1, VoteType::Down),
            (3, VoteType::Up),
            (2, VoteType::Up),
            (0, VoteType::Down),
            (3, VoteType::Down),
            (1, VoteType::Up),
        ];

        let mut votes = VoteAggregate::default();
        for (idx, vote) in script {
            votes.toggle(viewers[idx], vote);
            assert!(votes.is_consistent(), "inconsistent after {vote} by #{idx}");
        }

        assert_eq!(votes.vote_of(viewers[0]), None);
        assert_eq!(votes.vote_of(viewers[1]), Some(VoteType::Up));
        assert_eq!(votes.vote_of(viewers[2]), None);
        assert_eq!(votes.vote_of(viewers[3]), Some(VoteType::Down));
        assert_eq!(votes.net(), 0);
    }

    #[test]
    fn test_result_for_only_reveals_own_vote() {
        let viewer = Uuid::new_v4();
        let votes = VoteAggregate::from_votes([(viewer, VoteType::Down), (Uuid::new_v4(), VoteType::Up)]);

        let mine = votes.result_for(Some(viewer));
        assert_eq!(mine.viewer_vote, Some(VoteType::Down));
        assert_eq!((mine.upvotes, mine.downvotes), (1, 1));

        let anonymous = votes.result_for(None);
        assert_eq!(anonymous.viewer_vote, None);
    }

    #[test]
    fn test_vote_type_parses_wire_names() {
        assert_eq!("up".parse::<VoteType>(), Ok(VoteType::Up));
        assert_eq!("down".parse::<VoteType>(), Ok(VoteType::Down));
        assert!("sideways".parse::<VoteType>().is_err());
    }

    #[test]
    fn test_serialized_aggregate_has_counters_only() {
        let voter = Uuid::new_v4();
        let votes = VoteAggregate::from_votes([(voter, VoteType::Down)]);

        let json = serde_json::to_value(&votes).unwrap();
        assert_eq!(json, serde_json::json!({ "upvotes": 0, "downvotes": 1 }));
        assert!(!json.to_string().contains(&voter.to_string()));
    }
}
