//! The planner document: every goal plus the academic tree.
//!
//! `PlannerState` is both the engine's in-memory graph and the persisted
//! JSON shape. Goals are kept in insertion order — that order is the
//! engine's "natural goal order" for listings and linkable-parent lookups —
//! with id-keyed access going through the lookup helpers, which rely on the
//! id uniqueness the engine enforces at creation.

use serde::{Deserialize, Serialize};

use crate::academics::{Class, ClassId};
use crate::goal::{Goal, GoalId};
use crate::period::Granularity;

/// Full planner state: `{ goals: [...], classes: [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerState {
    pub goals: Vec<Goal>,
    pub classes: Vec<Class>,
}

impl PlannerState {
    /// Look up a goal by id.
    pub fn goal(&self, id: &GoalId) -> Option<&Goal> {
        self.goals.iter().find(|g| &g.id == id)
    }

    /// Look up a goal by id, mutably.
    pub fn goal_mut(&mut self, id: &GoalId) -> Option<&mut Goal> {
        self.goals.iter_mut().find(|g| &g.id == id)
    }

    /// Whether a goal with this id exists.
    pub fn contains_goal(&self, id: &GoalId) -> bool {
        self.goal(id).is_some()
    }

    /// Number of goals in the (granularity, periodId) bucket.
    pub fn bucket_len(&self, granularity: Granularity, period_id: &str) -> usize {
        self.goals
            .iter()
            .filter(|g| g.granularity == granularity && g.period_id == period_id)
            .count()
    }

    /// Look up a class by id.
    pub fn class(&self, id: &ClassId) -> Option<&Class> {
        self.classes.iter().find(|c| &c.id == id)
    }

    /// Look up a class by id, mutably.
    pub fn class_mut(&mut self, id: &ClassId) -> Option<&mut Class> {
        self.classes.iter_mut().find(|c| &c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::GoalDraft;
    use chrono::{DateTime, Utc};

    fn goal(id: &str, granularity: Granularity, period_id: &str) -> Goal {
        let draft = GoalDraft::new("t", granularity, period_id);
        Goal {
            id: GoalId::new(id),
            title: draft.title,
            description: draft.description,
            granularity: draft.granularity,
            period_id: draft.period_id,
            progress: 0,
            resource_url: None,
            parent_links: Vec::new(),
            child_links: Vec::new(),
            class_chapter_id: None,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
            order: 0,
        }
    }

    #[test]
    fn lookup_by_id() {
        let mut state = PlannerState::default();
        state.goals.push(goal("a", Granularity::Daily, "2024-06-12"));
        state.goals.push(goal("b", Granularity::Weekly, "2024-W24"));

        assert_eq!(state.goal(&GoalId::new("b")).unwrap().period_id, "2024-W24");
        assert!(state.goal(&GoalId::new("missing")).is_none());
        assert!(state.contains_goal(&GoalId::new("a")));
    }

    #[test]
    fn bucket_len_counts_only_matching_goals() {
        let mut state = PlannerState::default();
        state.goals.push(goal("a", Granularity::Daily, "2024-06-12"));
        state.goals.push(goal("b", Granularity::Daily, "2024-06-12"));
        state.goals.push(goal("c", Granularity::Daily, "2024-06-13"));
        state.goals.push(goal("d", Granularity::Weekly, "2024-W24"));

        assert_eq!(state.bucket_len(Granularity::Daily, "2024-06-12"), 2);
        assert_eq!(state.bucket_len(Granularity::Daily, "2024-06-13"), 1);
        assert_eq!(state.bucket_len(Granularity::Monthly, "2024-06"), 0);
    }

    #[test]
    fn empty_state_serializes_to_empty_arrays() {
        let json = serde_json::to_value(PlannerState::default()).unwrap();
        assert_eq!(json["goals"].as_array().unwrap().len(), 0);
        assert_eq!(json["classes"].as_array().unwrap().len(), 0);
    }
}
