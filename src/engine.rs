//! Engine facade: the planner's single mutator.
//!
//! The `Engine` owns the in-memory [`PlannerState`] and a storage
//! collaborator. Every operation is a synchronous transaction: validate,
//! apply to the snapshot, recalculate affected aggregates, then commit
//! through the store. Callers never mutate fields directly — they submit
//! operations or replace the whole snapshot via import.
//!
//! Progress aggregation is bottom-up: a goal with at least one child derives
//! its progress as the rounded mean of its children, and a change propagates
//! through parent links until a tier reports no change. Recalculation
//! carries a visited set so cycles introduced by corrupted imports terminate
//! instead of recursing forever.

use std::collections::HashSet;

use chrono::Utc;

use crate::academics::{
    Chapter, ChapterDraft, ChapterId, Class, ClassId, CounterKind, Subject, SubjectId,
};
use crate::error::{EngineError, PlannerResult};
use crate::export;
use crate::goal::{Goal, GoalDraft, GoalId};
use crate::period;
use crate::state::PlannerState;
use crate::store::{MemoryStore, StateStore};

/// The planner engine.
pub struct Engine {
    state: PlannerState,
    store: Box<dyn StateStore>,
}

impl Engine {
    /// Open an engine backed by `store`.
    ///
    /// A missing or invalid snapshot degrades to the empty state.
    pub fn open(store: Box<dyn StateStore>) -> Self {
        let state = store.load().unwrap_or_default();
        tracing::info!(
            goals = state.goals.len(),
            classes = state.classes.len(),
            "planner state loaded"
        );
        Self { state, store }
    }

    /// Engine with no persistence, starting empty.
    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryStore::new()))
    }

    /// The current snapshot.
    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    /// Resolve a goal by id.
    pub fn goal(&self, id: &GoalId) -> PlannerResult<&Goal> {
        self.state
            .goal(id)
            .ok_or_else(|| EngineError::GoalNotFound { id: id.to_string() }.into())
    }

    /// Persist the committed snapshot.
    fn commit(&self) -> PlannerResult<()> {
        self.store.save(&self.state)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Goal CRUD
    // -----------------------------------------------------------------------

    /// Create a goal from `draft`.
    ///
    /// Progress starts at 0 with empty link sets; `order` is the current size
    /// of the (granularity, periodId) bucket. The draft's period id must be
    /// the canonical identifier for its granularity.
    pub fn add_goal(&mut self, draft: GoalDraft) -> PlannerResult<Goal> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(EngineError::EmptyTitle.into());
        }
        let representative =
            period::representative_date(&draft.period_id).map_err(EngineError::from)?;
        if period::period_id(representative, draft.granularity) != draft.period_id {
            return Err(EngineError::PeriodShapeMismatch {
                period_id: draft.period_id,
                granularity: draft.granularity,
            }
            .into());
        }

        let mut id = GoalId::generate();
        while self.state.contains_goal(&id) {
            id = GoalId::generate();
        }

        let order = self.state.bucket_len(draft.granularity, &draft.period_id) as u32;
        let now = Utc::now();
        let goal = Goal {
            id,
            title: title.to_string(),
            description: draft.description,
            granularity: draft.granularity,
            period_id: draft.period_id,
            progress: 0,
            resource_url: draft.resource_url,
            parent_links: Vec::new(),
            child_links: Vec::new(),
            class_chapter_id: draft.class_chapter_id,
            created_at: now,
            updated_at: now,
            order,
        };
        self.state.goals.push(goal.clone());
        tracing::debug!(goal = %goal.id, period = %goal.period_id, "created goal");
        self.commit()?;
        Ok(goal)
    }

    /// Replace a stored goal record.
    ///
    /// Refreshes `updated_at`. When the incoming progress differs from the
    /// stored one and the goal contributes to parents, each parent
    /// re-aggregates post-write. Direct progress edits are only meaningful
    /// for leaf goals; a non-leaf value is overwritten by the next child
    /// change.
    pub fn update_goal(&mut self, goal: Goal) -> PlannerResult<()> {
        if goal.title.trim().is_empty() {
            return Err(EngineError::EmptyTitle.into());
        }
        if goal.progress > 100 {
            return Err(EngineError::ProgressOutOfRange {
                value: goal.progress,
            }
            .into());
        }
        let stored_progress = match self.state.goal(&goal.id) {
            Some(stored) => stored.progress,
            None => {
                return Err(EngineError::GoalNotFound {
                    id: goal.id.to_string(),
                }
                .into());
            }
        };

        let id = goal.id.clone();
        let progress_changed = stored_progress != goal.progress;
        let parents: Vec<GoalId> = goal.parent_links.clone();
        if let Some(slot) = self.state.goal_mut(&id) {
            *slot = Goal {
                updated_at: Utc::now(),
                ..goal
            };
        }
        if progress_changed {
            for parent_id in &parents {
                let mut visited = HashSet::new();
                self.recalculate(parent_id, &mut visited);
            }
        }
        self.commit()
    }

    /// Set a leaf goal's progress.
    pub fn set_progress(&mut self, id: &GoalId, progress: u8) -> PlannerResult<()> {
        let mut goal = self.goal(id)?.clone();
        goal.progress = progress;
        self.update_goal(goal)
    }

    /// Delete a goal, excising it from every counterpart's link set.
    ///
    /// Silent no-op when the id is absent. Former parents re-aggregate after
    /// all structural edits are applied.
    pub fn delete_goal(&mut self, id: &GoalId) -> PlannerResult<()> {
        let Some(position) = self.state.goals.iter().position(|g| &g.id == id) else {
            return Ok(());
        };
        let removed = self.state.goals.remove(position);

        for parent_id in &removed.parent_links {
            if let Some(parent) = self.state.goal_mut(parent_id) {
                parent.child_links.retain(|child| child != id);
            }
        }
        for child_id in &removed.child_links {
            if let Some(child) = self.state.goal_mut(child_id) {
                child.parent_links.retain(|parent| parent != id);
            }
        }

        for parent_id in &removed.parent_links {
            let mut visited = HashSet::new();
            self.recalculate(parent_id, &mut visited);
        }
        tracing::debug!(goal = %id, "deleted goal");
        self.commit()
    }

    /// Persist a user-driven re-sequencing: each listed goal gets its index
    /// as `order`. Goals not listed keep their order value.
    pub fn reorder_goals(&mut self, ordered: &[GoalId]) -> PlannerResult<()> {
        for (index, id) in ordered.iter().enumerate() {
            if let Some(goal) = self.state.goal_mut(id) {
                goal.order = index as u32;
            }
        }
        self.commit()
    }

    // -----------------------------------------------------------------------
    // Linking & aggregation
    // -----------------------------------------------------------------------

    /// Link `child` under `parent`.
    ///
    /// The parent must be exactly one granularity step coarser and live in
    /// the period covering the child's period. Idempotent: re-linking an
    /// already-linked pair still re-triggers recalculation.
    pub fn link_goals(&mut self, child_id: &GoalId, parent_id: &GoalId) -> PlannerResult<()> {
        let child = self.goal(child_id)?;
        let parent = self.goal(parent_id)?;

        let not_adjacent = EngineError::GranularityNotAdjacent {
            child: child.granularity,
            parent: parent.granularity,
        };
        let Some(coarser) = child.granularity.coarser() else {
            return Err(not_adjacent.into());
        };
        if parent.granularity != coarser {
            return Err(not_adjacent.into());
        }

        let expected = match period::parent_period_id(child.granularity, &child.period_id)
            .map_err(EngineError::from)?
        {
            Some(expected) => expected,
            // Monthly children were rejected above.
            None => return Err(not_adjacent.into()),
        };
        if parent.period_id != expected {
            return Err(EngineError::PeriodMismatch {
                expected,
                actual: parent.period_id.clone(),
            }
            .into());
        }

        // Validated: apply both sides of the mirrored relation.
        let now = Utc::now();
        if let Some(child) = self.state.goal_mut(child_id) {
            if !child.parent_links.contains(parent_id) {
                child.parent_links.push(parent_id.clone());
            }
            child.updated_at = now;
        }
        if let Some(parent) = self.state.goal_mut(parent_id) {
            if !parent.child_links.contains(child_id) {
                parent.child_links.push(child_id.clone());
            }
            parent.updated_at = now;
        }

        let mut visited = HashSet::new();
        self.recalculate(parent_id, &mut visited);
        tracing::debug!(child = %child_id, parent = %parent_id, "linked goals");
        self.commit()
    }

    /// Remove the mirrored relation between `child` and `parent`.
    ///
    /// Silent no-op when either id is absent or the pair is not linked. A
    /// parent left with zero children keeps its last derived progress.
    pub fn unlink_goals(&mut self, child_id: &GoalId, parent_id: &GoalId) -> PlannerResult<()> {
        if !self.state.contains_goal(child_id) || !self.state.contains_goal(parent_id) {
            return Ok(());
        }
        let linked = self
            .state
            .goal(child_id)
            .is_some_and(|child| child.parent_links.contains(parent_id))
            || self
                .state
                .goal(parent_id)
                .is_some_and(|parent| parent.child_links.contains(child_id));
        if !linked {
            return Ok(());
        }

        let now = Utc::now();
        if let Some(child) = self.state.goal_mut(child_id) {
            child.parent_links.retain(|parent| parent != parent_id);
            child.updated_at = now;
        }
        if let Some(parent) = self.state.goal_mut(parent_id) {
            parent.child_links.retain(|child| child != child_id);
            parent.updated_at = now;
        }

        let mut visited = HashSet::new();
        self.recalculate(parent_id, &mut visited);
        tracing::debug!(child = %child_id, parent = %parent_id, "unlinked goals");
        self.commit()
    }

    /// Every goal one granularity step coarser whose period covers the
    /// child's period, in natural goal order.
    ///
    /// Empty for monthly goals (no coarser tier) and for goals whose period
    /// id does not resolve — an unlinkable goal is not an error here.
    pub fn linkable_parents(&self, id: &GoalId) -> PlannerResult<Vec<&Goal>> {
        let goal = self.goal(id)?;
        let Some(parent_granularity) = goal.granularity.coarser() else {
            return Ok(Vec::new());
        };
        let Ok(Some(parent_period)) = period::parent_period_id(goal.granularity, &goal.period_id)
        else {
            return Ok(Vec::new());
        };
        Ok(self
            .state
            .goals
            .iter()
            .filter(|g| g.granularity == parent_granularity && g.period_id == parent_period)
            .collect())
    }

    /// Re-derive a goal's progress from its children, propagating upward
    /// while the value keeps changing.
    ///
    /// A goal with no resolvable children is left untouched: its progress is
    /// frozen at the last derived value, not reset. The visited set bounds
    /// recursion when imported data contains a cycle.
    fn recalculate(&mut self, id: &GoalId, visited: &mut HashSet<GoalId>) {
        if !visited.insert(id.clone()) {
            return;
        }
        let Some(goal) = self.state.goal(id) else {
            return;
        };
        if goal.child_links.is_empty() {
            return;
        }
        let progresses: Vec<u32> = goal
            .child_links
            .iter()
            .filter_map(|child_id| self.state.goal(child_id))
            .map(|child| u32::from(child.progress))
            .collect();
        if progresses.is_empty() {
            return;
        }
        let sum: u32 = progresses.iter().sum();
        // Math-style rounding, half away from zero.
        let mean = (f64::from(sum) / progresses.len() as f64).round() as u8;
        if mean == goal.progress {
            return;
        }

        let parents: Vec<GoalId> = goal.parent_links.clone();
        if let Some(goal) = self.state.goal_mut(id) {
            goal.progress = mean;
            goal.updated_at = Utc::now();
        }
        for parent_id in &parents {
            self.recalculate(parent_id, visited);
        }
    }

    // -----------------------------------------------------------------------
    // Academics
    // -----------------------------------------------------------------------

    /// Create a class.
    pub fn add_class(&mut self, title: &str) -> PlannerResult<Class> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EngineError::EmptyTitle.into());
        }
        let class = Class {
            id: ClassId::generate(),
            title: title.to_string(),
            subjects: Vec::new(),
        };
        self.state.classes.push(class.clone());
        self.commit()?;
        Ok(class)
    }

    /// Replace a stored class record.
    pub fn update_class(&mut self, class: Class) -> PlannerResult<()> {
        if class.title.trim().is_empty() {
            return Err(EngineError::EmptyTitle.into());
        }
        match self.state.class_mut(&class.id) {
            Some(slot) => *slot = class,
            None => {
                return Err(EngineError::ClassNotFound {
                    id: class.id.to_string(),
                }
                .into());
            }
        }
        self.commit()
    }

    /// Delete a class. Silent no-op when absent; goals keep their loose
    /// chapter references untouched.
    pub fn delete_class(&mut self, id: &ClassId) -> PlannerResult<()> {
        let before = self.state.classes.len();
        self.state.classes.retain(|class| &class.id != id);
        if self.state.classes.len() == before {
            return Ok(());
        }
        self.commit()
    }

    /// Create a subject under a class.
    pub fn add_subject(&mut self, class_id: &ClassId, title: &str) -> PlannerResult<Subject> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EngineError::EmptyTitle.into());
        }
        let subject = Subject {
            id: SubjectId::generate(),
            title: title.to_string(),
            chapters: Vec::new(),
        };
        let class = self.state.class_mut(class_id).ok_or_else(|| {
            EngineError::ClassNotFound {
                id: class_id.to_string(),
            }
        })?;
        class.subjects.push(subject.clone());
        self.commit()?;
        Ok(subject)
    }

    /// Replace a stored subject record.
    pub fn update_subject(&mut self, class_id: &ClassId, subject: Subject) -> PlannerResult<()> {
        if subject.title.trim().is_empty() {
            return Err(EngineError::EmptyTitle.into());
        }
        let slot = self.subject_mut(class_id, &subject.id)?;
        *slot = subject;
        self.commit()
    }

    /// Delete a subject. Silent no-op when the class or subject is absent.
    pub fn delete_subject(&mut self, class_id: &ClassId, subject_id: &SubjectId) -> PlannerResult<()> {
        let Some(class) = self.state.class_mut(class_id) else {
            return Ok(());
        };
        let before = class.subjects.len();
        class.subjects.retain(|subject| &subject.id != subject_id);
        if class.subjects.len() == before {
            return Ok(());
        }
        self.commit()
    }

    /// Create a chapter under a subject, with progress 0.
    pub fn add_chapter(
        &mut self,
        class_id: &ClassId,
        subject_id: &SubjectId,
        draft: ChapterDraft,
    ) -> PlannerResult<Chapter> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(EngineError::EmptyTitle.into());
        }
        let chapter = Chapter {
            id: ChapterId::generate(),
            title: title.to_string(),
            progress: 0,
            lectures_count: draft.lectures_count,
            dpps_count: draft.dpps_count,
            tests_count: draft.tests_count,
        };
        let subject = self.subject_mut(class_id, subject_id)?;
        subject.chapters.push(chapter.clone());
        self.commit()?;
        Ok(chapter)
    }

    /// Replace a stored chapter record.
    pub fn update_chapter(
        &mut self,
        class_id: &ClassId,
        subject_id: &SubjectId,
        chapter: Chapter,
    ) -> PlannerResult<()> {
        if chapter.title.trim().is_empty() {
            return Err(EngineError::EmptyTitle.into());
        }
        if chapter.progress > 100 {
            return Err(EngineError::ProgressOutOfRange {
                value: chapter.progress,
            }
            .into());
        }
        let slot = self.chapter_mut(class_id, subject_id, &chapter.id)?;
        *slot = chapter;
        self.commit()
    }

    /// Delete a chapter. Silent no-op anywhere along a missing path.
    pub fn delete_chapter(
        &mut self,
        class_id: &ClassId,
        subject_id: &SubjectId,
        chapter_id: &ChapterId,
    ) -> PlannerResult<()> {
        let Some(class) = self.state.class_mut(class_id) else {
            return Ok(());
        };
        let Some(subject) = class.subjects.iter_mut().find(|s| &s.id == subject_id) else {
            return Ok(());
        };
        let before = subject.chapters.len();
        subject.chapters.retain(|chapter| &chapter.id != chapter_id);
        if subject.chapters.len() == before {
            return Ok(());
        }
        self.commit()
    }

    /// Increment one of a chapter's activity counters.
    pub fn increment_chapter_count(
        &mut self,
        class_id: &ClassId,
        subject_id: &SubjectId,
        chapter_id: &ChapterId,
        kind: CounterKind,
    ) -> PlannerResult<()> {
        self.adjust_chapter_count(class_id, subject_id, chapter_id, kind, 1)
    }

    /// Decrement one of a chapter's activity counters, saturating at zero.
    pub fn decrement_chapter_count(
        &mut self,
        class_id: &ClassId,
        subject_id: &SubjectId,
        chapter_id: &ChapterId,
        kind: CounterKind,
    ) -> PlannerResult<()> {
        self.adjust_chapter_count(class_id, subject_id, chapter_id, kind, -1)
    }

    fn adjust_chapter_count(
        &mut self,
        class_id: &ClassId,
        subject_id: &SubjectId,
        chapter_id: &ChapterId,
        kind: CounterKind,
        delta: i32,
    ) -> PlannerResult<()> {
        let chapter = self.chapter_mut(class_id, subject_id, chapter_id)?;
        chapter.adjust_counter(kind, delta);
        self.commit()
    }

    fn subject_mut(
        &mut self,
        class_id: &ClassId,
        subject_id: &SubjectId,
    ) -> Result<&mut Subject, EngineError> {
        let class = self
            .state
            .class_mut(class_id)
            .ok_or_else(|| EngineError::ClassNotFound {
                id: class_id.to_string(),
            })?;
        class
            .subjects
            .iter_mut()
            .find(|subject| &subject.id == subject_id)
            .ok_or_else(|| EngineError::SubjectNotFound {
                id: subject_id.to_string(),
            })
    }

    fn chapter_mut(
        &mut self,
        class_id: &ClassId,
        subject_id: &SubjectId,
        chapter_id: &ChapterId,
    ) -> Result<&mut Chapter, EngineError> {
        self.subject_mut(class_id, subject_id)?
            .chapters
            .iter_mut()
            .find(|chapter| &chapter.id == chapter_id)
            .ok_or_else(|| EngineError::ChapterNotFound {
                id: chapter_id.to_string(),
            })
    }

    // -----------------------------------------------------------------------
    // Import / export
    // -----------------------------------------------------------------------

    /// Replace the whole state with an imported document.
    ///
    /// Failures leave the existing state untouched.
    pub fn import(&mut self, json: &str) -> PlannerResult<()> {
        let next = export::parse_document(json)?;
        self.state = next;
        tracing::info!(
            goals = self.state.goals.len(),
            classes = self.state.classes.len(),
            "imported planner document"
        );
        self.commit()
    }

    /// The full current state as an indented JSON document.
    pub fn export(&self) -> PlannerResult<String> {
        Ok(export::export_document(&self.state)?)
    }
}
