#![forbid(unsafe_code)]

//! Child list reconciliation.
//!
//! Given the ids backing the currently displayed views and a new item
//! sequence, [`reconcile`] classifies the transition and produces the minimal
//! mutation plan:
//!
//! | Transition  | Condition                               | Plan                                   |
//! |-------------|-----------------------------------------|----------------------------------------|
//! | `Unchanged` | `new == old`                            | nothing                                |
//! | `Append`    | `new[..old.len()] == old`               | build + insert created views at tail   |
//! | `Prepend`   | `new[new.len() - old.len()..] == old`   | build + insert created views at head   |
//! | `Slide`     | survivors form one run, same order, in both | destroy removed, insert created at head and tail |
//! | `Reorder`   | anything else                           | detach all, destroy removed, rebuild order |
//!
//! Append, prepend and slide never detach a surviving node, which keeps
//! streaming content and a moving load window from paying for a full
//! re-render. Views are identified by
//! [`ItemId`] and position, never by object identity.

use std::collections::{HashMap, HashSet};

use feedview_core::{FeedError, ItemId};

/// Structural shape of a sequence change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Same ids in the same order.
    Unchanged,
    /// New ids only after the old tail.
    Append,
    /// New ids only before the old head.
    Prepend,
    /// Ids trimmed from or added at either end around an unchanged run.
    Slide,
    /// Arbitrary insertion, removal, or move.
    Reorder,
}

impl Transition {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::Slide => "slide",
            Self::Reorder => "reorder",
        }
    }

    /// Whether surviving nodes stay attached.
    #[must_use]
    pub const fn keeps_survivors_attached(self) -> bool {
        !matches!(self, Self::Reorder)
    }
}

/// One host mutation. Steps are executed in plan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStep {
    /// Detach an attached node; the view survives.
    Detach(ItemId),
    /// Release a removed item's view (unobserve first).
    Destroy(ItemId),
    /// Create the view for a new item.
    Build(ItemId),
    /// Attach a node so it becomes the `index`-th child.
    Insert { id: ItemId, index: usize },
}

/// Result of diffing two id sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    transition: Transition,
    order: Vec<ItemId>,
    created: Vec<ItemId>,
    removed: Vec<ItemId>,
    steps: Vec<MutationStep>,
    shifts_head: bool,
}

impl ReconcilePlan {
    #[must_use]
    pub fn transition(&self) -> Transition {
        self.transition
    }

    /// The new display order.
    #[must_use]
    pub fn order(&self) -> &[ItemId] {
        &self.order
    }

    /// Ids that need a fresh view, in display order.
    #[must_use]
    pub fn created(&self) -> &[ItemId] {
        &self.created
    }

    /// Ids whose view must be destroyed, in old display order.
    #[must_use]
    pub fn removed(&self) -> &[ItemId] {
        &self.removed
    }

    #[must_use]
    pub fn steps(&self) -> &[MutationStep] {
        &self.steps
    }

    /// Number of detach steps in the plan.
    #[must_use]
    pub fn detach_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step, MutationStep::Detach(_)))
            .count()
    }

    /// Whether content above the surviving views grows or shrinks while the
    /// survivors stay attached. Such passes need scroll anchoring.
    #[must_use]
    pub fn shifts_head(&self) -> bool {
        self.shifts_head
    }

    /// Consume the plan, keeping the new display order.
    #[must_use]
    pub fn into_order(self) -> Vec<ItemId> {
        self.order
    }
}

/// Reject sequences that contain the same id twice.
pub fn check_unique(ids: &[ItemId]) -> Result<(), FeedError> {
    index_by_id(ids).map(|_| ())
}

fn index_by_id(ids: &[ItemId]) -> Result<HashMap<ItemId, usize>, FeedError> {
    let mut positions = HashMap::with_capacity(ids.len());
    for (index, id) in ids.iter().enumerate() {
        if let Some(first) = positions.insert(*id, index) {
            return Err(FeedError::DuplicateItem {
                id: *id,
                first,
                second: index,
            });
        }
    }
    Ok(positions)
}

/// Classify a change from `old` to `new`.
#[must_use]
pub fn classify(old: &[ItemId], new: &[ItemId]) -> Transition {
    classify_with_run(old, new).0
}

fn classify_with_run(old: &[ItemId], new: &[ItemId]) -> (Transition, Option<KeptRun>) {
    if old == new {
        (Transition::Unchanged, None)
    } else if new.len() > old.len() && new[..old.len()] == *old {
        (Transition::Append, None)
    } else if new.len() > old.len() && new[new.len() - old.len()..] == *old {
        (Transition::Prepend, None)
    } else {
        match kept_run(old, new) {
            Some(run) => (Transition::Slide, Some(run)),
            None => (Transition::Reorder, None),
        }
    }
}

/// The unchanged run of survivors shared by `old` and `new`.
#[derive(Debug, Clone, Copy)]
struct KeptRun {
    old_start: usize,
    new_start: usize,
    len: usize,
}

/// Survivors that sit contiguously, in the same order, in both sequences.
fn kept_run(old: &[ItemId], new: &[ItemId]) -> Option<KeptRun> {
    let incoming: HashSet<ItemId> = new.iter().copied().collect();
    let first = old.iter().position(|id| incoming.contains(id))?;
    let last = old.iter().rposition(|id| incoming.contains(id))?;
    let kept = &old[first..=last];
    let new_start = new.iter().position(|id| *id == kept[0])?;
    let run = new.get(new_start..new_start + kept.len())?;
    (run == kept).then_some(KeptRun {
        old_start: first,
        new_start,
        len: kept.len(),
    })
}

/// Diff `old` against `new` and plan the host mutations.
///
/// `old` is the display order of the currently attached views. Fails with
/// [`FeedError::DuplicateItem`] if `new` contains an id twice.
pub fn reconcile(old: &[ItemId], new: &[ItemId]) -> Result<ReconcilePlan, FeedError> {
    let positions = index_by_id(new)?;
    let existing: HashSet<ItemId> = old.iter().copied().collect();

    let created: Vec<ItemId> = new
        .iter()
        .filter(|id| !existing.contains(id))
        .copied()
        .collect();
    let removed: Vec<ItemId> = old
        .iter()
        .filter(|id| !positions.contains_key(id))
        .copied()
        .collect();

    let (transition, run) = classify_with_run(old, new);
    let mut steps = Vec::new();
    let mut shifts_head = transition == Transition::Prepend;
    match (transition, run) {
        (Transition::Unchanged, _) => {}
        (Transition::Append, _) => {
            for (offset, id) in new[old.len()..].iter().enumerate() {
                steps.push(MutationStep::Build(*id));
                steps.push(MutationStep::Insert {
                    id: *id,
                    index: old.len() + offset,
                });
            }
        }
        (Transition::Prepend, _) => {
            for (index, id) in new[..new.len() - old.len()].iter().enumerate() {
                steps.push(MutationStep::Build(*id));
                steps.push(MutationStep::Insert { id: *id, index });
            }
        }
        (Transition::Slide, Some(run)) => {
            shifts_head = run.old_start > 0 || run.new_start > 0;
            steps.extend(removed.iter().map(|id| MutationStep::Destroy(*id)));
            let tail_start = run.new_start + run.len;
            let head = new[..run.new_start].iter().enumerate();
            let tail = new[tail_start..]
                .iter()
                .enumerate()
                .map(|(offset, id)| (tail_start + offset, id));
            for (index, id) in head.chain(tail) {
                steps.push(MutationStep::Build(*id));
                steps.push(MutationStep::Insert { id: *id, index });
            }
        }
        _ => {
            steps.reserve(old.len() + removed.len() + created.len() + new.len());
            steps.extend(old.iter().map(|id| MutationStep::Detach(*id)));
            steps.extend(removed.iter().map(|id| MutationStep::Destroy(*id)));
            steps.extend(created.iter().map(|id| MutationStep::Build(*id)));
            steps.extend(
                new.iter()
                    .enumerate()
                    .map(|(index, id)| MutationStep::Insert { id: *id, index }),
            );
        }
    }

    Ok(ReconcilePlan {
        transition,
        order: new.to_vec(),
        created,
        removed,
        steps,
        shifts_head,
    })
}

/// Counters describing the work done by reconciliation passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileStats {
    /// Passes that reached the diff step.
    pub passes: u64,
    pub unchanged: u64,
    pub appends: u64,
    pub prepends: u64,
    pub slides: u64,
    pub reorders: u64,
    /// Sequences queued behind a pass that had not settled yet.
    pub deferred: u64,
    pub built: u64,
    pub destroyed: u64,
    pub inserted: u64,
    pub detached: u64,
}

impl ReconcileStats {
    pub(crate) fn record(&mut self, transition: Transition) {
        self.passes += 1;
        match transition {
            Transition::Unchanged => self.unchanged += 1,
            Transition::Append => self.appends += 1,
            Transition::Prepend => self.prepends += 1,
            Transition::Slide => self.slides += 1,
            Transition::Reorder => self.reorders += 1,
        }
    }
}
