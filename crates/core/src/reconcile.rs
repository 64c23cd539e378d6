//! Merging an administration export into a repository's roster.
//!
//! Each export row is classified against the current records, in order:
//!
//! 1. guid already present: nothing changes (names from the export are not
//!    taken over; only an explicit amend changes a known record).
//! 2. row flagged as new: appended.
//! 3. guid blacklisted: skipped silently.
//! 4. otherwise the operator decides through a [`Decider`].
//!
//! Independently, every row flagged as deleted becomes a deletion candidate.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::admin_export::ExternalRecord;
use crate::errors::ReconcileError;
use crate::models::Teacher;
use crate::store::Blacklist;

// ---------------------------------------------------------------------------
// Operator decisions
// ---------------------------------------------------------------------------

/// What to do with an unknown, unflagged candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
    RejectAndBlacklist,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept => write!(f, "accept"),
            Self::Reject => write!(f, "reject"),
            Self::RejectAndBlacklist => write!(f, "reject_and_blacklist"),
        }
    }
}

/// Source of operator decisions for ambiguous candidates.
pub trait Decider {
    fn decide(&mut self, candidate: &Teacher) -> Result<Decision, ReconcileError>;
}

impl<F> Decider for F
where
    F: FnMut(&Teacher) -> Decision,
{
    fn decide(&mut self, candidate: &Teacher) -> Result<Decision, ReconcileError> {
        Ok(self(candidate))
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Statistics and deletion candidates of one reconciliation.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    /// Records appended to the roster.
    pub added_count: usize,
    /// Rows whose guid was already present.
    pub known_count: usize,
    /// Rows skipped because their guid is blacklisted.
    pub blacklisted_count: usize,
    /// Candidates the operator rejected (with or without blacklisting).
    pub rejected_count: usize,
    /// Rows the administration system marks as deleted, in export order.
    pub deletion_candidates: Vec<Teacher>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Merge `external` into `current` in place.
///
/// `current` is only mutated after a decision has been obtained, so an
/// aborted decision leaves it consistent. Appended records carry
/// `added = true`.
pub fn reconcile<D: Decider + ?Sized>(
    current: &mut Vec<Teacher>,
    external: &[ExternalRecord],
    blacklist: &Blacklist,
    decider: &mut D,
) -> Result<ReconcileOutcome, ReconcileError> {
    info!(
        current = current.len(),
        external = external.len(),
        "reconciling administration export"
    );

    let mut known: HashSet<String> = current.iter().map(|t| t.guid.clone()).collect();
    let mut outcome = ReconcileOutcome::default();

    for record in external {
        let candidate = &record.teacher;

        if record.is_deleted {
            outcome.deletion_candidates.push(candidate.clone());
        }

        if known.contains(&candidate.guid) {
            debug!(guid = %candidate.guid, "already known");
            outcome.known_count += 1;
            continue;
        }

        if record.is_new {
            debug!(guid = %candidate.guid, "flagged new by export, appending");
            append(current, &mut known, candidate);
            outcome.added_count += 1;
            continue;
        }

        if blacklist.contains(&candidate.guid)? {
            debug!(guid = %candidate.guid, "blacklisted, skipping");
            outcome.blacklisted_count += 1;
            continue;
        }

        let decision = decider.decide(candidate)?;
        debug!(guid = %candidate.guid, %decision, "operator decision");
        match decision {
            Decision::Accept => {
                append(current, &mut known, candidate);
                outcome.added_count += 1;
            }
            Decision::Reject => {
                outcome.rejected_count += 1;
            }
            Decision::RejectAndBlacklist => {
                blacklist.add(&candidate.guid)?;
                outcome.rejected_count += 1;
            }
        }
    }

    info!(
        added = outcome.added_count,
        known = outcome.known_count,
        blacklisted = outcome.blacklisted_count,
        rejected = outcome.rejected_count,
        deletions = outcome.deletion_candidates.len(),
        "reconciliation complete"
    );
    Ok(outcome)
}

fn append(current: &mut Vec<Teacher>, known: &mut HashSet<String>, candidate: &Teacher) {
    let mut teacher = candidate.clone();
    teacher.added = true;
    teacher.deleted = false;
    known.insert(teacher.guid.clone());
    current.push(teacher);
}
