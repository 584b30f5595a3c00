//! Revision-based conflict resolution between two copies of a collection.

use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::models::Record;

/// Merges a remote copy of a collection into the local one.
///
/// Per record id: local-only records are kept, remote-only records adopted,
/// and when both sides carry the id the higher revision wins. Equal revisions
/// fall back to `merge_rank` (session status precedence, ended outranking
/// in-progress), then to the lexicographically smaller device id. That last
/// step is a determinism tie-break only; it encodes no real precedence.
///
/// Local ordering is preserved; remote-only records append in remote order.
/// The result never lowers a revision, and re-merging the same remote set is
/// a no-op.
pub fn merge_records<T: Record>(local: &[T], remote: &[T]) -> Vec<T> {
    let remote_by_id: HashMap<Uuid, &T> = remote.iter().map(|r| (r.id(), r)).collect();

    let mut merged: Vec<T> = Vec::with_capacity(local.len());
    let mut local_ids: HashSet<Uuid> = HashSet::with_capacity(local.len());

    for ours in local {
        local_ids.insert(ours.id());
        let winner = match remote_by_id.get(&ours.id()) {
            Some(theirs) => resolve(ours, theirs),
            None => ours,
        };
        merged.push(winner.clone());
    }

    for theirs in remote {
        if !local_ids.contains(&theirs.id()) {
            merged.push(theirs.clone());
        }
    }

    merged
}

fn resolve<'a, T: Record>(ours: &'a T, theirs: &'a T) -> &'a T {
    if theirs.revision() != ours.revision() {
        return if theirs.revision() > ours.revision() {
            theirs
        } else {
            ours
        };
    }
    if theirs.merge_rank() != ours.merge_rank() {
        return if theirs.merge_rank() > ours.merge_rank() {
            theirs
        } else {
            ours
        };
    }
    if theirs.device_id() < ours.device_id() {
        theirs
    } else {
        ours
    }
}
