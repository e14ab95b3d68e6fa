//! Semantic cleanup of a raw edit script.
//!
//! A round is: merge, absorb short equalities, merge. Rounds repeat until the
//! script stops changing, which makes [`cleanup`] idempotent by construction.
//!
//! Absorption threshold: an equality is noise when its length (in chars) is no
//! greater than the larger of the deleted and inserted lengths on *each* side.

use super::myers::{common_prefix, common_suffix};
use super::{Edit, OpKind};

/// Upper bound on cleanup rounds; scripts normally settle in two or three.
const MAX_ROUNDS: usize = 32;

pub(crate) fn cleanup(mut edits: Vec<Edit>) -> Vec<Edit> {
    for _ in 0..MAX_ROUNDS {
        let next = merge(absorb_short_equalities(merge(edits.clone())));
        if next == edits {
            return next;
        }
        edits = next;
    }
    tracing::warn!("diff cleanup did not settle after {} rounds", MAX_ROUNDS);
    edits
}

/// Coalesce runs and slide single edits until stable.
pub(crate) fn merge(edits: Vec<Edit>) -> Vec<Edit> {
    let mut merged = coalesce(edits);
    // Every shift removes one equality, so this terminates.
    while shift_single_edits(&mut merged) {
        merged = coalesce(merged);
    }
    merged
}

/// Merge adjacent same-kind ops and factor shared affixes out of edit runs.
///
/// Each run of edits between two equalities becomes at most one delete followed
/// by one insert. Empty ops are dropped.
fn coalesce(edits: Vec<Edit>) -> Vec<Edit> {
    let mut out: Vec<Edit> = Vec::with_capacity(edits.len());
    let mut deleted: Vec<char> = Vec::new();
    let mut inserted: Vec<char> = Vec::new();

    for edit in edits {
        match edit.kind {
            OpKind::Delete => deleted.extend(edit.text),
            OpKind::Insert => inserted.extend(edit.text),
            OpKind::Equal => {
                flush_run(&mut out, &mut deleted, &mut inserted);
                push_equal(&mut out, edit.text);
            }
        }
    }
    flush_run(&mut out, &mut deleted, &mut inserted);
    out
}

fn push_equal(out: &mut Vec<Edit>, text: Vec<char>) {
    if text.is_empty() {
        return;
    }
    match out.last_mut() {
        Some(last) if last.kind == OpKind::Equal => last.text.extend(text),
        _ => out.push(Edit::new(OpKind::Equal, text)),
    }
}

fn flush_run(out: &mut Vec<Edit>, deleted: &mut Vec<char>, inserted: &mut Vec<char>) {
    let mut del = std::mem::take(deleted);
    let mut ins = std::mem::take(inserted);
    let mut suffix = Vec::new();

    if !del.is_empty() && !ins.is_empty() {
        let prefix_len = common_prefix(&del, &ins);
        if prefix_len > 0 {
            push_equal(out, del[..prefix_len].to_vec());
            del.drain(..prefix_len);
            ins.drain(..prefix_len);
        }
        let suffix_len = common_suffix(&del, &ins);
        if suffix_len > 0 {
            suffix = del.split_off(del.len() - suffix_len);
            ins.truncate(ins.len() - suffix_len);
        }
    }

    if !del.is_empty() {
        out.push(Edit::new(OpKind::Delete, del));
    }
    if !ins.is_empty() {
        out.push(Edit::new(OpKind::Insert, ins));
    }
    push_equal(out, suffix);
}

/// Slide a lone edit sitting between two equalities so one equality vanishes.
///
/// `A<ba>C` becomes `<ab>aC` and `A<cb>C` with edit starting with `C` becomes
/// `AC<bC>`. Returns whether anything moved.
fn shift_single_edits(edits: &mut Vec<Edit>) -> bool {
    let mut changed = false;
    let mut i = 1;
    while i + 1 < edits.len() {
        let sandwiched = edits[i - 1].kind == OpKind::Equal
            && edits[i + 1].kind == OpKind::Equal
            && edits[i].kind != OpKind::Equal;

        if sandwiched {
            if edits[i].text.ends_with(&edits[i - 1].text) {
                let prev = edits[i - 1].text.clone();
                let keep = edits[i].text.len() - prev.len();
                let mut shifted = prev.clone();
                shifted.extend_from_slice(&edits[i].text[..keep]);
                edits[i].text = shifted;

                let mut next = prev;
                next.extend_from_slice(&edits[i + 1].text);
                edits[i + 1].text = next;

                edits.remove(i - 1);
                changed = true;
            } else if edits[i].text.starts_with(&edits[i + 1].text) {
                let next = edits[i + 1].text.clone();
                edits[i - 1].text.extend_from_slice(&next);

                let mut shifted = edits[i].text[next.len()..].to_vec();
                shifted.extend_from_slice(&next);
                edits[i].text = shifted;

                edits.remove(i + 1);
                changed = true;
            }
        }
        i += 1;
    }
    changed
}

/// Turn noise equalities into a delete/insert pair.
///
/// After each absorption the scan backs up to the equality before the
/// previous one, since that one may now qualify too.
fn absorb_short_equalities(mut edits: Vec<Edit>) -> Vec<Edit> {
    let mut changed = false;
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<Vec<char>> = None;
    let (mut ins_before, mut del_before) = (0usize, 0usize);
    let (mut ins_after, mut del_after) = (0usize, 0usize);

    let mut pointer = 0usize;
    while pointer < edits.len() {
        if edits[pointer].kind == OpKind::Equal {
            equalities.push(pointer);
            ins_before = ins_after;
            del_before = del_after;
            ins_after = 0;
            del_after = 0;
            last_equality = Some(edits[pointer].text.clone());
            pointer += 1;
            continue;
        }

        match edits[pointer].kind {
            OpKind::Insert => ins_after += edits[pointer].text.len(),
            _ => del_after += edits[pointer].text.len(),
        }

        let absorb = match (&last_equality, equalities.last()) {
            (Some(eq), Some(_)) => {
                eq.len() <= ins_before.max(del_before) && eq.len() <= ins_after.max(del_after)
            }
            _ => false,
        };

        if absorb {
            if let (Some(eq), Some(idx)) = (last_equality.take(), equalities.pop()) {
                edits.insert(idx, Edit::new(OpKind::Delete, eq));
                edits[idx + 1].kind = OpKind::Insert;
            }
            // The previous equality needs re-evaluating too.
            equalities.pop();
            pointer = match equalities.last() {
                Some(&idx) => idx + 1,
                None => 0,
            };
            ins_before = 0;
            del_before = 0;
            ins_after = 0;
            del_after = 0;
            changed = true;
            continue;
        }
        pointer += 1;
    }

    if changed {
        merge(edits)
    } else {
        edits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(kind: OpKind, text: &str) -> Edit {
        Edit::new(kind, text.chars().collect())
    }

    #[test]
    fn test_coalesce_orders_delete_before_insert() {
        let edits = vec![
            e(OpKind::Insert, "x"),
            e(OpKind::Delete, "y"),
            e(OpKind::Insert, "z"),
        ];
        assert_eq!(
            coalesce(edits),
            vec![e(OpKind::Delete, "y"), e(OpKind::Insert, "xz")]
        );
    }

    #[test]
    fn test_coalesce_factors_affixes() {
        let edits = vec![e(OpKind::Delete, "abXcd"), e(OpKind::Insert, "abYcd")];
        assert_eq!(
            coalesce(edits),
            vec![
                e(OpKind::Equal, "ab"),
                e(OpKind::Delete, "X"),
                e(OpKind::Insert, "Y"),
                e(OpKind::Equal, "cd"),
            ]
        );
    }

    #[test]
    fn test_shift_left() {
        // a<ba>c  ->  <ab>ac
        let mut edits = vec![
            e(OpKind::Equal, "a"),
            e(OpKind::Insert, "ba"),
            e(OpKind::Equal, "c"),
        ];
        assert!(shift_single_edits(&mut edits));
        assert_eq!(edits, vec![e(OpKind::Insert, "ab"), e(OpKind::Equal, "ac")]);
    }

    #[test]
    fn test_shift_right() {
        // a<cb>c  ->  ac<bc>
        let mut edits = vec![
            e(OpKind::Equal, "a"),
            e(OpKind::Delete, "cb"),
            e(OpKind::Equal, "c"),
        ];
        assert!(shift_single_edits(&mut edits));
        assert_eq!(edits, vec![e(OpKind::Equal, "ac"), e(OpKind::Delete, "bc")]);
    }

    #[test]
    fn test_absorb_keeps_long_equalities() {
        let edits = vec![
            e(OpKind::Delete, "a"),
            e(OpKind::Equal, "long shared text"),
            e(OpKind::Insert, "b"),
        ];
        assert_eq!(absorb_short_equalities(edits.clone()), edits);
    }

    #[test]
    fn test_absorb_short_equality() {
        let edits = vec![
            e(OpKind::Delete, "abc"),
            e(OpKind::Equal, "x"),
            e(OpKind::Delete, "def"),
        ];
        assert_eq!(
            absorb_short_equalities(edits),
            vec![e(OpKind::Delete, "abcxdef"), e(OpKind::Insert, "x")]
        );
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let edits = vec![
            e(OpKind::Equal, "The "),
            e(OpKind::Delete, "S"),
            e(OpKind::Insert, "B"),
            e(OpKind::Equal, "u"),
            e(OpKind::Delete, "pplier"),
            e(OpKind::Insert, "yer"),
            e(OpKind::Equal, " shall pay"),
        ];
        let once = cleanup(edits);
        let twice = cleanup(once.clone());
        assert_eq!(once, twice);
    }
}
