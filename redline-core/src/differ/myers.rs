//! Myers' O(ND) shortest edit script with linear-space bisection.

use super::{Edit, OpKind};

/// Raw edit script between `a` and `b`, before cleanup.
pub(crate) fn diff_chars(a: &[char], b: &[char]) -> Vec<Edit> {
    if a == b {
        return if a.is_empty() {
            Vec::new()
        } else {
            vec![Edit::new(OpKind::Equal, a.to_vec())]
        };
    }

    let prefix = common_prefix(a, b);
    let (a_rest, b_rest) = (&a[prefix..], &b[prefix..]);
    let suffix = common_suffix(a_rest, b_rest);
    let a_mid = &a_rest[..a_rest.len() - suffix];
    let b_mid = &b_rest[..b_rest.len() - suffix];

    let mut edits = Vec::new();
    push_edit(&mut edits, OpKind::Equal, &a[..prefix]);
    edits.extend(compute(a_mid, b_mid));
    push_edit(&mut edits, OpKind::Equal, &a_rest[a_rest.len() - suffix..]);
    edits
}

/// Length of the shared prefix, in chars.
pub(crate) fn common_prefix(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Length of the shared suffix, in chars.
pub(crate) fn common_suffix(a: &[char], b: &[char]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

fn push_edit(edits: &mut Vec<Edit>, kind: OpKind, text: &[char]) {
    if !text.is_empty() {
        edits.push(Edit::new(kind, text.to_vec()));
    }
}

/// Diff two texts that share no common prefix or suffix.
fn compute(a: &[char], b: &[char]) -> Vec<Edit> {
    let mut edits = Vec::new();
    if a.is_empty() {
        push_edit(&mut edits, OpKind::Insert, b);
        return edits;
    }
    if b.is_empty() {
        push_edit(&mut edits, OpKind::Delete, a);
        return edits;
    }

    let (long, short, kind) = if a.len() > b.len() {
        (a, b, OpKind::Delete)
    } else {
        (b, a, OpKind::Insert)
    };

    // Shorter text inside the longer one: two edits around an equality.
    if let Some(start) = find(long, short) {
        push_edit(&mut edits, kind, &long[..start]);
        push_edit(&mut edits, OpKind::Equal, short);
        push_edit(&mut edits, kind, &long[start + short.len()..]);
        return edits;
    }

    if short.len() == 1 {
        push_edit(&mut edits, OpKind::Delete, a);
        push_edit(&mut edits, OpKind::Insert, b);
        return edits;
    }

    bisect(a, b)
}

fn find(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Find the middle snake and recurse on both halves.
///
/// Forward and reverse searches run in lockstep over the diagonals `k`;
/// `v1[k]` / `v2[k]` hold the furthest x reached on each diagonal.
fn bisect(a: &[char], b: &[char]) -> Vec<Edit> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    let max_d = (n + m + 1) / 2;
    let v_offset = max_d;
    let v_len = 2 * max_d;
    let mut v1 = vec![-1isize; v_len as usize];
    let mut v2 = vec![-1isize; v_len as usize];
    v1[(v_offset + 1) as usize] = 0;
    v2[(v_offset + 1) as usize] = 0;

    let delta = n - m;
    // With an odd delta the forward path detects the overlap, otherwise the reverse one.
    let front = delta % 2 != 0;

    let (mut k1_start, mut k1_end, mut k2_start, mut k2_end) = (0isize, 0isize, 0isize, 0isize);

    for d in 0..max_d {
        let mut k1 = -d + k1_start;
        while k1 <= d - k1_end {
            let k1_offset = (v_offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                v1[k1_offset + 1]
            } else {
                v1[k1_offset - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 >= 0 && y1 >= 0 && x1 < n && y1 < m && a[x1 as usize] == b[y1 as usize] {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_offset] = x1;

            if x1 > n {
                // Ran off the right of the graph.
                k1_end += 2;
            } else if y1 > m {
                // Ran off the bottom of the graph.
                k1_start += 2;
            } else if front {
                let k2_offset = v_offset + delta - k1;
                if k2_offset >= 0 && k2_offset < v_len && v2[k2_offset as usize] != -1 {
                    let x2 = n - v2[k2_offset as usize];
                    if x1 >= x2 {
                        if let Some(edits) = split(a, b, x1, y1) {
                            return edits;
                        }
                    }
                }
            }
            k1 += 2;
        }

        let mut k2 = -d + k2_start;
        while k2 <= d - k2_end {
            let k2_offset = (v_offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                v2[k2_offset + 1]
            } else {
                v2[k2_offset - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 >= 0
                && y2 >= 0
                && x2 < n
                && y2 < m
                && a[(n - x2 - 1) as usize] == b[(m - y2 - 1) as usize]
            {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_offset] = x2;

            if x2 > n {
                k2_end += 2;
            } else if y2 > m {
                k2_start += 2;
            } else if !front {
                let k1_offset = v_offset + delta - k2;
                if k1_offset >= 0 && k1_offset < v_len && v1[k1_offset as usize] != -1 {
                    let x1 = v1[k1_offset as usize];
                    let y1 = v_offset + x1 - k1_offset;
                    // Mirror x2 onto the top-left coordinate system.
                    if x1 >= n - x2 {
                        if let Some(edits) = split(a, b, x1, y1) {
                            return edits;
                        }
                    }
                }
            }
            k2 += 2;
        }
    }

    // No commonality at all.
    vec![
        Edit::new(OpKind::Delete, a.to_vec()),
        Edit::new(OpKind::Insert, b.to_vec()),
    ]
}

/// Diff the two halves either side of the snake at (`x`, `y`).
///
/// Returns `None` for a split point that would not shrink the problem.
fn split(a: &[char], b: &[char], x: isize, y: isize) -> Option<Vec<Edit>> {
    let (n, m) = (a.len() as isize, b.len() as isize);
    if !(0..=n).contains(&x) || !(0..=m).contains(&y) {
        return None;
    }
    if (x == 0 && y == 0) || (x == n && y == m) {
        return None;
    }
    let (x, y) = (x as usize, y as usize);
    let mut edits = diff_chars(&a[..x], &b[..y]);
    edits.extend(diff_chars(&a[x..], &b[y..]));
    Some(edits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn side(edits: &[Edit], keep: OpKind) -> String {
        edits
            .iter()
            .filter(|e| e.kind == OpKind::Equal || e.kind == keep)
            .flat_map(|e| e.text.iter())
            .collect()
    }

    fn edit_distance(edits: &[Edit]) -> usize {
        edits
            .iter()
            .filter(|e| e.kind != OpKind::Equal)
            .map(|e| e.text.len())
            .sum()
    }

    #[test]
    fn test_common_prefix_suffix() {
        assert_eq!(common_prefix(&chars("abcxyz"), &chars("abcdef")), 3);
        assert_eq!(common_suffix(&chars("xyzabc"), &chars("defabc")), 3);
        assert_eq!(common_prefix(&chars(""), &chars("abc")), 0);
    }

    #[test]
    fn test_bisect_minimal() {
        let (a, b) = (chars("cat"), chars("map"));
        let edits = bisect(&a, &b);
        assert_eq!(side(&edits, OpKind::Delete), "cat");
        assert_eq!(side(&edits, OpKind::Insert), "map");
        // One shared character: c->m and t->p cost 4.
        assert_eq!(edit_distance(&edits), 4);
    }

    #[test]
    fn test_minimal_edit_distance() {
        let (a, b) = (chars("ABCABBA"), chars("CBABAC"));
        let edits = diff_chars(&a, &b);
        assert_eq!(side(&edits, OpKind::Delete), "ABCABBA");
        assert_eq!(side(&edits, OpKind::Insert), "CBABAC");
        // Classic example from the paper: D = 5.
        assert_eq!(edit_distance(&edits), 5);
    }

    #[test]
    fn test_no_commonality() {
        let edits = diff_chars(&chars("abc"), &chars("xyz"));
        assert_eq!(side(&edits, OpKind::Delete), "abc");
        assert_eq!(side(&edits, OpKind::Insert), "xyz");
        assert!(edits.iter().all(|e| e.kind != OpKind::Equal));
    }
}
