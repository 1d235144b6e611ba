//! Dotted permission-node matching.

/// Expand a node into its prefix ladder.
///
/// Each entry is the node truncated to one more segment, so
/// `"perm.manage.roles"` yields `["perm", "perm.manage", "perm.manage.roles"]`.
/// Useful for showing which wildcard grants would cover a node.
pub fn prefixes(node: &str) -> Vec<String> {
    let mut ladder = Vec::new();
    let mut prefix = String::new();
    for segment in node.split('.') {
        if !prefix.is_empty() {
            prefix.push('.');
        }
        prefix.push_str(segment);
        ladder.push(prefix.clone());
    }
    ladder
}

/// Check whether either node authorizes the other.
///
/// Callers rarely know which of two nodes is the more general one, so the
/// public test is symmetric: `nodes_satisfy("a.b", "a.*")` and
/// `nodes_satisfy("a.*", "a.b")` agree.
pub fn nodes_satisfy(first: &str, second: &str) -> bool {
    satisfies(first, second) || satisfies(second, first)
}

/// Check whether `held` authorizes `wanted`.
///
/// True on exact match, or when `held` carries a `*` segment at any depth
/// reached while walking `wanted`. A plain prefix never authorizes: `a.b`
/// does not satisfy `a.b.c`, only `a.b.*` does. The walk is bounded by
/// `wanted`'s segments, so a `*` in `held` past the end of `wanted` is
/// never reached.
fn satisfies(wanted: &str, held: &str) -> bool {
    if wanted == held {
        return true;
    }

    let mut held_segments = held.split('.');
    for segment in wanted.split('.') {
        match held_segments.next() {
            Some("*") => return true,
            Some(held_segment) if held_segment == segment => {}
            _ => return false,
        }
    }
    false
}
