// File: src/core/search.rs
use crate::core::counter::count;
use crate::core::index::{Node, WordCountIndex};

impl WordCountIndex {
    /// Finds every indexed word that can be spelled from `query`'s letters.
    ///
    /// With `exact` unset a word matches when, for each alphabet character,
    /// it uses no more copies than the query supplies (the rack rule).
    /// With `exact` set its counts must equal the query's.
    ///
    /// Results come back longest first, ties in lexicographic order.
    /// Truncating to a display threshold is left to the caller.
    pub fn search(&self, query: &str, exact: bool) -> Vec<&str> {
        let needs = self.alphabet().project(&count(query));
        let mut matches = Vec::new();
        collect(self.root(), &needs, exact, &mut matches);
        rank(&mut matches);
        matches
    }
}

/// Appends every bucket reachable from `node` under the remaining `needs`.
/// Worst case branches by `need + 1` per level, but most levels only hold
/// the zero key.
fn collect<'a>(node: &'a Node, needs: &[u32], exact: bool, matches: &mut Vec<&'a str>) {
    let children = match node {
        Node::Leaf(words) => {
            matches.extend(words.iter().map(String::as_str));
            return;
        }
        Node::Branch(children) => children,
    };
    let Some((&need, rest)) = needs.split_first() else {
        return;
    };

    if exact {
        if let Some(child) = children.get(&need) {
            collect(child, rest, exact, matches);
        }
    } else {
        // most constrained counts first
        for (_, child) in children.range(..=need).rev() {
            collect(child, rest, exact, matches);
        }
    }
}

/// Longest first, then lexicographic, so output does not depend on traversal order.
pub fn rank<S: AsRef<str>>(words: &mut [S]) {
    words.sort_by(|a, b| {
        let (a, b) = (a.as_ref(), b.as_ref());
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });
}
