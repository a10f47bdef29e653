//! Reference set differencing across a document edit.

use std::collections::BTreeSet;

/// URLs gained and lost between two versions of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefDiff {
    /// Referenced by the next version only.
    pub added: BTreeSet<String>,
    /// Referenced by the previous version only.
    pub removed: BTreeSet<String>,
}

impl RefDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Replay this diff on top of `previous`.
    pub fn apply(&self, previous: &BTreeSet<String>) -> BTreeSet<String> {
        previous
            .difference(&self.removed)
            .chain(self.added.iter())
            .cloned()
            .collect()
    }
}

/// Compute `added = next - previous` and `removed = previous - next`.
pub fn diff(previous: &BTreeSet<String>, next: &BTreeSet<String>) -> RefDiff {
    RefDiff {
        added: next.difference(previous).cloned().collect(),
        removed: previous.difference(next).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(urls: &[&str]) -> BTreeSet<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_diff_partial_overlap() {
        let d = diff(&set(&["a", "b"]), &set(&["b", "c"]));
        assert_eq!(d.added, set(&["c"]));
        assert_eq!(d.removed, set(&["a"]));
    }

    #[test]
    fn test_diff_empty_inputs() {
        assert!(diff(&set(&[]), &set(&[])).is_empty());

        let d = diff(&set(&[]), &set(&["a"]));
        assert_eq!(d.added, set(&["a"]));
        assert!(d.removed.is_empty());

        let d = diff(&set(&["a"]), &set(&[]));
        assert!(d.added.is_empty());
        assert_eq!(d.removed, set(&["a"]));
    }

    #[test]
    fn test_diff_properties_hold() {
        let cases = [
            (set(&["a", "b", "c"]), set(&["c", "d"])),
            (set(&["x"]), set(&["x"])),
            (set(&[]), set(&["p", "q"])),
            (set(&["p", "q"]), set(&[])),
        ];

        for (previous, next) in cases {
            let d = diff(&previous, &next);
            assert!(d.added.is_disjoint(&d.removed));
            assert_eq!(d.apply(&previous), next);
        }
    }
}
