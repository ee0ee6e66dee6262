//! Lookup interface for the named character reference table.
//!
//! The WHATWG table has roughly 2,200 entries and belongs to the embedding
//! application; this crate only defines how the state machine queries it.
//! The machine consumes candidate code points one at a time, pruning with
//! [`EntityTable::contains_prefix`] and remembering the longest name for
//! which [`EntityTable::expansion`] succeeded, then backtracks the reader to
//! just past that name.

/// A dictionary of named character references.
///
/// Names are looked up without the leading `&` but including a trailing `;`
/// where the reference has one (the table distinguishes `amp` from `amp;`).
pub trait EntityTable {
    /// Whether any reference name starts with `prefix`.
    fn contains_prefix(&self, prefix: &str) -> bool;

    /// The expansion of an exact reference name, or `None` if the table has
    /// no such entry.
    fn expansion(&self, name: &str) -> Option<&str>;
}

/// The empty table: no named reference ever resolves.
impl EntityTable for () {
    fn contains_prefix(&self, _prefix: &str) -> bool {
        false
    }

    fn expansion(&self, _name: &str) -> Option<&str> {
        None
    }
}

/// A table backed by a slice of `(name, expansion)` pairs.
///
/// The slice must be sorted by name; both queries are binary searches.
impl<'a> EntityTable for [(&'a str, &'a str)] {
    fn contains_prefix(&self, prefix: &str) -> bool {
        let index = self.partition_point(|(name, _)| *name < prefix);
        self.get(index)
            .map_or(false, |(name, _)| name.starts_with(prefix))
    }

    fn expansion(&self, name: &str) -> Option<&str> {
        self.binary_search_by_key(&name, |(name, _)| *name)
            .ok()
            .map(|index| self[index].1)
    }
}

impl<T: EntityTable + ?Sized> EntityTable for &T {
    fn contains_prefix(&self, prefix: &str) -> bool {
        (**self).contains_prefix(prefix)
    }

    fn expansion(&self, name: &str) -> Option<&str> {
        (**self).expansion(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[(&str, &str)] = &[
        ("amp", "&"),
        ("amp;", "&"),
        ("not", "\u{ac}"),
        ("notin;", "\u{2209}"),
    ];

    #[test]
    fn prefix_queries() {
        assert!(TABLE.contains_prefix("a"));
        assert!(TABLE.contains_prefix("amp"));
        assert!(TABLE.contains_prefix("amp;"));
        assert!(TABLE.contains_prefix("noti"));
        assert!(!TABLE.contains_prefix("ampx"));
        assert!(!TABLE.contains_prefix("z"));
    }

    #[test]
    fn exact_queries() {
        assert_eq!(TABLE.expansion("amp"), Some("&"));
        assert_eq!(TABLE.expansion("notin;"), Some("\u{2209}"));
        assert_eq!(TABLE.expansion("noti"), None);
        assert_eq!(<() as EntityTable>::expansion(&(), "amp"), None);
    }
}
