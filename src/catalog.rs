//! Static lookup tables: book catalog, opening hours, membership directory.
//!
//! Plain data seeded at startup and read-only afterwards. Every lookup is
//! deterministic, so the tools built on top of these are idempotent.

use std::collections::{BTreeMap, HashSet};

/// Book catalog: title to number of copies on the shelf.
pub struct Catalog {
    books: BTreeMap<String, u32>,
}

impl Catalog {
    /// Build a catalog from explicit entries.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        Self {
            books: entries
                .into_iter()
                .map(|(title, copies)| (title.into(), copies))
                .collect(),
        }
    }

    /// The production catalog.
    pub fn seeded() -> Self {
        Self::from_entries([
            ("Clean Code", 2),
            ("The Pragmatic Programmer", 0),
            ("Introduction to Algorithms", 3),
            ("Design Patterns", 1),
            ("Deep Learning", 4),
        ])
    }

    /// Whether a title exists in the catalog (exact match).
    pub fn contains(&self, title: &str) -> bool {
        self.books.contains_key(title)
    }

    /// Copies on the shelf for a title, if it is in the catalog.
    pub fn copies(&self, title: &str) -> Option<u32> {
        self.books.get(title).copied()
    }
}

/// Opening hours keyed by lowercase day name.
pub struct OpeningHours {
    hours: BTreeMap<String, String>,
}

impl OpeningHours {
    /// The production schedule.
    pub fn seeded() -> Self {
        let mut hours = BTreeMap::new();
        for day in ["monday", "tuesday", "wednesday", "thursday", "friday"] {
            hours.insert(day.to_string(), "9:00 – 19:00".to_string());
        }
        hours.insert("saturday".to_string(), "10:00 – 16:00".to_string());
        hours.insert("sunday".to_string(), "10:00 – 14:00".to_string());
        Self { hours }
    }

    /// Hours for a day, case-insensitive. None for unknown day names.
    pub fn for_day(&self, day: &str) -> Option<&str> {
        self.hours.get(&day.to_lowercase()).map(String::as_str)
    }
}

/// The set of valid membership ids.
pub struct MembershipDirectory {
    members: HashSet<String>,
}

impl MembershipDirectory {
    /// Build a directory from explicit ids.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// The production membership set.
    pub fn seeded() -> Self {
        Self::from_ids(["M-1001", "M-2002", "M-3003"])
    }

    /// Whether an id is a valid member.
    pub fn is_member(&self, id: &str) -> bool {
        self.members.contains(id)
    }
}
