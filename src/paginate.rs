//! Over-fetch pagination: one bounded page plus a "has next" flag.

/// One page of results, at most `per_page` entries, with a flag telling
/// whether at least one more matching row exists. Computed by over-fetching
/// a single extra row and trimming it — no separate count query.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    entries: Vec<T>,
    has_next: bool,
}

impl<T> Paginated<T> {
    /// Trim an over-fetched (`per_page + 1`) result down to a page.
    pub(crate) fn from_overfetch(mut entries: Vec<T>, per_page: u64) -> Self {
        let per_page = usize::try_from(per_page).unwrap_or(usize::MAX);
        let has_next = entries.len() > per_page;
        entries.truncate(per_page);
        Self { entries, has_next }
    }

    #[must_use]
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<T> {
        self.entries
    }

    /// Whether at least one more matching row exists past this page.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.has_next
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> IntoIterator for Paginated<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
