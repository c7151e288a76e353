//! Client-side text filter over the fetched rows

/// Rows that can be matched by the free-text search box
pub trait Searchable {
    /// The profile id and name the search box matches against
    fn search_fields(&self) -> [&str; 2];
}

/// Case-insensitive substring match of `query` against a row
#[must_use]
pub fn matches<R: Searchable + ?Sized>(row: &R, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    needle.is_empty()
        || row
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
}

/// Rows whose id or name contain `query`, in their original order
///
/// A blank query returns every row unchanged.
#[must_use]
pub fn filter_rows<R: Searchable + Clone>(rows: &[R], query: &str) -> Vec<R> {
    if query.trim().is_empty() {
        return rows.to_vec();
    }

    rows.iter()
        .filter(|row| matches(*row, query))
        .cloned()
        .collect()
}
