/// Records that expose named text fields to the roster search box.
pub trait Searchable {
    /// Fields searched when the caller does not name any.
    const DEFAULT_FIELDS: &'static [&'static str];

    /// Values of `field`. Unknown fields yield nothing; list fields yield
    /// one value per entry.
    fn field_values(&self, field: &str) -> Vec<&str>;
}

/// Case-insensitive substring search. An empty query keeps every item.
///
/// Folding is `str::to_lowercase` only: "JOÃO" finds "João", but "joao"
/// does not, since accents are not stripped.
pub fn filter_by_query<'a, T: Searchable>(
    items: &'a [T],
    query: &str,
    fields: &[&str],
) -> Vec<&'a T> {
    if query.is_empty() {
        return items.iter().collect();
    }
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| matches_query(*item, &needle, fields))
        .collect()
}

fn matches_query<T: Searchable>(item: &T, needle: &str, fields: &[&str]) -> bool {
    fields.iter().any(|field| {
        item.field_values(field)
            .iter()
            .any(|value| value.to_lowercase().contains(needle))
    })
}
