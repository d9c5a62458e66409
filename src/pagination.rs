//! Pagination and serialization of named object lists.
//!
//! Status endpoints return lists of databases and users page by page. The
//! page boundary travels as a marker: the name of the last item the client
//! has already seen.

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

/// Implemented by objects that can be paged through by name.
pub trait Named {
    /// The unique name the collection is ordered by.
    fn name(&self) -> &str;
}

/// Paginate a list of objects by name.
///
/// The list is sorted by name, items up to and including the marker are
/// skipped (the marker itself is kept when `include_marker` is set), and the
/// page is cut off at `limit` items. The second element of the returned pair
/// is the name of the last item on the page, present only when more items
/// remain after it.
///
/// A marker that matches no item seeks to where it would sort, so clients
/// can resume after a name that has since been dropped.
pub fn paginate_by_name<T: Named>(
    mut items: Vec<T>,
    limit: Option<usize>,
    marker: Option<&str>,
    include_marker: bool,
) -> (Vec<T>, Option<String>) {
    items.sort_by(|a, b| a.name().cmp(b.name()));

    let start = marker.map_or(0, |marker| {
        items
            .iter()
            .position(|item| {
                if include_marker {
                    item.name() >= marker
                } else {
                    item.name() > marker
                }
            })
            .unwrap_or(items.len())
    });

    let mut page = items.split_off(start);

    let next_marker = match limit {
        Some(limit) if page.len() > limit => {
            page.truncate(limit);
            page.last().map(|item| item.name().to_string())
        }
        _ => None,
    };

    (page, next_marker)
}

/// Paginate a list of objects by name and serialize the page.
///
/// # Errors
///
/// Returns an error if any page item fails to serialize.
pub fn serialize_page<T: Named + Serialize>(
    items: Vec<T>,
    limit: Option<usize>,
    marker: Option<&str>,
    include_marker: bool,
) -> Result<(Vec<Value>, Option<String>)> {
    let (page, next_marker) = paginate_by_name(items, limit, marker, include_marker);

    let serialized = page
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;

    Ok((serialized, next_marker))
}
