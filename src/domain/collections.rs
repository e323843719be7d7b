//! Small generic helpers over lists of values.

use nonempty::NonEmpty;

/// Returns the greatest element of a non-empty list.
///
/// When several elements compare equal to the maximum, the first of them is
/// returned.
#[must_use]
pub fn max<T: Ord>(items: &NonEmpty<T>) -> &T {
    items
        .tail
        .iter()
        .fold(&items.head, |best, item| if item > best { item } else { best })
}

/// Returns every value that occurs more than once, each reported once, in the
/// order of its first occurrence.
#[must_use]
pub fn find_duplicates<T: PartialEq + Clone>(items: &[T]) -> Vec<T> {
    let mut duplicates: Vec<T> = Vec::new();
    for (i, item) in items.iter().enumerate() {
        if duplicates.contains(item) {
            continue;
        }
        if items[i + 1..].contains(item) {
            duplicates.push(item.clone());
        }
    }
    duplicates
}
