//! Resolve-or-drop for soft links.
//!
//! Every relationship query goes through [`resolve`]. An id that names no
//! loaded record is dropped silently; it is never an error and never yields a
//! placeholder.

use signal_model::Entity;

/// Resolve each id against `pool`, dropping ids that do not resolve.
///
/// Output follows the order of `ids`.
pub fn resolve<'a, T, I, S>(pool: &'a [T], ids: I) -> Vec<&'a T>
where
    T: Entity,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ids.into_iter()
        .filter_map(|id| resolve_one(pool, id.as_ref()))
        .collect()
}

/// Resolve a single optional link.
pub fn resolve_one<'a, T: Entity>(pool: &'a [T], id: &str) -> Option<&'a T> {
    pool.iter().find(|item| item.id() == id)
}

/// Whether a soft-link set contains `id`.
pub fn links_to(ids: &[String], id: &str) -> bool {
    ids.iter().any(|linked| linked == id)
}

/// Whether an optional soft link points at `id`.
pub fn link_is(link: &Option<String>, id: &str) -> bool {
    link.as_deref() == Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_model::FocusArea;

    #[test]
    fn test_resolve_drops_dangling_ids_and_keeps_order() {
        let pool = vec![FocusArea::new("a", "A"), FocusArea::new("b", "B")];
        let resolved = resolve(&pool, ["b", "ghost", "a"]);
        let ids: Vec<&str> = resolved.iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_link_helpers() {
        assert!(links_to(&["x".to_string()], "x"));
        assert!(!links_to(&[], "x"));
        assert!(link_is(&Some("x".to_string()), "x"));
        assert!(!link_is(&None, "x"));
    }
}
