//! Header row normalization
//!
//! Source files routinely carry blank or repeated header cells. Column names
//! in a [`crate::Table`] must be unique, so raw header cells are rewritten the
//! way pandas does it: a blank cell at position `i` becomes `Unnamed: i`, and
//! the second `x` becomes `x.1`, the third `x.2`, and so on.

use std::collections::{HashMap, HashSet};

/// Check whether a raw header row carries no usable name at all
pub fn is_blank_header<S: AsRef<str>>(raw: &[S]) -> bool {
    raw.iter().all(|cell| cell.as_ref().trim().is_empty())
}

/// Rewrite raw header cells into unique column names
pub fn normalize_headers<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let named: Vec<String> = raw
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let cell = cell.as_ref();
            if cell.trim().is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                cell.to_string()
            }
        })
        .collect();

    let mut used: HashSet<String> = HashSet::with_capacity(named.len());
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut columns = Vec::with_capacity(named.len());

    for name in named {
        if used.insert(name.clone()) {
            columns.push(name);
            continue;
        }

        let counter = counters.entry(name.clone()).or_insert(0);
        let unique = loop {
            *counter += 1;
            let candidate = format!("{}.{}", name, counter);
            if !used.contains(&candidate) {
                break candidate;
            }
        };
        used.insert(unique.clone());
        columns.push(unique);
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unique_names_pass_through() {
        assert_eq!(normalize_headers(&["a", "b", "c"]), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_blank_names() {
        assert_eq!(
            normalize_headers(&["id", "", "  "]),
            vec!["id", "Unnamed: 1", "Unnamed: 2"]
        );
    }

    #[test]
    fn test_duplicates_get_suffixes() {
        assert_eq!(
            normalize_headers(&["x", "x", "y", "x"]),
            vec!["x", "x.1", "y", "x.2"]
        );
    }

    #[test]
    fn test_suffix_skips_existing_names() {
        assert_eq!(
            normalize_headers(&["x", "x.1", "x"]),
            vec!["x", "x.1", "x.2"]
        );
    }

    #[test]
    fn test_blank_header_detection() {
        assert!(is_blank_header(&["", " "]));
        assert!(is_blank_header::<&str>(&[]));
        assert!(!is_blank_header(&["", "a"]));
    }
}
