//! Entity resolution
//!
//! Turns the names users type (vCenter, VM, policy, storage domain, job,
//! resource pool, datastore) into cluster identifiers.
//!
//! - [`resolver`] - list/search backed lookups
//! - [`tree`] - traversal of a fetched source tree

pub mod resolver;
pub mod tree;

pub use resolver::{
    find_job, match_root, partition_children, policy, require_sources, resolve_source,
    select_job, storage_domain, NamedEntity, SourceResolution,
};
pub use tree::resolve_leaf;

/// Split a comma separated name list, dropping blanks
pub fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_names() {
        assert_eq!(split_names("vm1, vm2,,vm3 "), vec!["vm1", "vm2", "vm3"]);
        assert!(split_names(" , ").is_empty());
    }
}
