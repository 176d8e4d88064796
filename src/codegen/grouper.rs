//! Partitions symbol records by owning `(package, interface)`.

use crate::model::{Group, GroupKey, SymbolRecord};
use indexmap::IndexMap;

/// Groups appear in order of first occurrence of their key; records keep
/// their input order within a group. Empty input yields no groups.
pub fn group(records: Vec<SymbolRecord>) -> Vec<Group> {
    let mut partitions: IndexMap<GroupKey, Vec<SymbolRecord>> = IndexMap::new();
    for record in records {
        partitions.entry(record.group_key()).or_default().push(record);
    }

    partitions
        .into_iter()
        .map(|(key, members)| Group::new(key, members))
        .collect()
}
