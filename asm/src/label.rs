use crate::error::Error;
use indexmap::IndexMap;

/// Write-once symbol table mapping label names to pc values
/// (multiples of 4, assigned as lines are consumed).
#[derive(Debug, Default)]
pub struct Labels(IndexMap<String, u32>);

impl Labels {
    pub fn new() -> Self {
        Labels(IndexMap::new())
    }

    pub fn define(&mut self, name: &str, pc: u32) -> Result<(), Error> {
        if self.0.contains_key(name) {
            return Err(Error::DuplicateLabel(name.to_string()));
        }
        self.0.insert(name.to_string(), pc);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.0.get(name).copied()
    }

    /// Entries in ascending name order, for the symbol-table dump.
    pub fn sorted(&self) -> Vec<(&str, u32)> {
        let mut entries: Vec<_> = self.0.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by_key(|&(name, _)| name);
        entries
    }
}

/// Signed word displacement of a branch from `pc` to `target`,
/// measured from the instruction after the branch. Shared by both
/// passes so the range check and the encoded value cannot drift.
pub fn branch_disp(target: u32, pc: u32) -> i64 {
    (target as i64 - pc as i64 - 4) / 4
}
