//! Output overlap guard.
//!
//! Each target `(package, name)` may be claimed once per run. The first
//! claimant keeps it; later claimants are turned into conflicts.

use crate::error::ConflictError;
use crate::model::qualify;
use indexmap::IndexMap;

#[derive(Debug, Default)]
pub struct OutputOverlapGuard {
    claimed: IndexMap<String, String>,
}

impl OutputOverlapGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `package.name` for `owner` (the qualified interface producing it).
    pub fn claim(&mut self, package: &str, name: &str, owner: &str) -> Result<(), ConflictError> {
        let target = qualify(package, name);
        if let Some(existing) = self.claimed.get(&target) {
            return Err(ConflictError::DuplicateTarget {
                interface: owner.to_string(),
                target,
                owner: existing.clone(),
            });
        }
        self.claimed.insert(target, owner.to_string());
        Ok(())
    }

    pub fn is_claimed(&self, package: &str, name: &str) -> bool {
        self.claimed.contains_key(&qualify(package, name))
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}
