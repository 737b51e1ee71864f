//! Member registry.
//!
//! Keeps the set of known community members in memory and mirrors every
//! new registration into the append-only [`MemberLog`].

pub mod store;

pub use store::MemberLog;

use crate::models::{Member, MemberId};
use anyhow::Result;
use std::collections::BTreeMap;
use tracing::{error, info};

/// Outcome of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The identity was unknown and has been added.
    New,
    /// The identity was already registered; nothing changed.
    Existing,
}

/// Registry of community members.
#[derive(Debug, Default)]
pub struct MemberRegistry {
    members: BTreeMap<MemberId, Member>,
    log: Option<MemberLog>,
}

impl MemberRegistry {
    /// Create a registry that is not backed by a file.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed registry, replaying the existing log.
    pub fn open(log: MemberLog) -> Result<Self> {
        let mut members = BTreeMap::new();
        for member in log.load()? {
            members.entry(member.id).or_insert(member);
        }
        info!(
            "Loaded {} members from {}",
            members.len(),
            log.path().display()
        );

        Ok(Self {
            members,
            log: Some(log),
        })
    }

    /// Register a member. Known identities are left untouched.
    ///
    /// The log append happens before the in-memory insert. A failed append
    /// is logged and the insert still commits.
    pub fn register(&mut self, id: MemberId, display_name: &str) -> Registration {
        if self.members.contains_key(&id) {
            return Registration::Existing;
        }

        let member = Member::new(id, display_name);
        if let Some(ref log) = self.log {
            if let Err(e) = log.append(&member) {
                error!("Member {} not persisted: {:#}", id, e);
            }
        }

        info!("Registered member {} ({})", id, display_name);
        self.members.insert(id, member);
        Registration::New
    }

    /// Snapshot of all members, ordered by identity.
    pub fn list_all(&self) -> Vec<Member> {
        self.members.values().cloned().collect()
    }

    /// Identities of all members, ordered.
    pub fn ids(&self) -> Vec<MemberId> {
        self.members.keys().copied().collect()
    }

    pub fn count(&self) -> usize {
        self.members.len()
    }

    #[allow(dead_code)] // Inspection accessor
    pub fn contains(&self, id: MemberId) -> bool {
        self.members.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_register_new_and_existing() {
        let mut registry = MemberRegistry::in_memory();
        assert_eq!(registry.register(MemberId(1), "Alice"), Registration::New);
        assert_eq!(
            registry.register(MemberId(1), "Renamed"),
            Registration::Existing
        );
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.list_all()[0].display_name, "Alice");
    }

    #[test]
    fn test_reregistration_writes_no_duplicate_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("members.txt");

        let mut registry = MemberRegistry::open(MemberLog::new(&path)).unwrap();
        registry.register(MemberId(1), "Alice");
        registry.register(MemberId(1), "Alice");
        registry.register(MemberId(2), "Bob");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_open_replays_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("members.txt");
        {
            let mut registry = MemberRegistry::open(MemberLog::new(&path)).unwrap();
            registry.register(MemberId(10), "Alice");
            registry.register(MemberId(20), "Bob");
        }

        let registry = MemberRegistry::open(MemberLog::new(&path)).unwrap();
        assert_eq!(registry.count(), 2);
        assert!(registry.contains(MemberId(20)));
        assert_eq!(registry.ids(), vec![MemberId(10), MemberId(20)]);
    }

    #[test]
    fn test_open_keeps_first_duplicate_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("members.txt");
        std::fs::write(&path, "1,Alice\n1,Mallory\n").unwrap();

        let registry = MemberRegistry::open(MemberLog::new(&path)).unwrap();
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.list_all()[0].display_name, "Alice");
    }

    #[test]
    fn test_open_survives_corrupt_tail() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("members.txt");
        std::fs::write(&path, b"1,Alice\n2,Zo\xc3").unwrap();

        let mut registry = MemberRegistry::open(MemberLog::new(&path)).unwrap();
        assert_eq!(registry.ids(), vec![MemberId(1)]);
        registry.register(MemberId(3), "Carol");

        let registry = MemberRegistry::open(MemberLog::new(&path)).unwrap();
        assert_eq!(registry.ids(), vec![MemberId(1), MemberId(3)]);
        assert_eq!(registry.list_all()[1].display_name, "Carol");
    }

    #[test]
    fn test_unwritable_log_still_registers() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be opened for appending.
        let mut registry = MemberRegistry {
            members: BTreeMap::new(),
            log: Some(MemberLog::new(dir.path())),
        };
        assert_eq!(registry.register(MemberId(1), "Alice"), Registration::New);
        assert_eq!(registry.count(), 1);
    }
}
