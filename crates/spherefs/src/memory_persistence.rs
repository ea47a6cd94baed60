// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::persistence::Persistence;

/// In-memory persistence for tests and throwaway sessions.
///
/// Clones share the same saved artifact, so a test can keep one clone to
/// inspect what the filesystem wrote, or to reload a second filesystem from
/// it. `fail_writes` simulates a broken medium.
#[derive(Clone, Default)]
pub struct MemoryPersistence(Rc<State>);

#[derive(Default)]
struct State {
    saved: RefCell<Option<Vec<u8>>>,
    writes: Cell<usize>,
    fail_writes: Cell<bool>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing artifact, as if it had been saved earlier
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        let persistence = Self::default();
        _ = persistence.0.saved.replace(Some(bytes));
        persistence
    }

    pub fn saved(&self) -> Option<Vec<u8>> {
        self.0.saved.borrow().clone()
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> usize {
        self.0.writes.get()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.0.fail_writes.set(fail);
    }
}

impl Persistence for MemoryPersistence {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.saved())
    }

    fn write(&self, bytes: &[u8]) -> Result<()> {
        if self.0.fail_writes.get() {
            return Err(Error::persistence(
                self.location(),
                std::io::Error::other("simulated write failure"),
            ));
        }
        _ = self.0.saved.replace(Some(bytes.to_vec()));
        self.0.writes.set(self.0.writes.get() + 1);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
