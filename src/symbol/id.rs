//! Symbol identities.

use std::{fmt, num::NonZeroU32};

/// Identities up to this value are reserved for the static built-ins.
pub use super::builtins::LAST_BUILTIN_ID;

/// Unique identity of a [`Symbol`](super::Symbol).
///
/// Built-ins carry identities fixed at build time, so passes can special-case
/// them by identity rather than by name. Everything else gets a fresh one from
/// the [`IdAllocator`] of its compilation.
#[derive(Clone, Copy, Hash, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub struct SymbolId(NonZeroU32);

impl SymbolId {
    pub(crate) const fn builtin(raw: u32) -> Self {
        assert!(
            raw != 0 && raw <= LAST_BUILTIN_ID,
            "built-in identity out of range"
        );
        match NonZeroU32::new(raw) {
            Some(id) => SymbolId(id),
            None => unreachable!(),
        }
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub fn is_builtin(self) -> bool {
        self.0.get() <= LAST_BUILTIN_ID
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out identities for the symbols created during one compilation.
#[derive(Debug)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        IdAllocator {
            next: LAST_BUILTIN_ID + 1,
        }
    }

    pub fn allocate(&mut self) -> SymbolId {
        let id = NonZeroU32::new(self.next).expect("symbol identities exhausted");
        self.next = self
            .next
            .checked_add(1)
            .expect("symbol identities exhausted");
        SymbolId(id)
    }
}
