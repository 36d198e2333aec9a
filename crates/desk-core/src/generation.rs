//! Staleness guard for scheduled work.
//!
//! The owning context keeps a [`GenerationCursor`]. Every binder gets a
//! [`GenerationToken`] minted from it. Advancing the cursor (on supersession
//! or teardown) makes every older token stale for good, since the cursor
//! only moves forward. A token can also be cancelled directly.

use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Debug, Default)]
pub struct GenerationCursor {
    current: Rc<Cell<u64>>,
}

impl GenerationCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.current.get()
    }

    /// Moves to a new generation and returns its token.
    pub fn advance(&self) -> GenerationToken {
        let id = self.current.get() + 1;
        self.current.set(id);
        GenerationToken {
            id,
            cursor: Rc::clone(&self.current),
            cancelled: Rc::new(Cell::new(false)),
        }
    }

    /// Stales every outstanding token without minting a new one.
    pub fn invalidate(&self) {
        self.current.set(self.current.get() + 1);
    }
}

/// Snapshot of the generation a piece of work was created in.
///
/// Clones share the cancellation flag.
#[derive(Clone, Debug)]
pub struct GenerationToken {
    id: u64,
    cursor: Rc<Cell<u64>>,
    cancelled: Rc<Cell<bool>>,
}

impl GenerationToken {
    /// A token with its own private cursor; it only goes stale when cancelled.
    pub fn detached() -> Self {
        GenerationCursor::new().advance()
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    pub fn is_stale(&self) -> bool {
        self.cancelled.get() || self.cursor.get() != self.id
    }
}
