//! The rendering surface scenes draw into.
//!
//! There is one surface per page. Scenes clear it and draw synchronously
//! after their data is ready, so no two scenes ever interleave their output.

use std::sync::{Arc, Mutex, PoisonError};

use crate::drawing::Drawing;

/// A rendering target.
pub trait Surface: Send + Sync {
    /// Removes everything previously drawn, including controls.
    fn clear(&self);

    /// Adds a drawing.
    fn draw(&self, drawing: Drawing);
}

#[derive(Debug, Default)]
struct MemoryState {
    drawings: Vec<Drawing>,
    revision: u64,
}

/// A surface that keeps drawings in memory.
///
/// Clones share the same contents, so a caller can keep one handle to read
/// what was drawn while handing another to the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current drawings, oldest first.
    #[must_use]
    pub fn drawings(&self) -> Vec<Drawing> {
        self.lock().drawings.clone()
    }

    /// The most recent drawing, if any.
    #[must_use]
    pub fn current(&self) -> Option<Drawing> {
        self.lock().drawings.last().cloned()
    }

    /// Incremented on every `clear` and `draw`.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }
}

impl Surface for MemorySurface {
    fn clear(&self) {
        let mut state = self.lock();
        state.drawings.clear();
        state.revision += 1;
    }

    fn draw(&self, drawing: Drawing) {
        let mut state = self.lock();
        state.drawings.push(drawing);
        state.revision += 1;
    }
}
