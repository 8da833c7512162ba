//! Navigation history: the addressable state behind back/forward and reload.

use av_story_scene_models::NavigationParams;

/// A linear history of navigation states with a cursor.
///
/// Pushing while the cursor is behind the newest entry discards the entries
/// ahead of it, the way browser history does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationContext {
    history: Vec<NavigationParams>,
    index: usize,
}

impl Default for NavigationContext {
    fn default() -> Self {
        Self::new(NavigationParams::default())
    }
}

impl NavigationContext {
    #[must_use]
    pub fn new(initial: NavigationParams) -> Self {
        Self {
            history: vec![initial],
            index: 0,
        }
    }

    /// Starts a history at the state described by `query`.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        Self::new(NavigationParams::from_query(query))
    }

    /// The state currently shown.
    #[must_use]
    pub fn current(&self) -> &NavigationParams {
        &self.history[self.index]
    }

    /// The current state as a query string.
    #[must_use]
    pub fn query(&self) -> String {
        self.current().to_query()
    }

    /// Records a new state after the current one.
    pub fn push(&mut self, params: NavigationParams) {
        self.history.truncate(self.index + 1);
        log::debug!("Navigating to ?{}", params.to_query());
        self.history.push(params);
        self.index = self.history.len() - 1;
    }

    /// Moves one entry back. Returns `None` at the start of history.
    pub fn back(&mut self) -> Option<&NavigationParams> {
        self.index = self.index.checked_sub(1)?;
        Some(self.current())
    }

    /// Moves one entry forward. Returns `None` at the end of history.
    pub fn forward(&mut self) -> Option<&NavigationParams> {
        if self.index + 1 >= self.history.len() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    #[must_use]
    pub const fn can_go_back(&self) -> bool {
        self.index > 0
    }

    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.history.len()
    }

    /// Number of entries, including any ahead of the cursor.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Always false: a history holds at least its initial state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
