//! Page history with single-step back navigation

use crate::models::RequestDraft;

/// Pages the console can show
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Dashboard,
    Composer,
    ResponseViewer,
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Composer => "Request Builder",
            Page::ResponseViewer => "Response Viewer",
        }
    }
}

/// One visited page, optionally carrying the draft to restore on return
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationEntry {
    pub page: Page,
    pub snapshot: Option<RequestDraft>,
}

/// Stack of visited pages. The dashboard entry at the bottom is never popped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationHistory {
    entries: Vec<NavigationEntry>,
}

impl Default for NavigationHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationHistory {
    pub fn new() -> Self {
        NavigationHistory {
            entries: vec![NavigationEntry {
                page: Page::Dashboard,
                snapshot: None,
            }],
        }
    }

    pub fn goto(&mut self, page: Page, snapshot: Option<RequestDraft>) {
        tracing::debug!(from = ?self.current().page, to = ?page, "Navigating");
        self.entries.push(NavigationEntry { page, snapshot });
    }

    /// Pop the top entry and return the one now on top.
    ///
    /// Returns `None` without changing anything when only the home entry
    /// remains.
    pub fn go_back(&mut self) -> Option<&NavigationEntry> {
        if !self.can_go_back() {
            return None;
        }
        self.entries.pop();
        let current = self.current();
        tracing::debug!(to = ?current.page, "Navigated back");
        Some(current)
    }

    pub fn can_go_back(&self) -> bool {
        self.entries.len() > 1
    }

    /// Record `draft` on the current entry so returning here restores it
    pub fn stash(&mut self, draft: RequestDraft) {
        if let Some(top) = self.entries.last_mut() {
            top.snapshot = Some(draft);
        }
    }

    pub fn current(&self) -> &NavigationEntry {
        // The home entry is never removed, so the stack is never empty.
        &self.entries[self.entries.len() - 1]
    }

    pub fn current_page(&self) -> Page {
        self.current().page
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_dashboard() {
        let history = NavigationHistory::new();
        assert_eq!(history.current_page(), Page::Dashboard);
        assert_eq!(history.len(), 1);
        assert!(!history.can_go_back());
    }

    #[test]
    fn test_back_on_home_is_noop() {
        let mut history = NavigationHistory::new();
        assert!(history.go_back().is_none());
        assert_eq!(history, NavigationHistory::new());
    }

    #[test]
    fn test_goto_then_back_restores_stack() {
        let mut history = NavigationHistory::new();
        history.goto(Page::Composer, Some(RequestDraft::default()));
        let before = history.clone();

        history.goto(Page::ResponseViewer, None);
        assert!(history.can_go_back());
        history.go_back();

        assert_eq!(history, before);
    }

    #[test]
    fn test_back_returns_new_top_snapshot() {
        let mut draft = RequestDraft::default();
        draft.set_resource_type("Item");

        let mut history = NavigationHistory::new();
        history.goto(Page::Composer, None);
        history.stash(draft.clone());
        history.goto(Page::ResponseViewer, None);

        let entry = history.go_back().cloned();
        assert_eq!(
            entry,
            Some(NavigationEntry {
                page: Page::Composer,
                snapshot: Some(draft),
            })
        );
    }

    #[test]
    fn test_can_go_back_tracks_depth() {
        let mut history = NavigationHistory::new();
        history.goto(Page::Composer, None);
        history.goto(Page::Dashboard, None);
        assert_eq!(history.len(), 3);
        history.go_back();
        assert!(history.can_go_back());
        history.go_back();
        assert!(!history.can_go_back());
        assert_eq!(history.current_page(), Page::Dashboard);
    }

    #[test]
    fn test_titles() {
        assert_eq!(Page::Composer.title(), "Request Builder");
        assert_eq!(Page::ResponseViewer.title(), "Response Viewer");
    }
}
