use std::time::Duration;

use crate::models::SearchedUser;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
pub const MIN_QUERY_LEN: usize = 2;

/// Debounced directory lookup. Every edit supersedes the pending timer via a
/// generation counter; only the timer matching the latest generation issues a
/// request. In-flight responses are never cancelled, so a stale response can
/// still land after a newer query settled.
#[derive(Default)]
pub struct DirectorySearch {
    pub query: String,
    pub results: Vec<SearchedUser>,
    pub searching: bool,
    generation: u64,
}

impl DirectorySearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a keystroke. Returns the generation a debounce timer should be
    /// armed for, or None when the query is too short to ever search (results
    /// are cleared immediately and nothing is scheduled).
    pub fn edit(&mut self, query: String) -> Option<u64> {
        self.query = query;
        self.generation += 1;
        if self.trimmed().len() < MIN_QUERY_LEN {
            self.results.clear();
            self.searching = false;
            return None;
        }
        Some(self.generation)
    }

    /// Called when a debounce timer fires. Returns the query to issue if the
    /// timer is still current; a superseded timer fires into the void.
    pub fn settle(&mut self, generation: u64) -> Option<String> {
        if generation != self.generation {
            return None;
        }
        self.searching = true;
        Some(self.trimmed().to_string())
    }

    pub fn apply_results(&mut self, users: Vec<SearchedUser>) {
        self.searching = false;
        self.results = users;
    }

    /// Lookup failure: the flag resets but whatever was on screen stays.
    pub fn fail(&mut self) {
        self.searching = false;
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.results.clear();
        self.searching = false;
        self.generation += 1;
    }

    fn trimmed(&self) -> &str {
        self.query.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: i64, username: &str) -> SearchedUser {
        SearchedUser {
            id,
            username: username.to_string(),
            avatar_url: String::new(),
            status: String::new(),
            online: false,
        }
    }

    #[test]
    fn test_short_query_clears_without_scheduling() {
        let mut search = DirectorySearch::new();
        search.apply_results(vec![hit(1, "anna")]);

        assert_eq!(search.edit("a".to_string()), None);
        assert!(search.results.is_empty());
        assert!(!search.searching);
    }

    #[test]
    fn test_rapid_edits_supersede_earlier_timer() {
        let mut search = DirectorySearch::new();
        let first = search.edit("an".to_string()).unwrap();
        let second = search.edit("ann".to_string()).unwrap();

        assert!(second > first);
        assert_eq!(search.settle(first), None);
        assert_eq!(search.settle(second), Some("ann".to_string()));
        assert!(search.searching);
    }

    #[test]
    fn test_settled_query_is_trimmed() {
        let mut search = DirectorySearch::new();
        let generation = search.edit("  anna ".to_string()).unwrap();
        assert_eq!(search.settle(generation), Some("anna".to_string()));
    }

    #[test]
    fn test_results_replace_wholesale() {
        let mut search = DirectorySearch::new();
        let generation = search.edit("an".to_string()).unwrap();
        search.settle(generation);

        search.apply_results(vec![hit(1, "anna"), hit(2, "andrei")]);
        assert_eq!(search.results.len(), 2);
        assert!(!search.searching);

        search.apply_results(vec![hit(3, "anton")]);
        assert_eq!(search.results.len(), 1);
    }

    #[test]
    fn test_failure_keeps_prior_results() {
        let mut search = DirectorySearch::new();
        search.apply_results(vec![hit(1, "anna")]);

        let generation = search.edit("ann".to_string()).unwrap();
        search.settle(generation);
        search.fail();

        assert_eq!(search.results.len(), 1);
        assert!(!search.searching);
    }

    #[test]
    fn test_clear_invalidates_pending_timer() {
        let mut search = DirectorySearch::new();
        let generation = search.edit("an".to_string()).unwrap();
        search.clear();

        assert_eq!(search.settle(generation), None);
        assert!(search.query.is_empty());
        assert!(search.results.is_empty());
    }

    #[test]
    fn test_shortened_query_kills_scheduled_search() {
        let mut search = DirectorySearch::new();
        let generation = search.edit("an".to_string()).unwrap();
        assert_eq!(search.edit("a".to_string()), None);
        assert_eq!(search.settle(generation), None);
    }
}
