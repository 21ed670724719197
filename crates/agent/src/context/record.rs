//! Request-scoped record of what the agent has already tried.
//!
//! A fresh [`ActionRecord`] is created for every run and handed to each
//! step by `&mut`. Nothing in it outlives the request.

use std::collections::BTreeSet;
use std::hash::{DefaultHasher, Hash, Hasher};

#[derive(Debug, Clone, Default)]
pub struct ActionRecord {
    history: Vec<(String, u64)>,
    failures: u32,
    attempted_urls: BTreeSet<String>,
}

impl ActionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash of the input after trimming, lower-casing and collapsing
    /// whitespace, so cosmetic variations of one input compare equal.
    pub fn fingerprint(input: &str) -> u64 {
        let normalized = input
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let mut hasher = DefaultHasher::new();
        normalized.hash(&mut hasher);
        hasher.finish()
    }

    /// Whether `(action, input)` is the same as the most recent dispatch.
    pub fn repeats_last(&self, action: &str, input: &str) -> bool {
        self.history
            .last()
            .is_some_and(|(last, print)| last == action && *print == Self::fingerprint(input))
    }

    /// Record a dispatched tool call. URL inputs of URL-fetching tools are
    /// kept in the attempted set.
    pub fn record(&mut self, action: &str, input: &str, fetches_url: bool, failed: bool) {
        self.history.push((action.to_string(), Self::fingerprint(input)));
        if failed {
            self.failures += 1;
        }
        if fetches_url {
            self.attempted_urls.insert(normalize_url(input));
        }
    }

    pub fn should_give_up(&self, failure_limit: u32) -> bool {
        self.failures >= failure_limit
    }

    pub fn failure_count(&self) -> u32 {
        self.failures
    }

    pub fn attempted_urls(&self) -> &BTreeSet<String> {
        &self.attempted_urls
    }

    /// Number of tool calls recorded so far.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

fn normalize_url(input: &str) -> String {
    input.trim().trim_end_matches('/').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_ignores_case_and_spacing() {
        assert_eq!(
            ActionRecord::fingerprint("  https://Example.com/a  "),
            ActionRecord::fingerprint("https://example.com/a")
        );
        assert_eq!(
            ActionRecord::fingerprint("emails:   a\tb"),
            ActionRecord::fingerprint("emails: a b")
        );
        assert_ne!(
            ActionRecord::fingerprint("https://example.com/a"),
            ActionRecord::fingerprint("https://example.com/b")
        );
    }

    #[test]
    fn repeats_only_the_last_entry() {
        let mut record = ActionRecord::new();
        assert!(!record.repeats_last("scraper", "https://a.example"));

        record.record("scraper", "https://a.example", true, false);
        assert!(record.repeats_last("scraper", "HTTPS://A.EXAMPLE "));
        assert!(!record.repeats_last("fetcher", "https://a.example"));

        record.record("scraper", "https://b.example", true, false);
        assert!(!record.repeats_last("scraper", "https://a.example"));
    }

    #[test]
    fn failures_accumulate() {
        let mut record = ActionRecord::new();
        record.record("fetcher", "x", true, true);
        assert!(!record.should_give_up(2));
        record.record("fetcher", "y", true, false);
        record.record("fetcher", "z", true, true);
        assert_eq!(record.failure_count(), 2);
        assert!(record.should_give_up(2));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn only_url_tools_add_attempted_urls() {
        let mut record = ActionRecord::new();
        record.record("scraper", "https://Example.com/", true, false);
        record.record("parser", "emails: a@b.c", false, false);
        let urls: Vec<_> = record.attempted_urls().iter().cloned().collect();
        assert_eq!(urls, vec!["https://example.com".to_string()]);
    }
}
