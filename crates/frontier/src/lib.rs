use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use tracing::trace;
use url::Url;

/// A URL admitted to the frontier, tagged with the depth it was first
/// discovered at.
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: u32,
}

/// Coordinator-owned crawl state: the FIFO work queue, the referrer map, and
/// the visited/queued/in-progress membership sets that make admission O(1).
///
/// Nothing here is shared across workers. A single coordinator task owns a
/// `Frontier` exclusively; workers only ever compute fetch results and hand
/// them back for the coordinator to fold in via [`Frontier::complete`] and
/// [`Frontier::admit`].
#[derive(Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    queued: HashSet<Url>,
    in_progress: HashSet<Url>,
    visited: HashSet<Url>,
    referrers: HashMap<Url, BTreeSet<Url>>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the frontier with the crawl's starting URL at depth 0.
    pub fn seed(&mut self, url: Url) {
        self.queued.insert(url.clone());
        self.queue.push_back(FrontierEntry { url, depth: 0 });
    }

    /// Record that `referrer` links to `target`. Recorded regardless of
    /// whether `target` is ultimately admitted to the queue, so a URL
    /// discovered twice from two different pages carries both referrers even
    /// though it's only ever fetched once.
    pub fn add_referrer(&mut self, target: &Url, referrer: Url) {
        self.referrers.entry(target.clone()).or_default().insert(referrer);
    }

    pub fn referrers_of(&self, url: &Url) -> Vec<Url> {
        self.referrers
            .get(url)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// True once `url` has been visited, is currently in flight, or is still
    /// sitting in the queue — i.e. admitting it again would violate the
    /// at-most-once-fetch invariant.
    pub fn is_known(&self, url: &Url) -> bool {
        self.visited.contains(url) || self.in_progress.contains(url) || self.queued.contains(url)
    }

    /// Enqueue `url` at `depth` if it isn't already known. Returns whether it
    /// was actually admitted.
    pub fn admit(&mut self, url: Url, depth: u32) -> bool {
        if self.is_known(&url) {
            return false;
        }
        trace!(%url, depth, "admitting url to frontier");
        self.queued.insert(url.clone());
        self.queue.push_back(FrontierEntry { url, depth });
        true
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Dequeue the next entry in FIFO order and mark it in-progress.
    pub fn dispatch(&mut self) -> Option<FrontierEntry> {
        let entry = self.queue.pop_front()?;
        self.queued.remove(&entry.url);
        self.in_progress.insert(entry.url.clone());
        Some(entry)
    }

    /// Mark a dispatched URL as finished, moving it from in-progress to
    /// visited.
    pub fn complete(&mut self, url: &Url) {
        self.in_progress.remove(url);
        self.visited.insert(url.clone());
    }

    pub fn visited(&self) -> &HashSet<Url> {
        &self.visited
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn in_progress_count(&self) -> usize {
        self.in_progress.len()
    }
}
