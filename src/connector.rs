//! Platform connector and the bot loop built on top of it.
//!
//! The forum API sits behind the [`PlatformConnector`] trait so the loop in
//! [`run_bot`] can be driven by a real client or an in-memory fake. The
//! trait is object-safe on purpose: candidates arrive as a boxed stream and
//! comment submission returns a boxed future, so implementations are free
//! to poll, page, or long-poll however their platform requires.

use crate::check::check;
use crate::config::CheckConfig;
use crate::error::{CandidateError, ConnectorError, GreenshotError};
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::StreamExt;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashSet, VecDeque};
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Image hosts the bot will fetch from. Anything else is skipped without a
/// network round-trip.
pub const VALID_DOMAINS: [&str; 2] = ["imgur.com", "i.imgur.com"];

/// Default number of recently handled candidate ids remembered for dedup.
pub const SEEN_WINDOW: usize = 1000;

static RE_ALBUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://imgur\.com/a/").expect("album regex is valid"));

/// One link post pulled from the platform feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Platform-assigned post id, unique within the feed.
    pub id: String,
    /// Post title, used only for logging.
    pub title: String,
    /// Link target.
    pub url: String,
    /// Host part of the link target.
    pub domain: String,
    /// Self (text-only) post, no link to fetch.
    pub is_self: bool,
    /// Pinned by a moderator.
    pub stickied: bool,
    /// Set when the post was made in an official capacity
    /// (e.g. `"moderator"`).
    pub distinguished: Option<String>,
}

/// Id of a successfully posted comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentId(pub String);

/// Abstraction over the forum platform.
pub trait PlatformConnector: Send + Sync {
    /// Stream of new candidates, oldest first. The stream ends when the
    /// connector decides the session is over (test fakes end after their
    /// fixture; real clients may be endless).
    fn candidates(&self) -> BoxStream<'_, Candidate>;

    /// Post a reply under the given post.
    fn post_comment<'a>(
        &'a self,
        target_id: &'a str,
        text: &'a str,
    ) -> BoxFuture<'a, Result<CommentId, ConnectorError>>;
}

/// True when the candidate is worth fetching at all.
///
/// Self posts carry no image; stickied and moderator-distinguished posts
/// are announcements the bot stays out of.
pub fn is_eligible(candidate: &Candidate) -> bool {
    if candidate.is_self
        || candidate.stickied
        || candidate.distinguished.as_deref() == Some("moderator")
    {
        return false;
    }
    VALID_DOMAINS.contains(&candidate.domain.as_str())
}

/// Derive a directly fetchable image URL from the candidate's link.
///
/// Direct `i.imgur.com` links pass through. Album links have no single
/// image and yield `None`. Bare page links get `.png` appended — the host
/// serves the image bytes under any extension.
pub fn image_url(candidate: &Candidate) -> Option<String> {
    if candidate.domain == "i.imgur.com" {
        return Some(candidate.url.clone());
    }
    if RE_ALBUM.is_match(&candidate.url) {
        return None;
    }
    Some(format!("{}.png", candidate.url))
}

/// The footer appended to every posted transcript.
pub fn reply_footer() -> String {
    format!(
        "\n\n---\n\n^(I am a bot, v{}. Beep boop.)",
        env!("CARGO_PKG_VERSION")
    )
}

/// Bounded window of recently handled candidate ids.
///
/// Feeds re-deliver posts on every poll, so the loop must remember what it
/// has already answered. The window is bounded to keep memory flat on long
/// sessions; evicting the oldest id after `capacity` new ones is safe
/// because re-deliveries cluster near the head of the feed.
pub struct SeenWindow {
    order: VecDeque<String>,
    ids: HashSet<String>,
    capacity: usize,
}

impl SeenWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity),
            ids: HashSet::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Record an id. Returns `false` if it was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.ids.remove(&evicted);
            }
        }
        self.order.push_back(id.to_string());
        self.ids.insert(id.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Counters and per-candidate failures from one [`run_bot`] session.
#[derive(Debug, Default)]
pub struct BotStats {
    /// Candidates pulled from the stream.
    pub considered: usize,
    /// Skipped because the id was already in the seen window.
    pub duplicates: usize,
    /// Skipped by [`is_eligible`] or because the link was an album.
    pub ineligible: usize,
    /// Checked but the verdict was negative.
    pub rejected: usize,
    /// Transcript posted successfully.
    pub replied: usize,
    /// Check or reply failed; details in `errors`.
    pub failed: usize,
    /// One entry per failed candidate.
    pub errors: Vec<CandidateError>,
}

/// Drain the connector's candidate stream, checking each eligible post and
/// replying with the reconstructed transcript when the verdict is positive.
///
/// Per-candidate failures never abort the session; they are recorded in
/// [`BotStats::errors`] and the loop moves on. The function returns when
/// the candidate stream ends.
pub async fn run_bot(connector: &dyn PlatformConnector, config: &CheckConfig) -> BotStats {
    let mut stats = BotStats::default();
    let mut seen = SeenWindow::new(SEEN_WINDOW);
    let mut candidates = connector.candidates();

    while let Some(candidate) = candidates.next().await {
        stats.considered += 1;

        if !seen.insert(&candidate.id) {
            stats.duplicates += 1;
            continue;
        }

        if !is_eligible(&candidate) {
            debug!(id = %candidate.id, domain = %candidate.domain, "skipping ineligible post");
            stats.ineligible += 1;
            continue;
        }

        let url = match image_url(&candidate) {
            Some(url) => url,
            None => {
                debug!(id = %candidate.id, "skipping album link");
                stats.ineligible += 1;
                continue;
            }
        };

        let output = match check(&url, config).await {
            Ok(output) => output,
            Err(e) => {
                warn!(id = %candidate.id, "check failed — {}", e);
                stats.failed += 1;
                stats.errors.push(candidate_error(&candidate.id, e));
                continue;
            }
        };

        if !output.verdict.is_valid {
            debug!(
                id = %candidate.id,
                lines = output.verdict.line_count,
                ratio = output.verdict.quote_ratio,
                "verdict negative"
            );
            stats.rejected += 1;
            continue;
        }

        let reply = format!("{}{}", output.markdown, reply_footer());
        match post_with_retry(connector, &candidate.id, &reply).await {
            Ok(comment) => {
                info!(id = %candidate.id, comment = %comment.0, "replied with transcript");
                stats.replied += 1;
            }
            Err(e) => {
                warn!(id = %candidate.id, "reply failed — {}", e);
                stats.failed += 1;
                stats.errors.push(CandidateError::ReplyFailed {
                    id: candidate.id.clone(),
                    detail: e.to_string(),
                });
            }
        }
    }

    info!(
        considered = stats.considered,
        replied = stats.replied,
        rejected = stats.rejected,
        failed = stats.failed,
        "bot session finished"
    );
    stats
}

/// Post a comment, retrying exactly once when the platform rate-limits us.
///
/// The connector supplies the delay; anything other than a single
/// rate-limit signal is returned as-is.
async fn post_with_retry(
    connector: &dyn PlatformConnector,
    target_id: &str,
    text: &str,
) -> Result<CommentId, ConnectorError> {
    match connector.post_comment(target_id, text).await {
        Err(ConnectorError::RateLimited { retry_after }) => {
            warn!(
                "rate limited posting to {}, retrying in {:?}",
                target_id, retry_after
            );
            sleep(retry_after).await;
            connector.post_comment(target_id, text).await
        }
        other => other,
    }
}

fn candidate_error(id: &str, e: GreenshotError) -> CandidateError {
    match e {
        GreenshotError::OcrFailed { .. } | GreenshotError::OcrUnavailable { .. } => {
            CandidateError::OcrFailed {
                id: id.to_string(),
                detail: e.to_string(),
            }
        }
        other => CandidateError::FetchFailed {
            id: id.to_string(),
            detail: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn candidate(id: &str, url: &str, domain: &str) -> Candidate {
        Candidate {
            id: id.to_string(),
            title: "greentext".to_string(),
            url: url.to_string(),
            domain: domain.to_string(),
            is_self: false,
            stickied: false,
            distinguished: None,
        }
    }

    #[test]
    fn eligibility_rules() {
        let ok = candidate("a", "https://i.imgur.com/x.png", "i.imgur.com");
        assert!(is_eligible(&ok));

        let mut self_post = ok.clone();
        self_post.is_self = true;
        assert!(!is_eligible(&self_post));

        let mut stickied = ok.clone();
        stickied.stickied = true;
        assert!(!is_eligible(&stickied));

        let mut modpost = ok.clone();
        modpost.distinguished = Some("moderator".to_string());
        assert!(!is_eligible(&modpost));

        // Only the moderator distinction disqualifies a post.
        let mut flaired = ok.clone();
        flaired.distinguished = Some("special".to_string());
        assert!(is_eligible(&flaired));

        let other_host = candidate("b", "https://example.com/x.png", "example.com");
        assert!(!is_eligible(&other_host));
    }

    #[test]
    fn image_url_variants() {
        let direct = candidate("a", "https://i.imgur.com/x.png", "i.imgur.com");
        assert_eq!(image_url(&direct).as_deref(), Some("https://i.imgur.com/x.png"));

        let page = candidate("b", "https://imgur.com/x", "imgur.com");
        assert_eq!(image_url(&page).as_deref(), Some("https://imgur.com/x.png"));

        let album = candidate("c", "https://imgur.com/a/abc", "imgur.com");
        assert_eq!(image_url(&album), None);
    }

    #[test]
    fn footer_carries_the_version() {
        assert!(reply_footer().contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn seen_window_dedups_and_evicts() {
        let mut seen = SeenWindow::new(2);
        assert!(seen.insert("a"));
        assert!(!seen.insert("a"));
        assert!(seen.insert("b"));
        assert!(seen.insert("c")); // evicts "a"
        assert!(seen.insert("a"));
        assert_eq!(seen.len(), 2);
    }

    /// Connector fed by a fixed candidate list, recording posted comments.
    struct FakeConnector {
        feed: Vec<Candidate>,
        posted: Mutex<Vec<(String, String)>>,
        rate_limit_first: bool,
        post_calls: AtomicUsize,
    }

    impl FakeConnector {
        fn new(feed: Vec<Candidate>) -> Self {
            Self {
                feed,
                posted: Mutex::new(Vec::new()),
                rate_limit_first: false,
                post_calls: AtomicUsize::new(0),
            }
        }
    }

    impl PlatformConnector for FakeConnector {
        fn candidates(&self) -> BoxStream<'_, Candidate> {
            stream::iter(self.feed.clone()).boxed()
        }

        fn post_comment<'a>(
            &'a self,
            target_id: &'a str,
            text: &'a str,
        ) -> BoxFuture<'a, Result<CommentId, ConnectorError>> {
            Box::pin(async move {
                let n = self.post_calls.fetch_add(1, Ordering::SeqCst);
                if self.rate_limit_first && n == 0 {
                    return Err(ConnectorError::RateLimited {
                        retry_after: Duration::from_millis(1),
                    });
                }
                self.posted
                    .lock()
                    .unwrap()
                    .push((target_id.to_string(), text.to_string()));
                Ok(CommentId(format!("c_{}", target_id)))
            })
        }
    }

    #[tokio::test]
    async fn rate_limited_post_is_retried_once() {
        let mut connector = FakeConnector::new(vec![]);
        connector.rate_limit_first = true;

        let id = post_with_retry(&connector, "t1", ">be me")
            .await
            .expect("retry should succeed");
        assert_eq!(id.0, "c_t1");
        assert_eq!(connector.post_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn bot_loop_skips_ineligible_and_dedups() {
        let mut self_post = candidate("s1", "https://i.imgur.com/a.png", "i.imgur.com");
        self_post.is_self = true;
        let album = candidate("a1", "https://imgur.com/a/zzz", "imgur.com");
        let dup = candidate("s1", "https://i.imgur.com/a.png", "i.imgur.com");

        let connector = FakeConnector::new(vec![self_post, album, dup]);
        let stats = run_bot(&connector, &CheckConfig::default()).await;

        assert_eq!(stats.considered, 3);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.ineligible, 2);
        assert_eq!(stats.replied, 0);
        assert!(connector.posted.lock().unwrap().is_empty());
    }
}
