//! Request filtering: the substring blocklist and the interception hook.
//!
//! The engine calls a [`RequestInterceptor`] for every outgoing network
//! request, before dispatching it. [`BlocklistInterceptor`] answers through
//! the engine's [`RequestVerdict`] primitive using [`should_block`]:
//! a request is blocked when any rule occurs verbatim in its URL.
//!
//! Matching is a plain, case-sensitive substring test. There is no wildcard
//! or host-boundary handling, so `pixel.` also blocks
//! `https://cdn.example/pixel.gif?x` while leaving `pixelated.png` alone.
//!
//! The hook may run on an engine network thread. It only reads the
//! immutable rule list and bumps atomic counters.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

/// Rules used when the configuration does not provide its own list.
pub const DEFAULT_RULES: &[&str] = &[
    "doubleclick.net",
    "googlesyndication.com",
    "adservice.google.",
    "ads.youtube.com",
    "ads.yahoo.",
    "taboola.com",
    "outbrain.com",
    "facebook.com/tr/",
    "pixel.",
];

/// A single substring pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockRule(String);

impl BlockRule {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn pattern(&self) -> &str {
        &self.0
    }

    /// `true` if the pattern occurs anywhere in `url`.
    pub fn matches(&self, url: &str) -> bool {
        url.contains(self.0.as_str())
    }
}

impl fmt::Display for BlockRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of filtering one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Allow,
    Block,
}

impl FilterDecision {
    pub fn is_blocked(self) -> bool {
        self == FilterDecision::Block
    }
}

/// Returns `true` if any rule is a substring of `url`.
///
/// Pure and order-independent; stops at the first match.
pub fn should_block(url: &str, rules: &[BlockRule]) -> bool {
    rules.iter().any(|rule| rule.matches(url))
}

/// Ordered, immutable rule list shared by every session.
///
/// Cloning is cheap: all clones point to the same rules.
#[derive(Debug, Clone)]
pub struct Blocklist {
    rules: Arc<[BlockRule]>,
}

impl Blocklist {
    /// Builds a blocklist, dropping empty and repeated patterns.
    ///
    /// An empty pattern is a substring of every URL and would block
    /// everything, so it is ignored.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rules: Vec<BlockRule> = Vec::new();
        let mut skipped = 0usize;
        for pattern in patterns {
            let pattern = pattern.into();
            if pattern.is_empty() || rules.iter().any(|r| r.pattern() == pattern) {
                skipped += 1;
                continue;
            }
            rules.push(BlockRule(pattern));
        }
        if skipped > 0 {
            debug!(skipped, "Ignored empty or duplicate block rules");
        }
        info!(rules = rules.len(), "Blocklist ready");
        Self {
            rules: rules.into(),
        }
    }

    /// A blocklist that allows everything.
    pub fn empty() -> Self {
        Self {
            rules: Vec::<BlockRule>::new().into(),
        }
    }

    pub fn rules(&self) -> &[BlockRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn should_block(&self, url: &str) -> bool {
        should_block(url, &self.rules)
    }

    pub fn decide(&self, url: &str) -> FilterDecision {
        if self.should_block(url) {
            FilterDecision::Block
        } else {
            FilterDecision::Allow
        }
    }

    /// The first rule matching `url`, for diagnostics.
    pub fn first_match(&self, url: &str) -> Option<&BlockRule> {
        self.rules.iter().find(|rule| rule.matches(url))
    }
}

impl Default for Blocklist {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.iter().copied())
    }
}

/// Kind of resource that initiated a request, when the engine knows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Document,
    SubFrame,
    Stylesheet,
    Script,
    Image,
    Font,
    Media,
    Xhr,
    Other,
}

/// An outgoing request as seen by the hook. Built per request, never kept.
#[derive(Debug, Clone, Copy)]
pub struct RequestDescriptor<'a> {
    pub url: &'a str,
    pub resource_type: Option<ResourceType>,
}

impl<'a> RequestDescriptor<'a> {
    pub fn new(url: &'a str) -> Self {
        Self {
            url,
            resource_type: None,
        }
    }

    pub fn with_resource_type(mut self, resource_type: ResourceType) -> Self {
        self.resource_type = Some(resource_type);
        self
    }
}

/// Engine-provided accept/reject primitive for one request.
pub trait RequestVerdict {
    fn block(&mut self);
    fn allow(&mut self);
}

/// Hook invoked by the engine before each request is dispatched.
///
/// Implementations must call exactly one of [`RequestVerdict::block`] or
/// [`RequestVerdict::allow`], must not panic and must not do I/O.
pub trait RequestInterceptor: Send + Sync {
    fn intercept_request(&self, request: &RequestDescriptor<'_>, verdict: &mut dyn RequestVerdict);
}

/// Interception hook backed by a [`Blocklist`].
#[derive(Debug)]
pub struct BlocklistInterceptor {
    blocklist: Blocklist,
    enabled: bool,
    inspected: AtomicU64,
    blocked: AtomicU64,
}

impl BlocklistInterceptor {
    pub fn new(blocklist: Blocklist) -> Self {
        Self {
            blocklist,
            enabled: true,
            inspected: AtomicU64::new(0),
            blocked: AtomicU64::new(0),
        }
    }

    /// A hook that lets every request through (blocking turned off).
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(Blocklist::empty())
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn blocklist(&self) -> &Blocklist {
        &self.blocklist
    }

    /// Decision for `request` without going through a verdict.
    pub fn decide(&self, request: &RequestDescriptor<'_>) -> FilterDecision {
        if !self.enabled {
            return FilterDecision::Allow;
        }
        self.blocklist.decide(request.url)
    }

    pub fn inspected_count(&self) -> u64 {
        self.inspected.load(Ordering::Relaxed)
    }

    pub fn blocked_count(&self) -> u64 {
        self.blocked.load(Ordering::Relaxed)
    }
}

impl RequestInterceptor for BlocklistInterceptor {
    fn intercept_request(&self, request: &RequestDescriptor<'_>, verdict: &mut dyn RequestVerdict) {
        self.inspected.fetch_add(1, Ordering::Relaxed);
        match self.decide(request) {
            FilterDecision::Block => {
                self.blocked.fetch_add(1, Ordering::Relaxed);
                debug!(
                    url = request.url,
                    resource_type = ?request.resource_type,
                    "Request blocked"
                );
                verdict.block();
            }
            FilterDecision::Allow => verdict.allow(),
        }
    }
}
