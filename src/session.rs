//! Browsing sessions (engine profiles).
//!
//! A session is the isolation unit handed to the engine when a tab's
//! surface is created: cookie jar, cache and storage locations, user agent
//! and the request-interception hook.
//!
//! - **Persistent**: one named session, created on first use and reused for
//!   every later tab. Bound to the profile root so state survives restarts.
//! - **Incognito**: a fresh session per request, never reused. It has no
//!   paths and creating it touches nothing on disk.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::privacy::{Blocklist, BlocklistInterceptor};
use crate::profile::ProfilePaths;

/// Storage name of the persistent session.
pub const PERSISTENT_SESSION_NAME: &str = "user-profile";

/// Whether a session keeps state across restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionMode {
    Persistent,
    Incognito,
}

impl SessionMode {
    pub fn is_incognito(self) -> bool {
        self == SessionMode::Incognito
    }
}

/// How the engine treats cookies for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookiePolicy {
    /// Every cookie, including session cookies, is written to storage.
    ForcePersistent,
    /// Cookies live in memory and vanish with the session.
    NoPersistentCookies,
}

/// Process-unique session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An engine profile as configured by the browser.
#[derive(Debug)]
pub struct BrowsingSession {
    id: SessionId,
    mode: SessionMode,
    storage_name: Option<String>,
    cache_dir: Option<PathBuf>,
    storage_dir: Option<PathBuf>,
    cookie_policy: CookiePolicy,
    user_agent: String,
    interceptor: Arc<BlocklistInterceptor>,
}

impl BrowsingSession {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn is_incognito(&self) -> bool {
        self.mode.is_incognito()
    }

    /// Name of an on-disk profile. `None` for off-the-record sessions.
    pub fn storage_name(&self) -> Option<&str> {
        self.storage_name.as_deref()
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    pub fn storage_dir(&self) -> Option<&Path> {
        self.storage_dir.as_deref()
    }

    pub fn cookie_policy(&self) -> CookiePolicy {
        self.cookie_policy
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// The hook the engine must call before each request of this session.
    pub fn interceptor(&self) -> &Arc<BlocklistInterceptor> {
        &self.interceptor
    }
}

impl Drop for BrowsingSession {
    fn drop(&mut self) {
        if self.is_incognito() {
            debug!(
                session = %self.id,
                blocked = self.interceptor.blocked_count(),
                "Incognito session discarded"
            );
        }
    }
}

/// Creates sessions and owns the single persistent one.
#[derive(Debug)]
pub struct SessionFactory {
    paths: ProfilePaths,
    user_agent: String,
    blocklist: Blocklist,
    blocking_enabled: bool,
    persistent: Option<Arc<BrowsingSession>>,
    next_id: u64,
}

impl SessionFactory {
    pub fn new(paths: ProfilePaths, user_agent: impl Into<String>, blocklist: Blocklist) -> Self {
        Self {
            paths,
            user_agent: user_agent.into(),
            blocklist,
            blocking_enabled: true,
            persistent: None,
            next_id: 1,
        }
    }

    /// Builds a factory from the configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut factory = Self::new(
            ProfilePaths::from_config(&config.profile),
            config.network.effective_user_agent(),
            config.blocking.blocklist(),
        );
        factory.blocking_enabled = config.blocking.enabled;
        if !factory.blocking_enabled {
            info!("Request blocking disabled by configuration");
        }
        factory
    }

    pub fn paths(&self) -> &ProfilePaths {
        &self.paths
    }

    pub fn blocklist(&self) -> &Blocklist {
        &self.blocklist
    }

    /// Returns a session for `mode`.
    ///
    /// The persistent session is created (with its directories) on the first
    /// call and shared afterwards. Every incognito call yields a new session.
    pub fn create_session(&mut self, mode: SessionMode) -> Result<Arc<BrowsingSession>> {
        match mode {
            SessionMode::Persistent => {
                if let Some(session) = &self.persistent {
                    return Ok(Arc::clone(session));
                }
                self.paths.ensure_dirs()?;
                let session = Arc::new(BrowsingSession {
                    id: self.allocate_id(),
                    mode,
                    storage_name: Some(PERSISTENT_SESSION_NAME.to_string()),
                    cache_dir: Some(self.paths.cache_dir()),
                    storage_dir: Some(self.paths.storage_dir()),
                    cookie_policy: CookiePolicy::ForcePersistent,
                    user_agent: self.user_agent.clone(),
                    interceptor: self.new_interceptor(),
                });
                info!(
                    session = %session.id,
                    root = %self.paths.root().display(),
                    "Persistent session created"
                );
                self.persistent = Some(Arc::clone(&session));
                Ok(session)
            }
            SessionMode::Incognito => {
                let session = Arc::new(BrowsingSession {
                    id: self.allocate_id(),
                    mode,
                    storage_name: None,
                    cache_dir: None,
                    storage_dir: None,
                    cookie_policy: CookiePolicy::NoPersistentCookies,
                    user_agent: self.user_agent.clone(),
                    interceptor: self.new_interceptor(),
                });
                debug!(session = %session.id, "Incognito session created");
                Ok(session)
            }
        }
    }

    fn new_interceptor(&self) -> Arc<BlocklistInterceptor> {
        if self.blocking_enabled {
            Arc::new(BlocklistInterceptor::new(self.blocklist.clone()))
        } else {
            Arc::new(BlocklistInterceptor::disabled())
        }
    }

    fn allocate_id(&mut self) -> SessionId {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        id
    }
}
