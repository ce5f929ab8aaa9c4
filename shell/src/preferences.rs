//! Servo engine preferences.
//!
//! Thread pools are sized to the machine (clamped). Tracking-prone APIs
//! (geolocation, Bluetooth, notifications, WebRTC) are off, HTTPS is
//! enforced and MIME sniffing disabled. The user agent comes from the
//! configuration.
//!
//! Engine options carry the profile: Servo writes cookies, HSTS entries and
//! auth data under `config_dir`.

use std::path::Path;

use lumen::config::Config;
use lumen::session::{BrowsingSession, CookiePolicy};
use tracing::{debug, info};

/// Servo options for the session the first window opens with.
///
/// A force-persistent session gets its storage directory as `config_dir`.
/// Without one, Servo keeps that state in memory only.
pub fn build_servo_opts(session: Option<&BrowsingSession>) -> servo::Opts {
    let mut opts = servo::Opts::default();
    opts.config_dir = session
        .filter(|s| s.cookie_policy() == CookiePolicy::ForcePersistent)
        .and_then(BrowsingSession::storage_dir)
        .map(Path::to_path_buf);

    if let Some(cache) = session.and_then(BrowsingSession::cache_dir) {
        debug!(cache = %cache.display(), "Servo has no disk cache, profile cache directory unused");
    }
    info!(config_dir = ?opts.config_dir, "Servo options configured");
    opts
}

#[allow(clippy::field_reassign_with_default)]
pub fn build_servo_preferences(config: &Config) -> servo::Preferences {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get() as i64)
        .unwrap_or(4);

    let mut prefs = servo::Preferences::default();

    prefs.layout_threads = cpus.min(8);
    prefs.threadpools_async_runtime_workers_max = (cpus * 2).min(16);
    prefs.threadpools_image_cache_workers_max = cpus.min(8);
    prefs.threadpools_webrender_workers_max = (cpus / 2).clamp(2, 8);
    prefs.threadpools_resource_workers_max = cpus.min(8);
    prefs.network_http_cache_size = 50_000;
    prefs.gfx_precache_shaders = true;

    // Servo has a single, engine-wide user agent.
    prefs.user_agent = config.network.effective_user_agent().to_string();

    prefs.network_enforce_tls_enabled = true;
    prefs.network_mime_sniff = false;

    prefs.dom_geolocation_enabled = false;
    prefs.dom_bluetooth_enabled = false;
    prefs.dom_notification_enabled = false;
    // SECURITY: WebRTC can reveal local addresses through STUN, even behind
    // a VPN. Video calls stop working.
    prefs.dom_webrtc_enabled = false;

    info!(
        cpus,
        layout_threads = prefs.layout_threads,
        network_workers = prefs.threadpools_async_runtime_workers_max,
        cache_size = prefs.network_http_cache_size,
        user_agent = %prefs.user_agent,
        "Servo preferences configured"
    );

    prefs
}
