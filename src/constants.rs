//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Outline markup constants
pub mod outline {
    /// Reserved label for the meta-notes segment
    pub const META_LABEL: &str = "メタなこと";

    /// Speaker heading: `[** 🎤name]`, optionally behind a `|>` quote marker
    pub const SPEAKER_PATTERN: &str = r"^\s*\|?>?\s*\[\*\*\s*🎤\s*(.+?)\]";

    /// Meta heading: `> メタなこと`
    pub const META_PATTERN: &str = r"^\s*\|?>\s*メタなこと";

    /// Sub-group marker used by the inspection view: `[* G1]`..`[* G6]`
    pub const GROUP_PATTERN: &str = r"^\s*\|?>?\s*\[\*\s*G([1-6])\]";

    /// Deepest indentation at which a group marker is recognized
    pub const GROUP_MAX_DEPTH: usize = 1;

    /// Indentation marker
    pub const INDENT: char = '\t';
}

/// Scrapbox document store constants
pub mod scrapbox {
    pub const DEFAULT_API_BASE: &str = "https://scrapbox.io/api";

    pub const DEFAULT_WEB_BASE: &str = "https://scrapbox.io";

    /// Session cookie name expected by the page API
    pub const SESSION_COOKIE: &str = "connect.sid";

    /// Attempts for idempotent page fetches
    pub const FETCH_ATTEMPTS: usize = 3;
}

/// Summarization constants
pub mod summary {
    pub const DEFAULT_MODEL: &str = "gpt-4o";

    pub const TEMPERATURE: f32 = 0.2;

    /// Output bound for the overall summary
    pub const OVERALL_MAX_TOKENS: usize = 256;

    /// Output bound for the category breakdown and meta bullets
    pub const CATEGORY_MAX_TOKENS: usize = 512;
}

/// Slack constants
pub mod slack {
    pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

    /// `action_id` of the regenerate button
    pub const RETRY_ACTION_ID: &str = "retry-summary";

    /// `block_id` tagging the actions block of the control message
    pub const CONTROL_BLOCK_ID: &str = "retry-control";

    /// Fallback notification text for posted messages
    pub const FALLBACK_TEXT: &str = "_summary_";

    /// Page size for `conversations.replies`
    pub const REPLIES_LIMIT: u32 = 200;

    /// Attempts for rate limited calls
    pub const RATE_LIMIT_ATTEMPTS: usize = 4;

    /// Requests older than this are rejected as replays (seconds)
    pub const MAX_REQUEST_AGE_SECS: i64 = 60 * 5;
}

/// Webhook server constants
pub mod server {
    pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

    /// Budget for the synchronous acknowledge step (Slack expects an answer in 3s)
    pub const ACK_TIMEOUT_MS: u64 = 2_500;
}

/// Seminar calendar constants
pub mod calendar {
    /// Monday that counts as week 1 of the term
    pub const BASE_DATE: &str = "2025-09-29";

    pub const TITLE_PREFIX: &str = "2025後期_Playfulゼミ_Week_";
}

/// Network constants
pub mod network {
    /// Default request timeout for external APIs (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
}
