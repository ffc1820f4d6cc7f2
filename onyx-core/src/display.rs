//! Small formatting helpers for the sidebar and message list.

use chrono::{DateTime, Utc};

use crate::ChatMessage;

/// Shorten a chat title for the history list.
pub fn truncate_title(title: &str, max_chars: usize) -> String {
    match title.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &title[..cut]),
        None => title.to_string(),
    }
}

/// `0x1234...abcd` style wallet address.
pub fn format_wallet_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%H:%M").to_string()
}

/// Messages with no text (pure tool-call turns) are not rendered as bubbles.
pub fn is_displayable(message: &ChatMessage) -> bool {
    !message.content.is_empty()
}

/// Remaining prompt credits against the quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditGauge {
    pub remaining: u32,
    pub quota: u32,
}

impl CreditGauge {
    pub fn new(remaining: u32, quota: u32) -> Self {
        Self { remaining, quota }
    }

    /// Fill of the progress bar, 0..=100.
    pub fn percent(&self) -> u32 {
        if self.quota == 0 {
            return 0;
        }
        let pct = u64::from(self.remaining) * 100 / u64::from(self.quota);
        pct.min(100) as u32
    }

    pub fn label(&self) -> String {
        format!("{} / {}", self.remaining, self.quota)
    }
}
