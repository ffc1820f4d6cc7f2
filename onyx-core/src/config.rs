use std::time::Duration;

use anyhow::anyhow;

pub const DEFAULT_HISTORY_POLL_SECS: u64 = 10;
pub const DEFAULT_PROMPT_QUOTA: u32 = 5;
pub const DEFAULT_TITLE_DISPLAY_CHARS: usize = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the agent service, without a trailing slash.
    /// Empty means same origin.
    pub agent_url: String,
    /// How often chat history is re-fetched.
    pub history_poll_interval: Duration,
    /// Prompt credits a user gets per reset; the sidebar gauge's 100%.
    pub prompt_quota: u32,
    /// Sidebar title length before truncation.
    pub title_display_chars: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            agent_url: String::new(),
            history_poll_interval: Duration::from_secs(DEFAULT_HISTORY_POLL_SECS),
            prompt_quota: DEFAULT_PROMPT_QUOTA,
            title_display_chars: DEFAULT_TITLE_DISPLAY_CHARS,
        }
    }
}

impl ClientConfig {
    /// Build from a key lookup. The browser build has no process environment,
    /// so the caller decides where values come from (compile-time env,
    /// `std::env`, a test map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let agent_url = lookup("ONYX_AGENT_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.agent_url);

        let poll_secs = parse_or(&lookup, "ONYX_HISTORY_POLL_SECS", DEFAULT_HISTORY_POLL_SECS)?;
        if poll_secs == 0 {
            return Err(anyhow!("ONYX_HISTORY_POLL_SECS must be greater than zero"));
        }

        Ok(Self {
            agent_url,
            history_poll_interval: Duration::from_secs(poll_secs),
            prompt_quota: parse_or(&lookup, "ONYX_PROMPT_QUOTA", defaults.prompt_quota)?,
            title_display_chars: parse_or(
                &lookup,
                "ONYX_TITLE_DISPLAY_CHARS",
                defaults.title_display_chars,
            )?,
        })
    }

    /// Poll interval for browser timers, which take `u32` milliseconds.
    /// Saturates instead of wrapping.
    pub fn history_poll_millis(&self) -> u32 {
        u32::try_from(self.history_poll_interval.as_millis()).unwrap_or(u32::MAX)
    }

    /// Join an endpoint path onto the agent URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.agent_url, path.trim_start_matches('/'))
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(val) => val
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("Failed to parse {key}={val}: {e}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.history_poll_interval, Duration::from_secs(10));
        assert_eq!(config.prompt_quota, 5);
    }

    #[test]
    fn overrides_and_trims_url() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("ONYX_AGENT_URL", "https://agent.onyx.org/ "),
            ("ONYX_HISTORY_POLL_SECS", "30"),
            ("ONYX_PROMPT_QUOTA", "25"),
        ]))
        .unwrap();

        assert_eq!(config.agent_url, "https://agent.onyx.org");
        assert_eq!(config.history_poll_interval, Duration::from_secs(30));
        assert_eq!(config.prompt_quota, 25);
        assert_eq!(config.endpoint("/chats"), "https://agent.onyx.org/chats");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ClientConfig::from_lookup(lookup(&[("ONYX_PROMPT_QUOTA", "lots")])).is_err());
        assert!(ClientConfig::from_lookup(lookup(&[("ONYX_HISTORY_POLL_SECS", "0")])).is_err());
    }

    #[test]
    fn poll_millis_saturate() {
        let config = ClientConfig::from_lookup(lookup(&[("ONYX_HISTORY_POLL_SECS", "10")])).unwrap();
        assert_eq!(config.history_poll_millis(), 10_000);

        // 5_000_000 s is past u32::MAX milliseconds.
        let config =
            ClientConfig::from_lookup(lookup(&[("ONYX_HISTORY_POLL_SECS", "5000000")])).unwrap();
        assert_eq!(config.history_poll_millis(), u32::MAX);
    }

    #[test]
    fn same_origin_endpoint() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint("prompts-left"), "/prompts-left");
    }
}
