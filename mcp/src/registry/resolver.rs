//! Resolution of the server that should handle a tool call.
//!
//! Matching is by server identity only: the tool being called plays no part.
//! Resolution never fails. When nothing matches, the configured fallback name
//! is returned and execution fails later if that server is not registered.

use serde_json::Value;
use tracing::debug;

use super::types::RegisteredServer;
use crate::core::config::ResolverConfig;

/// Strategy that maps the current server listing to one server name.
pub trait ServerResolver: Send + Sync {
    fn resolve(&self, servers: &[RegisteredServer]) -> String;
}

/// Resolves the first server whose identity mentions a keyword.
///
/// Checked in order, first match wins:
/// 1. the server name contains the keyword (case-insensitive);
/// 2. the server's config JSON has an `args` array with an element containing
///    the keyword, or (without `args`) a `command` string containing it.
///
/// Configs that fail to parse never match.
#[derive(Debug, Clone)]
pub struct KeywordServerResolver {
    keyword: String,
    fallback: String,
}

impl KeywordServerResolver {
    pub fn new(keyword: impl AsRef<str>, fallback: impl Into<String>) -> Self {
        Self {
            keyword: keyword.as_ref().to_lowercase(),
            fallback: fallback.into(),
        }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(&config.keyword, config.fallback_server.clone())
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn matches(&self, server: &RegisteredServer) -> bool {
        self.mentions(&server.name) || self.config_matches(&server.config)
    }

    fn mentions(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.keyword)
    }

    fn config_matches(&self, raw: &str) -> bool {
        let config: Value = match serde_json::from_str(raw) {
            Ok(config) => config,
            Err(e) => {
                debug!(error = %e, "Ignoring unparseable server config");
                return false;
            }
        };

        if let Some(args) = config.get("args").and_then(Value::as_array) {
            return args
                .iter()
                .filter_map(Value::as_str)
                .any(|arg| self.mentions(arg));
        }

        config
            .get("command")
            .and_then(Value::as_str)
            .is_some_and(|command| self.mentions(command))
    }
}

impl ServerResolver for KeywordServerResolver {
    fn resolve(&self, servers: &[RegisteredServer]) -> String {
        match servers.iter().find(|server| self.matches(server)) {
            Some(server) => server.name.clone(),
            None => {
                debug!(
                    keyword = %self.keyword,
                    fallback = %self.fallback,
                    "No registered server matched, using fallback"
                );
                self.fallback.clone()
            }
        }
    }
}
