//! Keyed diagnostic output for tracing a registry build or a parse.
//!
//! Messages carry a key (`attrs`, `parser`, `assign`, `final`) and are only
//! formatted when a pattern enables that key. Enabled messages go out as
//! `tracing` events on the `cmdspec::diag` target, so the subscriber's
//! filter still applies on top.

/// Enable patterns for diagnostic keys.
///
/// A pattern is `all`, an exact key, or a prefix ending in `*`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    patterns: Vec<String>,
}

impl Diagnostics {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut diag = Self::default();
        for pattern in patterns {
            diag.enable(pattern);
        }
        diag
    }

    /// Parse a `,` or `.` separated pattern list, e.g. `"parser,attrs"`.
    pub fn parse(list: &str) -> Self {
        Self::new(
            list.split([',', '.'])
                .map(str::trim)
                .filter(|p| !p.is_empty()),
        )
    }

    pub fn enable(&mut self, pattern: impl Into<String>) {
        let pattern = pattern.into();
        if !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
    }

    pub fn disable(&mut self, pattern: &str) {
        self.patterns.retain(|p| p != pattern);
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_enabled(&self, key: &str) -> bool {
        self.patterns.iter().any(|p| {
            p == "all"
                || p == key
                || p.strip_suffix('*')
                    .is_some_and(|prefix| key.starts_with(prefix))
        })
    }

    /// Emit `text()` under `key` if enabled. The closure only runs when
    /// the key is enabled.
    pub fn emit<F>(&self, key: &str, text: F)
    where
        F: FnOnce() -> String,
    {
        if self.is_enabled(key) {
            let text = text();
            tracing::trace!(target: "cmdspec::diag", key, "{}", text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn patterns_match_exact_prefix_and_all() {
        let diag = Diagnostics::parse("parser, at*");
        assert!(diag.is_enabled("parser"));
        assert!(diag.is_enabled("attrs"));
        assert!(!diag.is_enabled("final"));
        assert!(Diagnostics::new(["all"]).is_enabled("final"));
    }

    #[test]
    fn disabled_keys_skip_formatting() {
        let mut diag = Diagnostics::parse("parser.final");
        diag.disable("parser");
        let calls = Cell::new(0);
        diag.emit("parser", || {
            calls.set(calls.get() + 1);
            String::new()
        });
        assert_eq!(calls.get(), 0);
        diag.emit("final", || {
            calls.set(calls.get() + 1);
            String::new()
        });
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn default_enables_nothing() {
        assert!(!Diagnostics::default().is_enabled("parser"));
        assert!(Diagnostics::default().patterns().is_empty());
    }
}
