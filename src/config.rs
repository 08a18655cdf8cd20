/// Calls deeper than this fail with `maximum call depth exceeded`.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 200;

pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    pub max_call_depth: usize,
    /// `tracing_subscriber::EnvFilter` directives, e.g. `uwsc=debug`.
    pub log_filter: String,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl InterpreterConfig {
    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn with_log_filter(mut self, log_filter: impl Into<String>) -> Self {
        self.log_filter = log_filter.into();
        self
    }

    /// Maps repeated `-v` flags to a filter.
    pub fn with_verbosity(self, verbosity: u8) -> Self {
        let filter = match verbosity {
            0 => DEFAULT_LOG_FILTER,
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        self.with_log_filter(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        let config = InterpreterConfig::default();
        assert_eq!(config.log_filter, "warn");
        assert_eq!(config.clone().with_verbosity(2).log_filter, "debug");
        assert_eq!(config.with_verbosity(9).log_filter, "trace");
    }
}
