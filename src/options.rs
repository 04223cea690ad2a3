use std::{fmt, str::FromStr, time::Duration};

use crate::RqliteError;

/// Read consistency level requested from the cluster.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ConsistencyLevel {
    /// Read from the local node without a leader check.
    None,
    /// Leader checks its own leadership before serving the read.
    #[default]
    Weak,
    /// Leader confirms leadership with a quorum before serving the read.
    Linearizable,
}

impl ConsistencyLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Weak => "weak",
            Self::Linearizable => "linearizable",
        }
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsistencyLevel {
    type Err = RqliteError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "weak" => Ok(Self::Weak),
            "linearizable" => Ok(Self::Linearizable),
            other => Err(RqliteError::Usage(format!(
                "unknown consistency level '{other}'"
            ))),
        }
    }
}

/// Per-client request options.
///
/// Rendered into URL query parameters on every execute and query call.
/// Fields left at their default value are omitted from the URL.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientOptions {
    /// Request timeout in seconds. `0` uses the server default, a negative
    /// value disables the client-side timeout.
    pub timeout_sec: i64,
    /// Read consistency level.
    pub level: ConsistencyLevel,
    /// How long a linearizable read waits for the quorum check.
    pub linearizable_timeout_sec: i64,
    /// Maximum staleness accepted by a `none` level read.
    pub freshness_sec: i64,
    /// Reject reads whose staleness cannot be determined.
    pub freshness_strict: bool,
    /// Queue writes on the server and return before they are applied.
    pub queue: bool,
    /// Wait for queued writes to be applied before returning.
    pub wait: bool,
}

impl ClientOptions {
    /// Renders the URL query string, including the leading `?`.
    ///
    /// Returns an empty string when no parameter differs from its default.
    pub fn query_string(&self, transactional: bool) -> String {
        let mut params: Vec<String> = Vec::new();
        if transactional {
            params.push("tx=true".to_owned());
        }
        if self.timeout_sec > 0 {
            params.push(format!("timeout={}s", self.timeout_sec));
        }
        if self.level != ConsistencyLevel::default() {
            params.push(format!("level={}", self.level));
        }
        if self.linearizable_timeout_sec > 0 {
            params.push(format!(
                "linearizable_timeout={}s",
                self.linearizable_timeout_sec
            ));
        }
        if self.freshness_sec > 0 {
            params.push(format!("freshness={}s", self.freshness_sec));
        }
        if self.freshness_strict {
            params.push("freshness_strict=true".to_owned());
        }
        if self.queue {
            params.push("queue=true".to_owned());
        }
        if self.wait {
            params.push("wait=true".to_owned());
        }

        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }

    /// Client-side timeout applied to each HTTP request, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        u64::try_from(self.timeout_sec)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Rejects option combinations the server cannot honor.
    pub fn validate(&self) -> Result<(), RqliteError> {
        if self.linearizable_timeout_sec < 0 {
            return Err(RqliteError::Usage(format!(
                "invalid linearizable timeout [{}]",
                self.linearizable_timeout_sec
            )));
        }
        if self.freshness_sec < 0 {
            return Err(RqliteError::Usage(format!(
                "invalid freshness [{}]",
                self.freshness_sec
            )));
        }
        if self.freshness_strict && self.freshness_sec == 0 {
            return Err(RqliteError::Usage(
                "freshness_strict requires a positive freshness".to_owned(),
            ));
        }
        if self.wait && !self.queue {
            return Err(RqliteError::Usage("wait requires queue".to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{ClientOptions, ConsistencyLevel, RqliteError};

    #[test]
    fn defaults_render_nothing() {
        assert_eq!(ClientOptions::default().query_string(false), "");
    }

    #[test]
    fn transactional_flag_only_when_requested() {
        let opts = ClientOptions::default();
        assert_eq!(opts.query_string(true), "?tx=true");
    }

    #[test]
    fn renders_all_non_default_fields_in_fixed_order() {
        let opts = ClientOptions {
            timeout_sec: 5,
            level: ConsistencyLevel::None,
            linearizable_timeout_sec: 2,
            freshness_sec: 1,
            freshness_strict: true,
            queue: true,
            wait: true,
        };
        assert_eq!(
            opts.query_string(true),
            "?tx=true&timeout=5s&level=none&linearizable_timeout=2s&freshness=1s&freshness_strict=true&queue=true&wait=true"
        );
    }

    #[test]
    fn freshness_is_emitted_regardless_of_level() {
        let opts = ClientOptions {
            level: ConsistencyLevel::Linearizable,
            freshness_sec: 3,
            ..ClientOptions::default()
        };
        assert_eq!(
            opts.query_string(false),
            "?level=linearizable&freshness=3s"
        );
    }

    #[test]
    fn disabled_timeout_is_not_rendered() {
        let opts = ClientOptions {
            timeout_sec: -1,
            ..ClientOptions::default()
        };
        assert_eq!(opts.query_string(false), "");
        assert_eq!(opts.request_timeout(), None);
    }

    #[test]
    fn positive_timeout_becomes_request_timeout() {
        let opts = ClientOptions {
            timeout_sec: 7,
            ..ClientOptions::default()
        };
        assert_eq!(opts.request_timeout(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn level_parses_case_insensitively() {
        assert_eq!(
            "Linearizable".parse::<ConsistencyLevel>().expect("must parse"),
            ConsistencyLevel::Linearizable
        );
        assert!(matches!(
            "strongest".parse::<ConsistencyLevel>(),
            Err(RqliteError::Usage(_))
        ));
    }

    #[test]
    fn validate_rejects_unsupported_combinations() {
        let strict_without_freshness = ClientOptions {
            freshness_strict: true,
            ..ClientOptions::default()
        };
        assert!(matches!(
            strict_without_freshness.validate(),
            Err(RqliteError::Usage(_))
        ));

        let wait_without_queue = ClientOptions {
            wait: true,
            ..ClientOptions::default()
        };
        assert!(matches!(
            wait_without_queue.validate(),
            Err(RqliteError::Usage(_))
        ));

        assert!(ClientOptions::default().validate().is_ok());
    }
}
