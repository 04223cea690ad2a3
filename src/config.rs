//! Connection configuration from URLs and the environment.
//!
//! Connection strings look like
//! `rqlite:http://localhost:4001?level=none&freshnesssec=1&user=admin&password=pw`.
//! The `rqlite:` prefix is optional.

use std::{fmt, str::FromStr};

use reqwest::Url;

use crate::{ClientOptions, RqliteClient, RqliteError};

const URL_PREFIX: &str = "rqlite:";

/// Base URL, credentials and request options for one client.
#[derive(Clone, PartialEq)]
pub struct ConnectionConfig {
    pub base_url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub options: ClientOptions,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("options", &self.options)
            .finish()
    }
}

impl ConnectionConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user: None,
            password: None,
            options: ClientOptions::default(),
        }
    }

    /// Parses a connection string.
    ///
    /// Query values are percent-decoded and keys are matched
    /// case-insensitively. Unknown keys are ignored.
    pub fn parse(url: &str) -> Result<Self, RqliteError> {
        let url = url.trim();
        let url = url.strip_prefix(URL_PREFIX).unwrap_or(url);
        let mut parsed = Url::parse(url)
            .map_err(|err| RqliteError::Usage(format!("invalid rqlite URL '{url}': {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RqliteError::Usage(format!(
                "unsupported scheme '{}' in rqlite URL '{url}'",
                parsed.scheme()
            )));
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(RqliteError::Usage(format!("missing host in rqlite URL '{url}'")));
        }

        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(key, value)| (key.to_ascii_lowercase(), value.into_owned()))
            .collect();
        parsed.set_query(None);
        parsed.set_fragment(None);

        let mut config = Self::new(parsed.as_str().trim_end_matches('/'));
        for (key, value) in &pairs {
            config.apply(key, value)?;
        }
        config.options.validate()?;
        Ok(config)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), RqliteError> {
        let options = &mut self.options;
        match key {
            "user" => self.user = Some(value.to_owned()),
            "password" => self.password = Some(value.to_owned()),
            "timeoutsec" => options.timeout_sec = parse_value(key, value)?,
            "queue" => options.queue = parse_value(key, value)?,
            "wait" => options.wait = parse_value(key, value)?,
            "level" => options.level = value.parse()?,
            "linearizabletimeoutsec" => {
                options.linearizable_timeout_sec = parse_value(key, value)?
            }
            "freshnesssec" => options.freshness_sec = parse_value(key, value)?,
            "freshnessstrict" => options.freshness_strict = parse_value(key, value)?,
            _ => {}
        }
        Ok(())
    }

    /// Reads `RQLITE_URL` and the optional `RQLITE_USER` / `RQLITE_PASSWORD`.
    ///
    /// Setting only one of the two credential variables still enables Basic
    /// auth, with the other part empty.
    pub fn from_env() -> Result<Self, RqliteError> {
        let url = std::env::var("RQLITE_URL").map_err(|_| {
            RqliteError::Usage("missing RQLITE_URL environment variable".to_owned())
        })?;
        if url.trim().is_empty() {
            return Err(RqliteError::Usage(
                "RQLITE_URL is set but empty".to_owned(),
            ));
        }
        let mut config = Self::parse(&url)?;
        if let Ok(user) = std::env::var("RQLITE_USER") {
            config.user = Some(user);
        }
        if let Ok(password) = std::env::var("RQLITE_PASSWORD") {
            config.password = Some(password);
        }
        Ok(config)
    }

    /// Builds a client. Basic auth is attached when a user or a password is
    /// present; a missing part is sent as an empty string.
    pub fn into_client(self) -> RqliteClient {
        let client = RqliteClient::new(self.base_url).with_options(self.options);
        if self.user.is_none() && self.password.is_none() {
            return client;
        }
        client.with_basic_auth(
            self.user.unwrap_or_default(),
            self.password.unwrap_or_default(),
        )
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, RqliteError> {
    value
        .trim()
        .parse()
        .map_err(|_| RqliteError::Usage(format!("invalid value '{value}' for '{key}'")))
}

#[cfg(test)]
mod tests {
    use crate::{ConnectionConfig, ConsistencyLevel, RqliteError};

    #[test]
    fn parses_base_url_and_options() {
        let config = ConnectionConfig::parse(
            "rqlite:http://localhost:4001/?Level=none&freshnessSec=2&freshnessstrict=true&timeoutsec=9&user=admin&password=pw&bogus=1",
        )
        .expect("must parse");

        assert_eq!(config.base_url, "http://localhost:4001");
        assert_eq!(config.user.as_deref(), Some("admin"));
        assert_eq!(config.password.as_deref(), Some("pw"));
        assert_eq!(config.options.level, ConsistencyLevel::None);
        assert_eq!(config.options.freshness_sec, 2);
        assert!(config.options.freshness_strict);
        assert_eq!(config.options.timeout_sec, 9);
    }

    #[test]
    fn prefix_is_optional() {
        let config = ConnectionConfig::parse("https://db.example:4001").expect("must parse");
        assert_eq!(config.base_url, "https://db.example:4001");
        assert_eq!(config.user, None);
    }

    #[test]
    fn rejects_non_http_url() {
        let err = ConnectionConfig::parse("rqlite:localhost:4001").expect_err("must fail");
        assert!(matches!(err, RqliteError::Usage(_)));
    }

    #[test]
    fn rejects_malformed_value() {
        let err = ConnectionConfig::parse("http://h:4001?queue=maybe").expect_err("must fail");
        assert!(matches!(err, RqliteError::Usage(_)));
    }

    #[test]
    fn rejects_invalid_combination() {
        let err = ConnectionConfig::parse("http://h:4001?wait=true").expect_err("must fail");
        assert!(matches!(err, RqliteError::Usage(_)));
    }

    #[test]
    fn query_values_are_percent_decoded() {
        let config =
            ConnectionConfig::parse("rqlite:http://h:4001?user=admin&password=p%40ss%26word%3D1")
                .expect("must parse");
        assert_eq!(config.base_url, "http://h:4001");
        assert_eq!(config.user.as_deref(), Some("admin"));
        assert_eq!(config.password.as_deref(), Some("p@ss&word=1"));
    }

    #[test]
    fn keeps_base_path_without_query() {
        let config = ConnectionConfig::parse("https://proxy.example/rqlite/?level=linearizable")
            .expect("must parse");
        assert_eq!(config.base_url, "https://proxy.example/rqlite");
        assert_eq!(config.options.level, ConsistencyLevel::Linearizable);
    }

    #[test]
    fn rejects_invalid_host() {
        let err = ConnectionConfig::parse("http://exa mple:4001").expect_err("must fail");
        assert!(matches!(err, RqliteError::Usage(_)));
    }

    #[test]
    fn rejects_unsupported_scheme() {
        let err = ConnectionConfig::parse("rqlite:ftp://h:4001").expect_err("must fail");
        assert!(matches!(err, RqliteError::Usage(_)));
    }

    #[test]
    fn user_without_password_still_enables_basic_auth() {
        let mut config = ConnectionConfig::new("http://h:4001");
        config.user = Some("admin".to_owned());
        let debug = format!("{:?}", config.into_client());
        assert!(debug.contains("username: \"admin\""));

        let debug = format!("{:?}", ConnectionConfig::new("http://h:4001").into_client());
        assert!(debug.contains("auth: None"));
    }

    #[test]
    fn debug_redacts_password() {
        let mut config = ConnectionConfig::new("http://h:4001");
        config.password = Some("hunter2".to_owned());
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
    }
}
