use crate::Value;

/// SQL parameter container.
#[derive(Clone, Debug, PartialEq)]
pub enum Params {
    /// Positional values mapped to `?` placeholders.
    Positional(Vec<Value>),
    /// Named values mapped to `:name` style placeholders.
    Named(Vec<(String, Value)>),
}

impl Params {
    /// Builds positional parameters.
    pub fn positional(values: impl Into<Vec<Value>>) -> Self {
        Self::Positional(values.into())
    }

    /// Builds named parameters.
    ///
    /// Names can be provided with or without prefix (`:`, `@`, `$`).
    pub fn named<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::Named(
            pairs
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Positional(values) => values.is_empty(),
            Self::Named(values) => values.is_empty(),
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::Positional(Vec::new())
    }
}

impl From<()> for Params {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Self::Positional(values)
    }
}

impl<const N: usize> From<[Value; N]> for Params {
    fn from(values: [Value; N]) -> Self {
        Self::Positional(values.into())
    }
}

impl From<Vec<(String, Value)>> for Params {
    fn from(values: Vec<(String, Value)>) -> Self {
        Self::Named(values)
    }
}

/// Single SQL statement with its parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    /// SQL text.
    pub sql: String,
    /// Statement parameters.
    pub params: Params,
}

impl Statement {
    /// Creates a statement without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self::with_params(sql, ())
    }

    pub fn with_params<P: Into<Params>>(sql: impl Into<String>, params: P) -> Self {
        Self {
            sql: sql.into(),
            params: params.into(),
        }
    }

    /// Creates a statement with positional parameters.
    pub fn positional<I, V>(sql: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::with_params(
            sql,
            Params::Positional(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Creates a statement with named parameters.
    pub fn named<I, K, V>(sql: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::with_params(
            sql,
            Params::named(pairs.into_iter().map(|(name, value)| (name, value.into()))),
        )
    }

    /// Returns `true` when the statement reads rows and belongs on the
    /// query endpoint.
    ///
    /// The check is lexical only: it looks at the first keyword after
    /// leading whitespace and comments.
    pub fn is_query(&self) -> bool {
        is_query_sql(&self.sql)
    }
}

const QUERY_KEYWORDS: [&str; 5] = ["SELECT", "PRAGMA", "EXPLAIN", "WITH", "VALUES"];

pub(crate) fn is_query_sql(sql: &str) -> bool {
    let keyword: String = skip_comments(sql)
        .chars()
        .take_while(|ch| ch.is_ascii_alphabetic())
        .collect();
    QUERY_KEYWORDS
        .iter()
        .any(|candidate| keyword.eq_ignore_ascii_case(candidate))
}

fn skip_comments(mut sql: &str) -> &str {
    loop {
        sql = sql.trim_start();
        if let Some(rest) = sql.strip_prefix("--") {
            sql = rest.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(rest) = sql.strip_prefix("/*") {
            sql = rest.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            return sql;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Params, Statement, Value};

    #[test]
    fn positional_from_array() {
        let params: Params = [Value::integer(1), Value::text("kit")].into();
        match params {
            Params::Positional(values) => assert_eq!(values.len(), 2),
            _ => panic!("expected positional"),
        }
    }

    #[test]
    fn named_builder() {
        let params = Params::named([("name", Value::text("kit"))]);
        match params {
            Params::Named(values) => {
                assert_eq!(values.len(), 1);
                assert_eq!(values[0].0, "name");
            }
            _ => panic!("expected named"),
        }
    }

    #[test]
    fn statement_constructors_convert_values() {
        let stmt = Statement::positional("SELECT ?, ?", [1i64, 2]);
        assert_eq!(
            stmt.params,
            Params::Positional(vec![Value::Integer(1), Value::Integer(2)])
        );

        let stmt = Statement::named("SELECT :a", [("a", "x")]);
        assert_eq!(
            stmt.params,
            Params::Named(vec![("a".to_owned(), Value::Text("x".to_owned()))])
        );
        assert!(Statement::new("SELECT 1").params.is_empty());
    }

    #[test]
    fn query_detection_is_lexical() {
        assert!(Statement::new("SELECT * FROM t").is_query());
        assert!(Statement::new("  \n select 1").is_query());
        assert!(Statement::new("pragma table_info(t)").is_query());
        assert!(Statement::new("-- lead\n/* block */ WITH x AS (SELECT 1) SELECT * FROM x").is_query());
        assert!(!Statement::new("INSERT INTO t VALUES (1)").is_query());
        assert!(!Statement::new("SELECTED").is_query());
        assert!(!Statement::new("").is_query());
        assert!(!Statement::new("-- only a comment").is_query());
    }
}
