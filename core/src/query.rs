//! Query-string construction.
//!
//! Keys and values are escaped the way browsers' `encodeURIComponent` does, so
//! URLs built here match what the web client sends byte for byte.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unescaped by `encodeURIComponent`, removed from the escape set.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A primitive query value. `Absent` and empty text are dropped from the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Text(String),
    Int(i64),
    Bool(bool),
    Absent,
}

impl QueryValue {
    fn render(&self) -> Option<String> {
        match self {
            QueryValue::Text(s) if s.is_empty() => None,
            QueryValue::Text(s) => Some(s.clone()),
            QueryValue::Int(n) => Some(n.to_string()),
            QueryValue::Bool(b) => Some(b.to_string()),
            QueryValue::Absent => None,
        }
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Text(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::Text(v)
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Bool(v)
    }
}

macro_rules! int_query_value {
    ($($t:ty),*) => {
        $(impl From<$t> for QueryValue {
            fn from(v: $t) -> Self {
                QueryValue::Int(i64::from(v))
            }
        })*
    };
}

int_query_value!(i32, i64, u8, u16, u32);

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(QueryValue::Absent, Into::into)
    }
}

/// Ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, QueryValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, key: &str, value: impl Into<QueryValue>) -> Self {
        self.pairs.push((key.to_string(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, QueryValue)] {
        &self.pairs
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Append `params` to `url` as a query string.
///
/// Returns `url` unchanged when there are no parameters or every value is
/// absent or empty.
pub fn build_url(url: &str, params: &QueryParams) -> String {
    if params.is_empty() {
        return url.to_string();
    }

    let query = params
        .pairs
        .iter()
        .filter_map(|(key, value)| {
            value.render().map(|v| {
                format!(
                    "{}={}",
                    utf8_percent_encode(key, URI_COMPONENT),
                    utf8_percent_encode(&v, URI_COMPONENT)
                )
            })
        })
        .collect::<Vec<_>>()
        .join("&");

    if query.is_empty() {
        url.to_string()
    } else {
        format!("{url}?{query}")
    }
}
