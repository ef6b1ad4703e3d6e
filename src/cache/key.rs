//! Cache key generation.

use std::cmp::Ordering;
use std::fmt;

/// A query parameter value as it participates in a cache key.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Dropped from keys and query strings.
    Undefined,
}

impl ParamValue {
    pub fn is_defined(&self) -> bool {
        !matches!(self, ParamValue::Undefined)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Int(n) => write!(f, "{}", n),
            ParamValue::Float(x) if x.is_infinite() => {
                f.write_str(if *x > 0.0 { "Infinity" } else { "-Infinity" })
            }
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Undefined => Ok(()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}
impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}
impl From<&String> for ParamValue {
    fn from(s: &String) -> Self {
        ParamValue::Str(s.clone())
    }
}
impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Int(n)
    }
}
impl From<i32> for ParamValue {
    fn from(n: i32) -> Self {
        ParamValue::Int(n as i64)
    }
}
impl From<u32> for ParamValue {
    fn from(n: u32) -> Self {
        ParamValue::Int(n as i64)
    }
}
impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        ParamValue::Float(x)
    }
}
impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}
impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ParamValue::Undefined)
    }
}

/// Case-insensitive ordering with lower case ahead of upper case on ties,
/// falling back to byte order.
///
/// Non-letters compare by code point after lowercasing, so digits sort before `_`
/// (`a1` < `a_`), unlike locale collation. Keys only need to be stable, not pretty.
fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// `key=value` pairs for the defined params, sorted by key and joined with `&`.
fn canonical_query(params: &[(&str, ParamValue)]) -> String {
    let mut defined: Vec<&(&str, ParamValue)> =
        params.iter().filter(|(_, v)| v.is_defined()).collect();
    defined.sort_by(|(a, _), (b, _)| locale_cmp(a, b));
    defined
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Derive the cache key for `base` and its parameters.
///
/// The key does not depend on the order of `params`, and undefined values are skipped.
/// With no defined params the key is `base` itself. Repeated names are all kept, in the
/// order given, matching how they are sent upstream.
pub fn cache_key(base: &str, params: &[(&str, ParamValue)]) -> String {
    let query = canonical_query(params);
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, query)
    }
}

/// Builder form of [`cache_key`].
#[derive(Debug, Clone)]
pub struct CacheKeyBuilder {
    base: String,
    params: Vec<(String, ParamValue)>,
}

impl CacheKeyBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn build(&self) -> String {
        let params: Vec<(&str, ParamValue)> = self
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        cache_key(&self.base, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_are_sorted() {
        let key = cache_key(
            "https://x/data",
            &[("z", "2".into()), ("a", "1".into())],
        );
        assert_eq!(key, "https://x/data?a=1&z=2");
    }

    #[test]
    fn test_no_params_returns_base() {
        assert_eq!(cache_key("estados", &[]), "estados");
        assert_eq!(
            cache_key("estados", &[("uf", ParamValue::Undefined)]),
            "estados"
        );
    }

    #[test]
    fn test_order_independent_and_drops_undefined() {
        let a = cache_key(
            "sidra",
            &[
                ("tabela", 6579.into()),
                ("nivel", "N3".into()),
                ("periodo", Option::<&str>::None.into()),
                ("ultimo", true.into()),
            ],
        );
        let b = cache_key(
            "sidra",
            &[
                ("ultimo", true.into()),
                ("periodo", ParamValue::Undefined),
                ("nivel", "N3".into()),
                ("tabela", 6579.into()),
            ],
        );
        assert_eq!(a, b);
        assert_eq!(a, "sidra?nivel=N3&tabela=6579&ultimo=true");
    }

    #[test]
    fn test_digits_sort_before_underscore() {
        let key = cache_key("n", &[("a_", 1.into()), ("a1", 2.into()), ("a", 3.into())]);
        assert_eq!(key, "n?a=3&a1=2&a_=1");
    }

    #[test]
    fn test_repeated_names_keep_given_order() {
        let key = cache_key(
            "localidades",
            &[("id", 35.into()), ("uf", "SP".into()), ("id", 33.into())],
        );
        assert_eq!(key, "localidades?id=35&id=33&uf=SP");
        let swapped = cache_key(
            "localidades",
            &[("id", 33.into()), ("uf", "SP".into()), ("id", 35.into())],
        );
        assert_eq!(swapped, "localidades?id=33&id=35&uf=SP");
    }

    #[test]
    fn test_value_rendering() {
        let key = cache_key(
            "b",
            &[("f", 1.5.into()), ("g", 2.0.into()), ("h", false.into()), ("i", (-3).into())],
        );
        assert_eq!(key, "b?f=1.5&g=2&h=false&i=-3");
    }

    #[test]
    fn test_case_insensitive_ordering() {
        let key = cache_key("b", &[("Zeta", "1".into()), ("alpha", "2".into()), ("Beta", "3".into())]);
        assert_eq!(key, "b?alpha=2&Beta=3&Zeta=1");
    }

    #[test]
    fn test_builder_matches_function() {
        let built = CacheKeyBuilder::new("nomes/joao")
            .param("sexo", "M")
            .param("localidade", 33)
            .param("decada", Option::<i64>::None)
            .build();
        assert_eq!(built, "nomes/joao?localidade=33&sexo=M");
    }
}
