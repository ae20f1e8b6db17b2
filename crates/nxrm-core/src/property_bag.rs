//! Flat `{string: string}` property bags used by capabilities and tasks.
//!
//! Each bag type declares its recognised keys as a field table. Encoding
//! walks the table in declaration order and asks every field for its
//! string form (`None` elides the key). Decoding starts from the model's
//! `Default` and lets every field parse its own key, falling back to a
//! per-field default when the key is absent or unparseable. Keys outside
//! the table are ignored in both directions.

use indexmap::IndexMap;

/// One recognised key of a property bag.
pub struct PropertyField<M> {
    pub key: &'static str,
    /// Stringify the field; `None` means the key is not sent.
    pub read: fn(&M) -> Option<String>,
    /// Parse the raw value (absent when the server omitted the key).
    pub write: fn(&mut M, Option<&str>),
}

impl<M> std::fmt::Debug for PropertyField<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyField")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// A typed view over a property bag.
pub trait PropertyBag: Default + Sized {
    fn fields() -> Vec<PropertyField<Self>>;

    fn to_properties(&self) -> IndexMap<String, String> {
        encode(self, &Self::fields())
    }

    fn from_properties(bag: &IndexMap<String, String>) -> Self {
        decode(bag, &Self::fields())
    }
}

pub fn encode<M>(model: &M, fields: &[PropertyField<M>]) -> IndexMap<String, String> {
    fields
        .iter()
        .filter_map(|f| (f.read)(model).map(|v| (f.key.to_owned(), v)))
        .collect()
}

pub fn decode<M: Default>(bag: &IndexMap<String, String>, fields: &[PropertyField<M>]) -> M {
    let mut model = M::default();
    for field in fields {
        (field.write)(&mut model, bag.get(field.key).map(String::as_str));
    }
    model
}

// ── Value helpers ────────────────────────────────────────────────────

pub fn parse_bool(raw: Option<&str>, default: bool) -> bool {
    match raw.map(str::trim) {
        Some(s) if s.eq_ignore_ascii_case("true") => true,
        Some(s) if s.eq_ignore_ascii_case("false") => false,
        _ => default,
    }
}

pub fn parse_int(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

/// Absent stays absent; present (even empty) is kept verbatim.
pub fn parse_string(raw: Option<&str>) -> Option<String> {
    raw.map(str::to_owned)
}

/// Split a comma-separated list, trimming each token. Empty tokens the
/// server echoed are preserved; an absent key yields `None`.
pub fn split_list(raw: Option<&str>) -> Option<Vec<String>> {
    raw.map(|s| {
        if s.is_empty() {
            Vec::new()
        } else {
            s.split(',').map(|t| t.trim().to_owned()).collect()
        }
    })
}

pub fn join_list(items: &[String]) -> String {
    items.join(",")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Sample {
        enabled: bool,
        retain: i64,
        grace: i64,
        names: Option<Vec<String>>,
        label: Option<String>,
    }

    impl PropertyBag for Sample {
        fn fields() -> Vec<PropertyField<Self>> {
            vec![
                PropertyField {
                    key: "enabled",
                    read: |m| Some(m.enabled.to_string()),
                    write: |m, raw| m.enabled = parse_bool(raw, true),
                },
                PropertyField {
                    key: "retain",
                    read: |m| Some(m.retain.to_string()),
                    write: |m, raw| m.retain = parse_int(raw, 7),
                },
                PropertyField {
                    key: "grace",
                    read: |m| (m.grace != 0).then(|| m.grace.to_string()),
                    write: |m, raw| m.grace = parse_int(raw, 0),
                },
                PropertyField {
                    key: "names",
                    read: |m| m.names.as_deref().map(join_list),
                    write: |m, raw| m.names = split_list(raw),
                },
                PropertyField {
                    key: "label",
                    read: |m| m.label.clone(),
                    write: |m, raw| m.label = parse_string(raw),
                },
            ]
        }
    }

    #[test]
    fn encode_follows_declaration_order_and_elides() {
        let m = Sample {
            enabled: false,
            retain: 3,
            grace: 0,
            names: Some(vec!["a".into(), "b".into()]),
            label: Some(String::new()),
        };
        let bag = m.to_properties();
        let pairs: Vec<_> = bag.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(
            pairs,
            vec![("enabled", "false"), ("retain", "3"), ("names", "a,b"), ("label", "")]
        );
    }

    #[test]
    fn decode_applies_defaults_and_ignores_unknown_keys() {
        let mut bag = IndexMap::new();
        bag.insert("retain".to_owned(), "not-a-number".to_owned());
        bag.insert("names".to_owned(), "x, y".to_owned());
        bag.insert("mystery".to_owned(), "1".to_owned());
        let m = Sample::from_properties(&bag);
        assert_eq!(
            m,
            Sample {
                enabled: true,
                retain: 7,
                grace: 0,
                names: Some(vec!["x".into(), "y".into()]),
                label: None,
            }
        );
    }

    #[test]
    fn split_list_keeps_echoed_empty_tokens() {
        assert_eq!(
            split_list(Some("a,,b")),
            Some(vec!["a".to_owned(), String::new(), "b".to_owned()])
        );
        assert_eq!(split_list(Some("")), Some(vec![]));
        assert_eq!(split_list(None), None);
    }

    #[test]
    fn bool_parsing_is_lenient_on_case() {
        assert!(parse_bool(Some("TRUE"), false));
        assert!(!parse_bool(Some("false"), true));
        assert!(parse_bool(Some("yes"), true));
    }
}
