// State merging driven by the schema.
//
// The server never echoes write-only attributes and knows nothing about
// `last_updated`. After a read the fresh value is patched with the prior
// state's copy of those attributes so the next plan shows no diff.

use serde_json::Value;

use crate::schema::{Attribute, AttributeType, LAST_UPDATED, Schema};

/// Copy write-only attributes and `last_updated` from `prior` into `fresh`.
///
/// Nested records are followed only when both sides have them; a record
/// the server dropped stays dropped.
pub fn preserve_unreadable(schema: &Schema, prior: &Value, fresh: &mut Value) {
    preserve_write_only(&schema.attributes, prior, fresh);
    if let (Some(ts), Some(obj)) = (prior.get(LAST_UPDATED), fresh.as_object_mut()) {
        if schema.get(LAST_UPDATED).is_some() {
            obj.insert(LAST_UPDATED.to_owned(), ts.clone());
        }
    }
}

/// Fill write-only attributes the API response could not carry from the
/// plan that produced it.
pub fn map_missing_api_fields_from_plan(schema: &Schema, plan: &Value, state: &mut Value) {
    preserve_write_only(&schema.attributes, plan, state);
}

fn preserve_write_only(attributes: &[Attribute], prior: &Value, fresh: &mut Value) {
    let (Some(prior), Some(fresh)) = (prior.as_object(), fresh.as_object_mut()) else {
        return;
    };
    for attr in attributes {
        let Some(old) = prior.get(attr.name) else {
            continue;
        };
        if attr.write_only {
            if !old.is_null() {
                fresh.insert(attr.name.to_owned(), old.clone());
            }
            continue;
        }
        if let AttributeType::Object { attributes } = &attr.ty {
            if let Some(slot) = fresh.get_mut(attr.name) {
                preserve_write_only(attributes, old, slot);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn schema() -> Schema {
        Schema::new("test")
            .attribute(Attribute::string("name").required())
            .attribute(Attribute::string("password").write_only())
            .attribute(Attribute::object(
                "apt_signing",
                vec![
                    Attribute::string("keypair").write_only(),
                    Attribute::string("passphrase").write_only(),
                ],
            ))
            .with_last_updated()
    }

    #[test]
    fn read_keeps_secrets_and_timestamp() {
        let prior = json!({
            "name": "a",
            "password": "s3cret",
            "apt_signing": { "keypair": "KEY", "passphrase": "pp" },
            "last_updated": "Monday, 01-Jan-24 00:00:00 UTC"
        });
        let mut fresh = json!({
            "name": "a",
            "password": null,
            "apt_signing": { "keypair": null, "passphrase": null },
            "last_updated": null
        });
        preserve_unreadable(&schema(), &prior, &mut fresh);
        assert_eq!(fresh, prior);
    }

    #[test]
    fn dropped_nested_record_stays_dropped() {
        let prior = json!({ "name": "a", "apt_signing": { "passphrase": "pp" } });
        let mut fresh = json!({ "name": "a", "apt_signing": null });
        preserve_unreadable(&schema(), &prior, &mut fresh);
        assert_eq!(fresh["apt_signing"], Value::Null);
    }

    #[test]
    fn import_has_nothing_to_preserve() {
        let mut fresh = json!({ "name": "a", "password": null });
        preserve_unreadable(&schema(), &json!({ "name": "a" }), &mut fresh);
        assert_eq!(fresh["password"], Value::Null);
    }
}
