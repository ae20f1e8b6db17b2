//! Declarative attribute schemas.
//!
//! Every resource and data source describes its attributes with this
//! vocabulary. The same description drives plan-time validation, default
//! filling, pruning of unknown keys, write-only preservation on reads and
//! the JSON schema export the host consumes.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::diagnostics::Diagnostic;
use crate::error::ErrorCategory;

/// Name of the timestamp every mutable resource records on create/update.
pub const LAST_UPDATED: &str = "last_updated";

// ── Types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    Int64,
    Float64,
    /// Order-significant sequence.
    List { element: Box<AttributeType> },
    /// Order-insensitive collection without duplicates.
    Set { element: Box<AttributeType> },
    /// Single nested record.
    Object { attributes: Vec<Attribute> },
}

impl AttributeType {
    fn describe(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int64 => "number",
            Self::Float64 => "float",
            Self::List { .. } => "list",
            Self::Set { .. } => "set",
            Self::Object { .. } => "object",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Bool => value.is_boolean(),
            Self::Int64 => value.is_i64() || value.is_u64(),
            Self::Float64 => value.is_number(),
            Self::List { .. } | Self::Set { .. } => value.is_array(),
            Self::Object { .. } => value.is_object(),
        }
    }
}

/// Closed-set and range checks enforced at plan time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    OneOf { values: Vec<&'static str> },
    /// Every element of a list or set must be one of `values`.
    EachOneOf { values: Vec<&'static str> },
    Range { min: i64, max: i64 },
    AtLeast { min: i64 },
    LengthAtLeast { min: usize },
    SizeAtLeast { min: usize },
}

impl Validator {
    fn check(&self, value: &Value) -> Option<String> {
        match self {
            Self::OneOf { values } => {
                let s = value.as_str()?;
                (!values.iter().any(|v| *v == s))
                    .then(|| format!("value {s:?} must be one of {}", values.join(", ")))
            }
            Self::EachOneOf { values } => value
                .as_array()?
                .iter()
                .filter_map(Value::as_str)
                .find(|s| !values.iter().any(|v| v == s))
                .map(|s| format!("element {s:?} must be one of {}", values.join(", "))),
            Self::Range { min, max } => {
                let n = value.as_i64()?;
                (n < *min || n > *max).then(|| format!("value {n} must be between {min} and {max}"))
            }
            Self::AtLeast { min } => {
                let n = value.as_i64()?;
                (n < *min).then(|| format!("value {n} must be at least {min}"))
            }
            Self::LengthAtLeast { min } => {
                let s = value.as_str()?;
                (s.chars().count() < *min)
                    .then(|| format!("string length must be at least {min}"))
            }
            Self::SizeAtLeast { min } => {
                let items = value.as_array()?;
                (items.len() < *min).then(|| format!("must contain at least {min} element(s)"))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanModifier {
    /// Changing the value destroys and recreates the resource.
    RequiresReplace,
    /// Keep the prior state value while the new one is unknown.
    UseStateForUnknown,
}

// ── Attribute ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: AttributeType,
    #[serde(skip_serializing_if = "is_blank")]
    pub description: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub computed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    /// Sent on mutations, never echoed by the server.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub write_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plan_modifiers: Vec<PlanModifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<&'static str>,
}

impl Attribute {
    pub fn new(name: &'static str, ty: AttributeType) -> Self {
        Self {
            name,
            ty,
            description: "",
            required: false,
            optional: true,
            computed: false,
            sensitive: false,
            write_only: false,
            default: None,
            validators: Vec::new(),
            plan_modifiers: Vec::new(),
            deprecation: None,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn bool(name: &'static str) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    pub fn int64(name: &'static str) -> Self {
        Self::new(name, AttributeType::Int64)
    }

    pub fn float64(name: &'static str) -> Self {
        Self::new(name, AttributeType::Float64)
    }

    pub fn string_list(name: &'static str) -> Self {
        Self::new(
            name,
            AttributeType::List {
                element: Box::new(AttributeType::String),
            },
        )
    }

    pub fn string_set(name: &'static str) -> Self {
        Self::new(
            name,
            AttributeType::Set {
                element: Box::new(AttributeType::String),
            },
        )
    }

    pub fn int_set(name: &'static str) -> Self {
        Self::new(
            name,
            AttributeType::Set {
                element: Box::new(AttributeType::Int64),
            },
        )
    }

    pub fn object(name: &'static str, attributes: Vec<Attribute>) -> Self {
        Self::new(name, AttributeType::Object { attributes })
    }

    pub fn object_list(name: &'static str, attributes: Vec<Attribute>) -> Self {
        Self::new(
            name,
            AttributeType::List {
                element: Box::new(AttributeType::Object { attributes }),
            },
        )
    }

    // ── Builders ─────────────────────────────────────────────────────

    pub fn description(mut self, text: &'static str) -> Self {
        self.description = text;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self.computed = false;
        self
    }

    /// Server-populated, never user-set.
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self.optional = false;
        self.required = false;
        self
    }

    /// User-settable, server fills it in when omitted.
    pub fn optional_computed(mut self) -> Self {
        self.optional = true;
        self.computed = true;
        self.required = false;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Sensitive and never read back from the server.
    pub fn write_only(mut self) -> Self {
        self.sensitive = true;
        self.write_only = true;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.optional_computed()
    }

    pub fn one_of(mut self, values: &[&'static str]) -> Self {
        self.validators.push(Validator::OneOf {
            values: values.to_vec(),
        });
        self
    }

    pub fn each_one_of(mut self, values: &[&'static str]) -> Self {
        self.validators.push(Validator::EachOneOf {
            values: values.to_vec(),
        });
        self
    }

    pub fn range(mut self, min: i64, max: i64) -> Self {
        self.validators.push(Validator::Range { min, max });
        self
    }

    pub fn at_least(mut self, min: i64) -> Self {
        self.validators.push(Validator::AtLeast { min });
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.validators.push(Validator::LengthAtLeast { min });
        self
    }

    pub fn min_size(mut self, min: usize) -> Self {
        self.validators.push(Validator::SizeAtLeast { min });
        self
    }

    pub fn requires_replace(mut self) -> Self {
        self.plan_modifiers.push(PlanModifier::RequiresReplace);
        self
    }

    pub fn use_state_for_unknown(mut self) -> Self {
        self.plan_modifiers.push(PlanModifier::UseStateForUnknown);
        self
    }

    pub fn deprecated(mut self, message: &'static str) -> Self {
        self.deprecation = Some(message);
        self
    }

    /// Nested attributes when this is an object attribute.
    pub fn children(&self) -> Option<&[Attribute]> {
        match &self.ty {
            AttributeType::Object { attributes } => Some(attributes),
            _ => None,
        }
    }
}

/// Read-only view of resource attributes for data sources: everything
/// computed, no defaults, validators or plan modifiers. Write-only
/// attributes are dropped since the server never returns them.
pub fn computed_view(attributes: Vec<Attribute>) -> Vec<Attribute> {
    attributes
        .into_iter()
        .filter(|a| !a.write_only && a.name != LAST_UPDATED)
        .map(|mut a| {
            a.ty = match a.ty {
                AttributeType::Object { attributes } => AttributeType::Object {
                    attributes: computed_view(attributes),
                },
                AttributeType::List { element } => AttributeType::List {
                    element: Box::new(computed_element(*element)),
                },
                AttributeType::Set { element } => AttributeType::Set {
                    element: Box::new(computed_element(*element)),
                },
                other => other,
            };
            a.default = None;
            a.validators.clear();
            a.plan_modifiers.clear();
            a.computed()
        })
        .collect()
}

fn computed_element(element: AttributeType) -> AttributeType {
    match element {
        AttributeType::Object { attributes } => AttributeType::Object {
            attributes: computed_view(attributes),
        },
        other => other,
    }
}

// ── Schema ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub version: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub attributes: Vec<Attribute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<String>,
}

impl Schema {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            version: 0,
            description: description.into(),
            attributes: Vec::new(),
            deprecation: None,
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn attributes(mut self, attributes: impl IntoIterator<Item = Attribute>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn deprecated(mut self, message: impl Into<String>) -> Self {
        self.deprecation = Some(message.into());
        self
    }

    /// Append the computed `last_updated` timestamp.
    pub fn with_last_updated(self) -> Self {
        self.attribute(
            Attribute::string(LAST_UPDATED)
                .computed()
                .description("Timestamp of the last create or update performed by this provider."),
        )
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation.is_some()
    }

    /// Fill absent or null attributes that declare a default.
    pub fn apply_defaults(&self, value: &mut Value) {
        apply_defaults(&self.attributes, value);
    }

    /// Drop keys the schema does not declare.
    pub fn retain_known(&self, value: &mut Value) {
        retain_known(&self.attributes, value);
    }

    /// Check a plan against required attributes, types and validators.
    pub fn validate(&self, value: &Value) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        match value.as_object() {
            Some(obj) => validate_object(&self.attributes, obj, "", true, &mut out),
            None => out.push(Diagnostic::error(
                "Invalid configuration",
                "expected an object of attributes",
            )),
        }
        out.into_iter()
            .map(|d| d.with_category(ErrorCategory::Validation))
            .collect()
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_blank(s: &&str) -> bool {
    s.is_empty()
}

fn path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}

fn apply_defaults(attributes: &[Attribute], value: &mut Value) {
    let Some(obj) = value.as_object_mut() else {
        return;
    };
    for attr in attributes {
        if let Some(default) = &attr.default {
            let slot = obj.entry(attr.name).or_insert(Value::Null);
            if slot.is_null() {
                *slot = default.clone();
            }
        }
        let Some(slot) = obj.get_mut(attr.name) else {
            continue;
        };
        match &attr.ty {
            AttributeType::Object { attributes } => apply_defaults(attributes, slot),
            AttributeType::List { element } | AttributeType::Set { element } => {
                if let (AttributeType::Object { attributes }, Some(items)) =
                    (element.as_ref(), slot.as_array_mut())
                {
                    for item in items {
                        apply_defaults(attributes, item);
                    }
                }
            }
            _ => {}
        }
    }
}

fn retain_known(attributes: &[Attribute], value: &mut Value) {
    let Some(obj) = value.as_object_mut() else {
        return;
    };
    obj.retain(|k, _| attributes.iter().any(|a| a.name == k));
    for attr in attributes {
        let Some(slot) = obj.get_mut(attr.name) else {
            continue;
        };
        match &attr.ty {
            AttributeType::Object { attributes } => retain_known(attributes, slot),
            AttributeType::List { element } | AttributeType::Set { element } => {
                if let (AttributeType::Object { attributes }, Some(items)) =
                    (element.as_ref(), slot.as_array_mut())
                {
                    for item in items {
                        retain_known(attributes, item);
                    }
                }
            }
            _ => {}
        }
    }
}

fn validate_object(
    attributes: &[Attribute],
    obj: &Map<String, Value>,
    prefix: &str,
    top_level: bool,
    out: &mut Vec<Diagnostic>,
) {
    for key in obj.keys() {
        if !attributes.iter().any(|a| a.name == key) {
            // The host may echo bookkeeping keys back; only nested records are strict.
            if !top_level || key != "id" {
                out.push(
                    Diagnostic::error(
                        "Unsupported argument",
                        format!("an argument named {key:?} is not expected here"),
                    )
                    .with_attribute(path(prefix, key)),
                );
            }
        }
    }

    for attr in attributes {
        let here = path(prefix, attr.name);
        let value = obj.get(attr.name).unwrap_or(&Value::Null);
        if value.is_null() {
            if attr.required {
                out.push(
                    Diagnostic::error(
                        "Missing required argument",
                        format!("the argument {here:?} is required, but no definition was found"),
                    )
                    .with_attribute(here),
                );
            }
            continue;
        }
        validate_value(attr, &attr.ty, value, &here, out);
    }
}

fn validate_value(
    attr: &Attribute,
    ty: &AttributeType,
    value: &Value,
    here: &str,
    out: &mut Vec<Diagnostic>,
) {
    if !ty.accepts(value) {
        out.push(
            Diagnostic::error(
                "Incorrect attribute value type",
                format!("{here}: expected {}", ty.describe()),
            )
            .with_attribute(here),
        );
        return;
    }

    for validator in &attr.validators {
        if let Some(message) = validator.check(value) {
            out.push(
                Diagnostic::error("Invalid attribute value", format!("{here}: {message}"))
                    .with_attribute(here),
            );
        }
    }

    match ty {
        AttributeType::Object { attributes } => {
            if let Some(obj) = value.as_object() {
                validate_object(attributes, obj, here, false, out);
            }
        }
        AttributeType::List { element } | AttributeType::Set { element } => {
            let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
            if matches!(ty, AttributeType::Set { .. }) {
                for (i, item) in items.iter().enumerate() {
                    if items[..i].contains(item) {
                        out.push(
                            Diagnostic::error(
                                "Duplicate set element",
                                format!("{here}: {item} appears more than once"),
                            )
                            .with_attribute(here),
                        );
                    }
                }
            }
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{here}[{i}]");
                if !element.accepts(item) {
                    out.push(
                        Diagnostic::error(
                            "Incorrect attribute value type",
                            format!("{item_path}: expected {}", element.describe()),
                        )
                        .with_attribute(item_path),
                    );
                } else if let AttributeType::Object { attributes } = element.as_ref() {
                    if let Some(obj) = item.as_object() {
                        validate_object(attributes, obj, &item_path, false, out);
                    }
                }
            }
        }
        _ => {}
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
            .attribute(Attribute::bool("online").default(true))
            .attribute(
                Attribute::object(
                    "storage",
                    vec![
                        Attribute::string("blob_store_name").required(),
                        Attribute::string("write_policy")
                            .one_of(&["ALLOW", "ALLOW_ONCE", "DENY"])
                            .default("ALLOW_ONCE"),
                    ],
                )
                .required(),
            )
            .attribute(Attribute::string_set("actions").each_one_of(&["READ", "ADD"]))
            .attribute(Attribute::int64("port").range(1, 65535))
            .with_last_updated()
    }

    #[test]
    fn defaults_fill_nested_records() {
        let mut plan = json!({ "name": "r", "storage": { "blob_store_name": "default" } });
        schema().apply_defaults(&mut plan);
        assert_eq!(plan["online"], json!(true));
        assert_eq!(plan["storage"]["write_policy"], json!("ALLOW_ONCE"));
        assert_eq!(plan["actions"], Value::Null);
    }

    #[test]
    fn missing_required_nested_attribute() {
        let diags = schema().validate(&json!({ "name": "r", "storage": {} }));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].attribute.as_deref(), Some("storage.blob_store_name"));
    }

    #[test]
    fn closed_sets_are_enforced() {
        let diags = schema().validate(&json!({
            "name": "r",
            "storage": { "blob_store_name": "default", "write_policy": "SOMETIMES" },
            "actions": ["READ", "RUN"],
            "port": 70000
        }));
        let paths: Vec<_> = diags.iter().filter_map(|d| d.attribute.as_deref()).collect();
        assert_eq!(paths, vec!["storage.write_policy", "actions", "port"]);
    }

    #[test]
    fn set_rejects_duplicates() {
        let diags = schema().validate(&json!({
            "name": "r",
            "storage": { "blob_store_name": "default" },
            "actions": ["READ", "READ"]
        }));
        assert_eq!(diags[0].summary, "Duplicate set element");
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let diags = schema().validate(&json!({
            "name": "r",
            "storage": { "blob_store_name": "default" },
            "colour": "blue"
        }));
        assert_eq!(diags[0].summary, "Unsupported argument");
    }

    #[test]
    fn retain_known_prunes_extra_keys() {
        let mut state = json!({
            "name": "r",
            "docker": null,
            "storage": { "blob_store_name": "default", "extra": 1 }
        });
        schema().retain_known(&mut state);
        assert_eq!(state, json!({ "name": "r", "storage": { "blob_store_name": "default" } }));
    }

    #[test]
    fn export_skips_unset_flags() {
        let rendered = serde_json::to_value(Attribute::string("password").write_only()).unwrap();
        assert_eq!(
            rendered,
            json!({
                "name": "password",
                "type": { "kind": "string" },
                "optional": true,
                "sensitive": true,
                "write_only": true
            })
        );
    }

    #[test]
    fn retain_known_recurses_into_object_lists() {
        let schema = Schema::new("list").attribute(Attribute::object_list(
            "items",
            vec![Attribute::string("name")],
        ));
        let mut value = json!({ "items": [{ "name": "a", "junk": true }] });
        schema.retain_known(&mut value);
        assert_eq!(value, json!({ "items": [{ "name": "a" }] }));
    }

    #[test]
    fn computed_view_strips_inputs_and_secrets() {
        let view = computed_view(vec![
            Attribute::string("name").required().min_length(1),
            Attribute::string("password").write_only(),
            Attribute::bool("online").default(true),
            Attribute::string(LAST_UPDATED).computed(),
        ]);
        let names: Vec<_> = view.iter().map(|a| a.name).collect();
        assert_eq!(names, ["name", "online"]);
        assert!(view.iter().all(|a| a.computed && !a.required && a.default.is_none()));
        assert!(view[0].validators.is_empty());
    }
}
