//! Shared helpers for command handlers.

use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::error::CliError;

/// Read and parse a JSON document; `-` reads stdin.
pub fn read_json(path: &Path, field: &str) -> Result<Value, CliError> {
    let contents = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("invalid JSON in {}: {e}", path.display()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_a_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(&path, r#"{ "active": ["NexusAuthenticatingRealm"] }"#).unwrap();
        assert_eq!(
            read_json(&path, "plan").unwrap(),
            json!({ "active": ["NexusAuthenticatingRealm"] })
        );
    }

    #[test]
    fn broken_json_names_the_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(
            read_json(&path, "state"),
            Err(CliError::Validation { field, .. }) if field == "state"
        ));
    }
}
