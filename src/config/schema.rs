use jsonschema::JSONSchema;
use log::{info, warn};
use serde_json::Value;

use crate::config::Config;

/// Check documented options against a JSON schema and return one message per violation
///
/// Violations are logged as warnings only: unknown options and unexpected types are passed
/// through to the root jobs, which own their interpretation.
pub fn check(config: &Config, schema_json: &str) -> Vec<String> {
    let schema = match compile_schema(schema_json) {
        Some(schema) => schema,
        None => return Vec::new(),
    };

    info!("Checking config options against schema");
    let instance = config.to_json();
    let problems: Vec<String> = match schema.validate(&instance) {
        Ok(_) => Vec::new(),
        Err(errors) => errors
            .map(|err| match err.instance_path.to_string().as_str() {
                "" => err.to_string(),
                path => format!("{path}: {err}"),
            })
            .collect(),
    };

    for problem in &problems {
        warn!("Config option doesn't match documented type: {problem}");
    }
    problems
}

fn compile_schema(schema_json: &str) -> Option<JSONSchema> {
    let schema: Value = match serde_json::from_str(schema_json) {
        Ok(schema) => schema,
        Err(err) => {
            warn!("Skipping config check, schema isn't valid JSON: {err}");
            return None;
        }
    };
    match JSONSchema::compile(&schema) {
        Ok(compiled) => Some(compiled),
        Err(err) => {
            warn!("Skipping config check, schema doesn't compile: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SCHEMA: &str = r#"{
        "type": "object",
        "properties": {
            "debug": { "type": "boolean" },
            "prepare_batch_size": { "type": ["integer", "null"] }
        }
    }"#;

    #[test]
    fn documented_types_pass() {
        let config = Config::from_yaml("debug: true\nprepare_batch_size:\nsomething_else: 3\n").unwrap();
        assert!(check(&config, SCHEMA).is_empty());
    }

    #[test]
    fn wrong_type_is_reported_not_fatal() {
        let config = Config::from_yaml("debug: maybe\n").unwrap();
        let problems = check(&config, SCHEMA);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].starts_with("/debug"));
    }

    #[test]
    fn broken_schema_skips_the_check() {
        let config = Config::from_yaml("debug: maybe\n").unwrap();
        assert!(check(&config, "{ not json").is_empty());
    }
}
