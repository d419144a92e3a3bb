use std::collections::BTreeMap;

use log::warn;
use serde_json::Value;

use crate::config::Config;

pub fn canonical_key(key: &str) -> String {
    key.replace('-', "_")
}

/// Build a canonical config from raw top-level `(key, value)` pairs in document order
///
/// When two raw keys fold to the same canonical key the later pair wins.
pub fn normalize<I>(raw: I) -> Config
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut options: BTreeMap<String, Value> = BTreeMap::new();
    for (key, value) in raw {
        let canonical = canonical_key(&key);
        if options.insert(canonical.clone(), value).is_some() {
            warn!("Config option '{key}' duplicates '{canonical}', keeping the later value");
        }
    }
    Config::from_canonical(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(config: &Config) -> Vec<(String, Value)> {
        config.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    #[test]
    fn hyphen_and_underscore_spellings_agree() {
        let hyphen = normalize([("prepare-fast5".to_string(), json!(true))]);
        let underscore = normalize([("prepare_fast5".to_string(), json!(true))]);
        assert_eq!(hyphen, underscore);
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let once = normalize([
            ("split-tars-bigger-than-this".to_string(), json!("10G")),
            ("ledger_name".to_string(), json!("run1")),
            ("debug".to_string(), json!(true)),
        ]);
        let twice = normalize(pairs(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn later_spelling_wins() {
        let config = normalize([
            ("batch-size".to_string(), json!(5)),
            ("batch_size".to_string(), json!(10)),
        ]);
        assert_eq!(config.len(), 1);
        assert_eq!(config.get("batch_size"), Some(&json!(10)));
    }

    #[test]
    fn values_pass_through_unchanged() {
        let config = normalize([("readstore-ledger-dir".to_string(), json!("s3://my-bucket/ledger-dir/"))]);
        assert_eq!(config.get_str("readstore_ledger_dir"), Some("s3://my-bucket/ledger-dir/"));
    }
}
