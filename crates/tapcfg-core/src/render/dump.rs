//! `--dump-config` output
//!
//! The dump is a YAML mapping that can be saved as an rc file and loaded
//! back to reproduce the same configuration.

use crate::option::OptionValue;
use crate::resolve::ResolvedConfig;
use serde_yaml::{Mapping, Value};

/// Render every non-alias option of `config`, in declaration order.
///
/// Unset options are written as `null`, whole numbers as integers.
pub fn render_config_dump(config: &ResolvedConfig) -> Result<String, serde_yaml::Error> {
    let mut mapping = Mapping::new();
    for (name, value) in config.values() {
        mapping.insert(Value::String(name.clone()), to_yaml(value.as_ref()));
    }
    serde_yaml::to_string(&Value::Mapping(mapping))
}

fn to_yaml(value: Option<&OptionValue>) -> Value {
    match value {
        None => Value::Null,
        Some(OptionValue::Bool(b)) => Value::Bool(*b),
        Some(OptionValue::Num(n)) if n.fract() == 0.0 && n.abs() < 1e15 => {
            Value::Number((*n as i64).into())
        }
        Some(OptionValue::Num(n)) => Value::Number((*n).into()),
        Some(OptionValue::Str(s)) => Value::String(s.clone()),
        Some(OptionValue::List(items)) => {
            Value::Sequence(items.iter().cloned().map(Value::String).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ResolvedConfig {
        let mut config = ResolvedConfig::default();
        let values = [
            ("bail", Some(OptionValue::Bool(false))),
            ("timeout", Some(OptionValue::Num(30.0))),
            ("ratio", Some(OptionValue::Num(0.5))),
            ("reporter", None),
            ("100", None),
            (
                "node-arg",
                Some(OptionValue::List(vec!["--expose-gc".to_string()])),
            ),
            ("save", Some(OptionValue::Str("true".to_string()))),
        ];
        for (name, value) in values {
            config.values.insert(name.to_string(), value);
        }
        config
    }

    #[test]
    fn test_dump_shape() {
        let text = render_config_dump(&config()).unwrap();
        assert!(text.contains("bail: false\n"));
        assert!(text.contains("timeout: 30\n"));
        assert!(text.contains("ratio: 0.5\n"));
        assert!(text.contains("reporter: null\n"));
        assert!(text.contains("- --expose-gc\n"));
    }

    #[test]
    fn test_dump_preserves_order_and_types() {
        let text = render_config_dump(&config()).unwrap();
        let parsed: Mapping = serde_yaml::from_str(&text).unwrap();
        let keys: Vec<_> = parsed.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, ["bail", "timeout", "ratio", "reporter", "100", "node-arg", "save"]);
        assert_eq!(parsed["save"], Value::String("true".to_string()));
        assert_eq!(parsed["timeout"].as_i64(), Some(30));
    }
}
