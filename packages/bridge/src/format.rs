//! Safe stringification of console arguments.

use serde_json::Value;

/// Convert one logged argument to a human-readable string. Strings pass
/// through unchanged; everything else goes through structured-text
/// serialization, with a plain coercion as the fallback when serialization
/// fails.
pub fn format_arg(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|error| {
            log::warn!("console argument did not serialize: {}", error);
            coerce(other)
        }),
    }
}

/// Convert a full argument list, preserving order.
pub fn format_args(args: &[Value]) -> Vec<String> {
    args.iter().map(format_arg).collect()
}

fn coerce(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) => "[array]".to_string(),
        Value::Object(_) => "[object]".to_string(),
    }
}
