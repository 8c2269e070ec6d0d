use serde_json::Value;

/// Receiver for debug dumps (raw JWK responses, verified tokens, provider responses).
///
/// Components take an `Option<&dyn DebugSink>`; `None` means debug output is off.
pub trait DebugSink {
    fn emit(&self, label: &str, value: &Value);
}
