use serde_json::Value;

/// A callable the synthesize node can offer to the LLM (spec §4.6).
///
/// Tools never panic and never propagate an error up the call stack — a
/// failure is reported back to the LLM as `{"error": "..."}` so reasoning
/// can continue around it.
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> Value;
    fn execute(&self, args: &Value) -> Value;
}
