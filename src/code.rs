use serde::{de::Error, Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationRequest {
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub language: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
}

impl CompilationRequest {
    pub fn new(language: &str, code: &str, input: &str) -> Self {
        CompilationRequest {
            language: Some(language.to_string()),
            code: Some(code.to_string()),
            input: Some(input.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationResult {
    pub success: bool,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<u64>,
}

impl CompilationResult {
    pub fn ok(output: String, execution_time: u64) -> Self {
        CompilationResult {
            success: true,
            output,
            error: None,
            execution_time: Some(execution_time),
        }
    }

    pub fn failure(error: String) -> Self {
        CompilationResult {
            success: false,
            output: String::new(),
            error: Some(error),
            execution_time: None,
        }
    }
}

/// Accepts any scalar so a mistyped language is reported as unsupported
/// rather than as a broken body. `null`, `false` and `0` count as absent.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(None),
        Value::Bool(true) => Ok(Some("true".to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::String(s) => Ok(Some(s)),
        other => Err(D::Error::custom(format!("expected a scalar, got {}", other))),
    }
}

/// Static description of the service returned by `GET /api/compile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub message: String,
    pub version: String,
    pub supported_languages: Vec<String>,
}
