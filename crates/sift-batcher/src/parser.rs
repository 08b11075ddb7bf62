//! Parse provider output into per-file results

use crate::error::BatchError;
use crate::types::FileResult;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Keys some providers wrap the path map in
const WRAPPER_KEYS: [&str; 2] = ["files", "results"];

/// Parse a batch response into one result per requested path, in order
///
/// Any schema violation fails the whole response: not JSON, not an object,
/// a requested path missing, `key_facts` or `insights` absent, or a field of
/// the wrong type. `statistics` and `sources` may be omitted.
pub fn parse_batch_response(
    response: &str,
    paths: &[&str],
) -> Result<Vec<FileResult>, BatchError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| BatchError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    let root = json
        .as_object()
        .ok_or_else(|| BatchError::InvalidFormat("Expected JSON object".to_string()))?;
    let files = unwrap_container(root, paths);

    paths
        .iter()
        .map(|path| {
            let entry = lookup(files, path).ok_or_else(|| {
                BatchError::InvalidFormat(format!("Missing result for '{}'", path))
            })?;
            parse_file_json(entry)
                .map_err(|e| BatchError::InvalidFormat(format!("Result for '{}': {}", path, e)))
        })
        .collect()
}

/// Extract JSON from response, handling markdown code blocks and chatter
fn extract_json(response: &str) -> Result<String, BatchError> {
    let trimmed = response.trim();

    // Check if wrapped in markdown code block
    let body = if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(BatchError::InvalidFormat("Empty code block".to_string()));
        }
        // Skip first line (```json or ```) and the closing fence
        let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        lines[1..end].join("\n")
    } else {
        trimmed.to_string()
    };

    if body.trim_start().starts_with('{') {
        return Ok(body);
    }

    // Leading or trailing prose around a single object
    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(body[start..=end].to_string()),
        _ => Err(BatchError::InvalidFormat(
            "No JSON object in response".to_string(),
        )),
    }
}

/// Descend into a `files`/`results` wrapper when the paths are not top-level keys
fn unwrap_container<'a>(root: &'a Map<String, Value>, paths: &[&str]) -> &'a Map<String, Value> {
    if paths.iter().any(|p| lookup(root, p).is_some()) {
        return root;
    }
    WRAPPER_KEYS
        .iter()
        .find_map(|key| root.get(*key).and_then(Value::as_object))
        .unwrap_or(root)
}

fn lookup<'a>(files: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    files
        .get(path)
        .or_else(|| files.get(path.trim_start_matches("./")))
        .or_else(|| {
            files
                .iter()
                .find(|(key, _)| key.trim_start_matches("./") == path.trim_start_matches("./"))
                .map(|(_, v)| v)
        })
}

/// Parse a single file entry from JSON
fn parse_file_json(json: &Value) -> Result<FileResult, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "Entry is not a JSON object".to_string())?;

    let summary = obj
        .get("summary")
        .and_then(|v| v.as_str())
        .ok_or_else(|| "Missing or invalid 'summary'".to_string())?
        .to_string();

    let key_facts = required_list(obj, "key_facts")?;
    let insights = required_list(obj, "insights")?;
    let sources = string_list(obj, "sources")?;

    let statistics = match obj.get("statistics") {
        None | Some(Value::Null) => BTreeMap::new(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| (k.clone(), stringify(v)))
            .collect(),
        Some(_) => return Err("Invalid 'statistics': expected object".to_string()),
    };

    Ok(FileResult {
        summary,
        key_facts,
        insights,
        statistics,
        sources,
    })
}

/// An array of strings that must be present
fn required_list(obj: &Map<String, Value>, field: &str) -> Result<Vec<String>, String> {
    if !obj.contains_key(field) {
        return Err(format!("Missing '{}'", field));
    }
    string_list(obj, field)
}

/// An optional array of strings; absent or null is empty
fn string_list(obj: &Map<String, Value>, field: &str) -> Result<Vec<String>, String> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| format!("Invalid '{}': expected array of strings", field))
            })
            .collect(),
        Some(_) => Err(format!("Invalid '{}': expected array", field)),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
