use wasm_bindgen::prelude::*;

/// Resolves `path` against the JSON text and returns the selected node as pretty JSON
#[wasm_bindgen]
pub fn select(path: &str, json_str: &str) -> Result<String, String> {
    let json: serde_json::Value =
        serde_json::from_str(json_str).map_err(|e| format!("JSON parse error: {}", e))?;

    let output = ypath_core::query(path, &json).map_err(|e| e.to_string())?;

    serde_json::to_string_pretty(&output).map_err(|e| format!("Serialization error: {}", e))
}

/// Checks the syntax of `path`; returns the error message if it is invalid
#[wasm_bindgen]
pub fn validate(path: &str) -> Option<String> {
    ypath_core::validate(path).error.map(|e| e.to_string())
}
