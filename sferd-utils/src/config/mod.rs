//! Configuration file loading
//!
//! Config files may be TOML, JSON or YAML; the format is picked from the
//! file extension. Values are merged through `serde_json::Value` so a partial
//! overlay only replaces the keys it actually sets.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Load configuration from file, auto-detecting the format.
///
/// # Errors
///
/// Returns an error when the file cannot be read, the extension is not one
/// of `toml`, `json`, `yml`, `yaml`, or the contents do not deserialize.
pub fn load_config<T>(path: &Path) -> crate::Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    let content = std::fs::read_to_string(path)?;

    match extension.as_str() {
        "toml" => toml::from_str(&content)
            .map_err(|e| crate::UtilError::Config(format!("TOML parse error: {e}"))),
        "json" => serde_json::from_str(&content)
            .map_err(|e| crate::UtilError::Config(format!("JSON parse error: {e}"))),
        "yml" | "yaml" => serde_yaml::from_str(&content)
            .map_err(|e| crate::UtilError::Config(format!("YAML parse error: {e}"))),
        _ => Err(crate::UtilError::Config(format!(
            "Unsupported config format: {extension}"
        ))),
    }
}

/// Merge two JSON values; objects merge key by key, anything else is replaced.
fn merge_json_values(base: &mut serde_json::Value, overlay: serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base_obj), serde_json::Value::Object(overlay_obj)) => {
            for (key, value) in overlay_obj {
                match base_obj.get_mut(&key) {
                    Some(existing) => merge_json_values(existing, value),
                    None => {
                        base_obj.insert(key, value);
                    }
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

/// Overlay `overlay` onto `base`.
///
/// `overlay` is usually a partial object (for instance only the options a user
/// passed on the command line); keys it does not mention keep their value.
///
/// # Errors
///
/// Fails when `base` cannot round-trip through JSON or the merged value no
/// longer deserializes into `T`.
pub fn merge_configs<T>(base: &mut T, overlay: serde_json::Value) -> crate::Result<()>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    let mut base_value = serde_json::to_value(&*base)
        .map_err(|e| crate::UtilError::Serialization(format!("Base serialization error: {e}")))?;

    merge_json_values(&mut base_value, overlay);

    *base = serde_json::from_value(base_value).map_err(|e| {
        crate::UtilError::Serialization(format!("Result deserialization error: {e}"))
    })?;

    Ok(())
}
