use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::ConfigError;
use crate::model::AgentConfig;

/// Where a config field's effective value came from, surfaced so operators
/// can tell a file override from an environment override at a glance.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Source {
    Default,
    File,
    Env,
}

#[derive(Clone, Debug)]
pub struct LoadedConfig {
    pub config: AgentConfig,
    pub provenance: HashMap<String, Source>,
}

/// Environment variables recognized per spec.md §6, mapped onto config
/// fields this expansion's config model owns.
const ENV_MAP: &[(&str, &str)] = &[
    ("ANTHROPIC_MODEL", "oracle.model"),
    ("AGENT_MAX_ITERATIONS", "agent_loop.max_iterations"),
    ("WS_URL", "transport.bind_address"),
];

/// Build an [`AgentConfig`] from defaults, an optional file overlay, then
/// the recognized environment variables, recording provenance for each
/// touched field (grounded in `policy-center`'s layered `load_snapshot`).
pub fn load(file: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let mut provenance = HashMap::new();
    let mut value = serde_json::to_value(AgentConfig::default())
        .expect("AgentConfig default always serializes");

    if let Some(path) = file {
        if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let overlay: Value =
                serde_json::from_str(&raw).map_err(|err| ConfigError::Invalid {
                    path: path.display().to_string(),
                    reason: err.to_string(),
                })?;
            merge_into(&mut value, &overlay, &mut provenance, Source::File, "");
            debug!(path = %path.display(), "loaded config file overlay");
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
        }
    }

    for (env_key, dotted_path) in ENV_MAP {
        if let Ok(raw) = std::env::var(env_key) {
            set_dotted(&mut value, dotted_path, parse_env_scalar(&raw))
                .map_err(|reason| ConfigError::InvalidEnv {
                    key: (*env_key).to_string(),
                    reason,
                })?;
            provenance.insert((*dotted_path).to_string(), Source::Env);
        }
    }

    let config: AgentConfig = serde_json::from_value(value).map_err(|err| ConfigError::Invalid {
        path: "<merged>".to_string(),
        reason: err.to_string(),
    })?;

    Ok(LoadedConfig { config, provenance })
}

fn parse_env_scalar(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<u64>() {
        return Value::from(n);
    }
    if let Ok(b) = raw.parse::<bool>() {
        return Value::from(b);
    }
    Value::String(raw.to_string())
}

fn merge_into(
    base: &mut Value,
    overlay: &Value,
    provenance: &mut HashMap<String, Source>,
    source: Source,
    prefix: &str,
) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                let entry = base_map.entry(key.clone()).or_insert(Value::Null);
                merge_into(entry, overlay_value, provenance, source, &path);
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
            provenance.insert(prefix.to_string(), source);
        }
    }
}

fn set_dotted(root: &mut Value, dotted_path: &str, value: Value) -> Result<(), String> {
    let mut cursor = root;
    let segments: Vec<&str> = dotted_path.split('.').collect();
    for segment in &segments[..segments.len() - 1] {
        cursor = cursor
            .get_mut(*segment)
            .ok_or_else(|| format!("unknown config path segment \"{segment}\""))?;
    }
    let last = segments[segments.len() - 1];
    let obj = cursor
        .as_object_mut()
        .ok_or_else(|| format!("config path \"{dotted_path}\" does not address an object"))?;
    obj.insert(last.to_string(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_load_without_a_file() {
        let loaded = load(None).unwrap();
        assert_eq!(loaded.config.agent_loop.max_iterations, 25);
        assert!(loaded.provenance.is_empty());
    }

    #[test]
    #[serial]
    fn env_override_is_tracked_as_env_provenance() {
        std::env::set_var("AGENT_MAX_ITERATIONS", "7");
        let loaded = load(None).unwrap();
        assert_eq!(loaded.config.agent_loop.max_iterations, 7);
        assert_eq!(
            loaded.provenance.get("agent_loop.max_iterations"),
            Some(&Source::Env)
        );
        std::env::remove_var("AGENT_MAX_ITERATIONS");
    }
}
