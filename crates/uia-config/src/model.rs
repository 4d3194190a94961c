use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub subprocess: SubprocessConfig,
    pub shell: ShellConfig,
    pub scripting: ScriptingConfig,
    pub browser: BrowserConfig,
    pub accessibility: AccessibilityConfig,
    pub vision: VisionConfig,
    pub recording: RecordingConfig,
    pub agent_loop: AgentLoopConfig,
    pub transport: TransportConfig,
    pub oracle: OracleConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            subprocess: SubprocessConfig::default(),
            shell: ShellConfig::default(),
            scripting: ScriptingConfig::default(),
            browser: BrowserConfig::default(),
            accessibility: AccessibilityConfig::default(),
            vision: VisionConfig::default(),
            recording: RecordingConfig::default(),
            agent_loop: AgentLoopConfig::default(),
            transport: TransportConfig::default(),
            oracle: OracleConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SubprocessConfig {
    pub default_timeout_ms: u64,
    pub max_output_bytes: usize,
}

impl Default for SubprocessConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 30_000,
            max_output_bytes: 1 << 20,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub exec_timeout_ms: u64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            exec_timeout_ms: 30_000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptingConfig {
    pub timeout_ms: u64,
    pub max_output_bytes: usize,
    pub temp_dir: Option<String>,
}

impl Default for ScriptingConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            max_output_bytes: 10 * 1024 * 1024,
            temp_dir: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub profile_dir: String,
    pub nav_timeout_ms: u64,
    pub action_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            profile_dir: ".uia-agent/browser-profile".to_string(),
            nav_timeout_ms: 30_000,
            action_timeout_ms: 10_000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessibilityConfig {
    pub tree_max_depth: usize,
    pub tree_max_children: usize,
    pub snapshot_max_elements: usize,
}

impl Default for AccessibilityConfig {
    fn default() -> Self {
        Self {
            tree_max_depth: 3,
            tree_max_children: 100,
            snapshot_max_elements: 200,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub image_space_width: u32,
    pub ring_buffer_size: usize,
    pub partial_ax_timeout_ms: u64,
    pub verification_delay_ms: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            image_space_width: 1280,
            ring_buffer_size: 10,
            partial_ax_timeout_ms: 3_000,
            verification_delay_ms: 500,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    pub coalesce_window_ms: u64,
    pub scroll_trigger_px: f64,
    pub heartbeat_interval_ms: u64,
    pub frame_debounce_ms: u64,
    pub audio_flush_grace_ms: u64,
    pub narration_proximity_window_ms: i64,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            coalesce_window_ms: 500,
            scroll_trigger_px: 500.0,
            heartbeat_interval_ms: 5_000,
            frame_debounce_ms: 300,
            audio_flush_grace_ms: 200,
            narration_proximity_window_ms: 3_000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentLoopConfig {
    pub max_iterations: u32,
    pub settle_delay_ms: u64,
    pub parse_error_budget: u32,
}

impl Default for AgentLoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            settle_delay_ms: 800,
            parse_error_budget: 3,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub bind_address: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8765".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub model: String,
    pub api_key_env: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-5-sonnet".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
        }
    }
}
