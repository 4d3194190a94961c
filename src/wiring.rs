//! Assembles the four concrete strata and the [`Dispatcher`] from a loaded
//! [`AgentConfig`] (spec.md §4 component list). Kept separate from `main.rs`
//! so both the `serve` and `agent` subcommands share one construction path.

use std::time::Duration;

use accessibility_stratum::{AccessibilityClient, AccessibilityStratum};
use browser_stratum::{BrowserClient, BrowserStratum};
use dispatcher::Dispatcher;
use scripting_bridge::ScriptingBridge;
use shell_stratum::ShellStratum;
use uia_config::AgentConfig;
use vision_stratum::{VisionClient, VisionConfig as VisionClientConfig, VisionStratum};

pub fn build_dispatcher(config: &AgentConfig) -> Dispatcher {
    let shell_bridge = ScriptingBridge::new(
        config.scripting.temp_dir.as_ref().map(Into::into),
        Duration::from_millis(config.scripting.timeout_ms),
        config.scripting.max_output_bytes,
    );
    let shell = ShellStratum::new(shell_bridge, Duration::from_millis(config.shell.exec_timeout_ms));

    let browser_client = BrowserClient::new(
        config.browser.profile_dir.clone().into(),
        Duration::from_millis(config.browser.nav_timeout_ms),
        Duration::from_millis(config.browser.action_timeout_ms),
    );
    let browser = BrowserStratum::new(browser_client);

    let ax_bridge = ScriptingBridge::new(
        config.scripting.temp_dir.as_ref().map(Into::into),
        Duration::from_millis(config.scripting.timeout_ms),
        config.scripting.max_output_bytes,
    );
    let ax_client = AccessibilityClient::new(
        ax_bridge,
        config.accessibility.tree_max_depth,
        config.accessibility.tree_max_children,
        config.accessibility.snapshot_max_elements,
    );
    let accessibility = AccessibilityStratum::new(ax_client);

    let vision_bridge = ScriptingBridge::new(
        config.scripting.temp_dir.as_ref().map(Into::into),
        Duration::from_millis(config.scripting.timeout_ms),
        config.scripting.max_output_bytes,
    );
    let vision_client = VisionClient::new(
        vision_bridge,
        Duration::from_millis(config.vision.partial_ax_timeout_ms),
        VisionClientConfig {
            image_space_width: config.vision.image_space_width,
            ring_buffer_size: config.vision.ring_buffer_size,
            partial_ax_timeout: Duration::from_millis(config.vision.partial_ax_timeout_ms),
            verification_delay: Duration::from_millis(config.vision.verification_delay_ms),
        },
    );
    let vision = VisionStratum::new(vision_client);

    Dispatcher::new(
        Box::new(shell),
        Box::new(browser),
        Box::new(accessibility),
        Box::new(vision),
    )
}
