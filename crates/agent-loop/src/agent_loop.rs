use std::sync::Arc;

use agent_observer::{ObserveInputs, Observer};
use core_types::{Layer, ParsedResponse, RecentAction};
use dispatcher::Dispatcher;
use oracle_protocol::{build_user_message, system_prompt, ContentBlock, OracleMessage};
use tracing::{info, warn};

use crate::feedback::feedback_message;
use crate::model::{LoopCallbacks, LoopConfig, LoopResult, Outcome, StepEvent};
use crate::oracle::Oracle;

/// Iterative observe → decide → parse → act controller (spec.md §4.C10).
/// The dispatcher and oracle are shared across steps; history and the
/// browser-active flag are the only state carried between them.
pub struct AgentLoop {
    dispatcher: Arc<Dispatcher>,
    oracle: Arc<dyn Oracle>,
    config: LoopConfig,
    callbacks: Option<Arc<dyn LoopCallbacks>>,
    system_prompt: String,
}

impl AgentLoop {
    pub fn new(dispatcher: Arc<Dispatcher>, oracle: Arc<dyn Oracle>, config: LoopConfig) -> Self {
        Self {
            dispatcher,
            oracle,
            config,
            callbacks: None,
            system_prompt: system_prompt(),
        }
    }

    pub fn with_callbacks(mut self, callbacks: Arc<dyn LoopCallbacks>) -> Self {
        self.callbacks = Some(callbacks);
        self
    }

    fn emit(&self, step: u32, event: StepEvent<'_>) {
        if let Some(cb) = &self.callbacks {
            cb.on_event(step, event);
        }
    }

    pub async fn run(&self) -> LoopResult {
        let mut history: Vec<OracleMessage> = Vec::new();
        let mut recent_actions: Vec<RecentAction> = Vec::new();
        let mut browser_active = false;
        let mut consecutive_parse_errors: u32 = 0;
        let mut agent_cmd_counter: u64 = 0;
        let mut step: u32 = 0;

        loop {
            if step >= self.config.max_iterations {
                return LoopResult {
                    outcome: Outcome::MaxIterations,
                    summary: format!("reached max iterations ({})", self.config.max_iterations),
                    steps: step,
                };
            }
            step += 1;

            let observation = match Observer::observe(
                &self.dispatcher,
                ObserveInputs {
                    browser_active,
                    recent_actions: recent_actions.clone(),
                },
            )
            .await
            {
                Ok(observation) => observation,
                Err(err) => {
                    warn!(step, error = %err, "agent-loop: observation failed, ending loop");
                    return LoopResult {
                        outcome: Outcome::Error,
                        summary: format!("observation failed: {err}"),
                        steps: step,
                    };
                }
            };
            self.emit(step, StepEvent::Observed(&observation));

            history.push(build_user_message(&self.config.goal, step, &observation));

            let raw_reply = match self.oracle.ask(&self.system_prompt, &history).await {
                Ok(reply) => reply,
                Err(err) => {
                    warn!(step, error = %err, "agent-loop: oracle call failed, ending loop");
                    return LoopResult {
                        outcome: Outcome::Error,
                        summary: format!("oracle failure: {err}"),
                        steps: step,
                    };
                }
            };
            history.push(OracleMessage::assistant(raw_reply.clone()));

            agent_cmd_counter += 1;
            let parsed = oracle_protocol::parse_response(&raw_reply, agent_cmd_counter);
            self.emit(step, StepEvent::Decided(&parsed));

            match parsed {
                ParsedResponse::Complete { summary, .. } => {
                    info!(step, "agent-loop: complete");
                    return LoopResult {
                        outcome: Outcome::Complete,
                        summary,
                        steps: step,
                    };
                }
                ParsedResponse::NeedsHelp { question, .. } => {
                    info!(step, "agent-loop: needs help");
                    return LoopResult {
                        outcome: Outcome::NeedsHelp,
                        summary: question,
                        steps: step,
                    };
                }
                ParsedResponse::Action { command, .. } => {
                    consecutive_parse_errors = 0;

                    if matches!(command.layer(), Ok(Layer::Browser)) {
                        match command.action.as_str() {
                            "launch" => browser_active = true,
                            "close" => browser_active = false,
                            _ => {}
                        }
                    }

                    let action_id = command.id.clone();
                    let layer_str = command.layer.clone();
                    let action_str = command.action.clone();

                    let result = self.dispatcher.dispatch(command).await;
                    self.emit(step, StepEvent::Acted(&result));

                    let ok = result.is_success();
                    let summary = result
                        .data
                        .get("error")
                        .and_then(serde_json::Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| if ok { "ok".to_string() } else { "error".to_string() });

                    recent_actions.push(RecentAction {
                        action_id,
                        layer: layer_str.clone(),
                        action: action_str.clone(),
                        ok,
                        summary,
                    });
                    if recent_actions.len() > 5 {
                        let drop = recent_actions.len() - 5;
                        recent_actions.drain(0..drop);
                    }

                    if let Some(text) = feedback_message(&layer_str, &action_str, &result) {
                        history.push(OracleMessage::user(vec![ContentBlock::text(text)]));
                    }

                    tokio::time::sleep(self.config.settle_delay).await;
                }
                ParsedResponse::Error { error, raw_response } => {
                    consecutive_parse_errors += 1;
                    warn!(step, consecutive_parse_errors, error = %error, "agent-loop: parse error");

                    if consecutive_parse_errors >= self.config.parse_error_budget {
                        return LoopResult {
                            outcome: Outcome::Error,
                            summary: format!(
                                "{} consecutive parse errors. Last: {error}",
                                self.config.parse_error_budget
                            ),
                            steps: step,
                        };
                    }

                    history.push(OracleMessage::user(vec![ContentBlock::text(format!(
                        "Your last reply could not be parsed ({error}). Reply with exactly \
                         one JSON object matching the grammar in the system prompt. Raw reply: {raw_response}"
                    ))]));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use core_types::{Stratum, StratumErrorKind};
    use serde_json::{json, Map, Value};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct StubStratum {
        response: fn(&str) -> Result<Map<String, Value>, StratumErrorKind>,
    }

    #[async_trait]
    impl Stratum for StubStratum {
        async fn handle(&self, action: &str, _params: &Map<String, Value>) -> Result<Map<String, Value>, StratumErrorKind> {
            (self.response)(action)
        }
    }

    fn ok(value: Value) -> Result<Map<String, Value>, StratumErrorKind> {
        Ok(value.as_object().unwrap().clone())
    }

    fn always_ok_dispatcher() -> Arc<Dispatcher> {
        Arc::new(Dispatcher::new(
            Box::new(StubStratum { response: |_| ok(json!({})) }),
            Box::new(StubStratum { response: |_| ok(json!({ "elements": [] })) }),
            Box::new(StubStratum { response: |_| ok(json!({ "elements": [] })) }),
            Box::new(StubStratum {
                response: |action| {
                    if action == "screenshot" {
                        ok(json!({ "screenshot_base64": "Zm9v", "width": 10, "height": 10 }))
                    } else {
                        ok(json!({}))
                    }
                },
            }),
        ))
    }

    struct ScriptedOracle {
        replies: Vec<String>,
        cursor: AtomicU32,
    }

    impl ScriptedOracle {
        fn new(replies: Vec<&str>) -> Self {
            Self {
                replies: replies.into_iter().map(str::to_string).collect(),
                cursor: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Oracle for ScriptedOracle {
        async fn ask(&self, _system_prompt: &str, _history: &[OracleMessage]) -> Result<String, crate::errors::OracleError> {
            let i = self.cursor.fetch_add(1, Ordering::SeqCst) as usize;
            Ok(self.replies[i.min(self.replies.len() - 1)].clone())
        }
    }

    fn fast_config(goal: &str) -> LoopConfig {
        let mut cfg = LoopConfig::new(goal);
        cfg.settle_delay = Duration::from_millis(1);
        cfg
    }

    #[tokio::test]
    async fn completes_immediately_on_a_complete_reply() {
        let oracle = Arc::new(ScriptedOracle::new(vec![
            r#"{"thinking":"done","status":"complete","summary":"all set"}"#,
        ]));
        let agent_loop = AgentLoop::new(always_ok_dispatcher(), oracle, fast_config("test goal"));
        let result = agent_loop.run().await;
        assert!(matches!(result.outcome, Outcome::Complete));
        assert_eq!(result.summary, "all set");
        assert_eq!(result.steps, 1);
    }

    #[tokio::test]
    async fn three_consecutive_parse_errors_end_the_loop_per_spec_s5() {
        let oracle = Arc::new(ScriptedOracle::new(vec!["not json", "still not json", "nope"]));
        let agent_loop = AgentLoop::new(always_ok_dispatcher(), oracle, fast_config("test goal"));
        let result = agent_loop.run().await;
        assert!(matches!(result.outcome, Outcome::Error));
        assert!(result.summary.contains("3 consecutive parse errors"));
        assert_eq!(result.steps, 3);
    }

    #[tokio::test]
    async fn max_iterations_caps_the_loop() {
        let oracle = Arc::new(ScriptedOracle::new(vec![
            r#"{"thinking":"x","action":{"layer":"shell","action":"exec","params":{"command":"true"}}}"#,
        ]));
        let mut config = fast_config("test goal");
        config.max_iterations = 2;
        let agent_loop = AgentLoop::new(always_ok_dispatcher(), oracle, config);
        let result = agent_loop.run().await;
        assert!(matches!(result.outcome, Outcome::MaxIterations));
        assert_eq!(result.steps, 2);
    }

    #[tokio::test]
    async fn needs_help_is_terminal() {
        let oracle = Arc::new(ScriptedOracle::new(vec![
            r#"{"thinking":"stuck","status":"needs_help","question":"which file?"}"#,
        ]));
        let agent_loop = AgentLoop::new(always_ok_dispatcher(), oracle, fast_config("test goal"));
        let result = agent_loop.run().await;
        assert!(matches!(result.outcome, Outcome::NeedsHelp));
        assert_eq!(result.summary, "which file?");
    }
}
