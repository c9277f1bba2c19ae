//! The negotiation engine — one query turn through the two-call protocol.
//!
//! Per query: build the system prompt, splice in remembered turns, call
//! the backend once with the tool list, parse the reply for an action,
//! dispatch it, and feed the result back in a second call. The second
//! call never offers tools, so a query performs at most one tool call.
//! The engine never returns an error to its caller: every failure is
//! rendered as conversation text at this boundary.

use palaver_config::AgentConfig;
use palaver_core::{Backend, Error, Role, ToolSpec, Turn};
use palaver_memory::{BoundedMemory, DEFAULT_CAPACITY};
use palaver_tools::ToolRegistry;
use serde_json::Value;
use tracing::{debug, info, warn};

/// A conversational agent: persona + tool registry + backend + memory.
///
/// One instance serves one caller at a time; `process_query` takes
/// `&mut self`, so the borrow checker enforces the single-active-turn
/// model without locks.
pub struct Agent {
    config: AgentConfig,
    registry: ToolRegistry,
    backend: Box<dyn Backend>,
    memory: BoundedMemory,
}

impl Agent {
    /// Create an agent from loaded configuration, a built registry, and a
    /// backend adapter.
    pub fn new(config: AgentConfig, registry: ToolRegistry, backend: Box<dyn Backend>) -> Self {
        let memory = BoundedMemory::new(DEFAULT_CAPACITY, config.config.memory);
        Self {
            config,
            registry,
            backend,
            memory,
        }
    }

    /// Override the number of turns memory retains.
    pub fn with_memory_capacity(mut self, capacity: usize) -> Self {
        let enabled = self.memory.is_enabled();
        self.memory = BoundedMemory::new(capacity, enabled);
        self
    }

    /// The agent's display name.
    pub fn name(&self) -> &str {
        &self.config.agent_name
    }

    /// Read access to the conversation memory.
    pub fn memory(&self) -> &BoundedMemory {
        &self.memory
    }

    /// Drop all remembered turns.
    pub fn clear_memory(&mut self) {
        self.memory.clear();
    }

    /// Process one user query and return the final answer.
    ///
    /// Never fails: any error escaping the turn is converted to an
    /// `"Error processing query: …"` reply here.
    pub async fn process_query(&mut self, query: &str) -> String {
        match self.run_turn(query).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "query turn failed");
                format!("Error processing query: {e}")
            }
        }
    }

    async fn run_turn(&mut self, query: &str) -> Result<String, Error> {
        let system_prompt = crate::prompt::build_system_prompt(&self.config, &self.registry)?;

        // System prompt, then remembered turns, then the new query.
        let mut outgoing = vec![Turn::system(system_prompt)];
        outgoing.extend(self.memory.turns());
        outgoing.push(Turn::user(query));

        // The user's message is remembered regardless of what the rest of
        // the turn does.
        self.memory.add(Role::User, query);

        let specs: Vec<ToolSpec> = self.registry.specs().cloned().collect();
        let formatted_tools = self.backend.format_tools(&specs);

        debug!(
            backend = self.backend.name(),
            turns = outgoing.len(),
            tools = formatted_tools.len(),
            "first model call"
        );

        let reply = match self.backend.get_response(&outgoing, &formatted_tools).await {
            Ok(text) => text,
            // Backend trouble is a degraded reply, not a fault.
            Err(e) => format!("Error: {e}"),
        };

        let Some(action) = self.backend.extract_tool_call(&reply) else {
            // No tool requested — the first reply is the final answer.
            self.memory.add(Role::Assistant, reply.clone());
            return Ok(reply);
        };

        info!(tool = %action.tool, "model requested a tool call");

        let result_text = match self.registry.dispatch(&action.tool, &action.parameters) {
            Ok(value) => render_tool_result(&value),
            Err(e) => format!("Error: {e}"),
        };

        // Extend the outgoing list only: the model sees its own decision
        // and the dispatch outcome, but neither is remembered across turns.
        outgoing.push(Turn::assistant(serde_json::to_string(&action)?));
        outgoing.push(Turn::system(format!("Tool result: {result_text}")));

        debug!(backend = self.backend.name(), "second model call (no tools)");

        let final_reply = match self.backend.get_response(&outgoing, &[]).await {
            Ok(text) => text,
            Err(e) => format!("Error: {e}"),
        };

        self.memory.add(Role::Assistant, final_reply.clone());
        Ok(final_reply)
    }
}

/// Render a dispatch result for re-injection into the conversation.
/// Strings go in bare; everything else as compact JSON.
fn render_tool_result(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use palaver_config::AgentSettings;
    use palaver_core::error::BackendError;
    use palaver_tools::calculator;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// A backend that replays scripted replies and records every request.
    struct ScriptedBackend {
        replies: Arc<Mutex<VecDeque<String>>>,
        calls: Arc<Mutex<Vec<RecordedCall>>>,
    }

    #[derive(Debug, Clone)]
    struct RecordedCall {
        turns: Vec<Turn>,
        tool_count: usize,
    }

    impl ScriptedBackend {
        fn new(replies: &[&str]) -> (Self, Arc<Mutex<Vec<RecordedCall>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            let backend = Self {
                replies: Arc::new(Mutex::new(
                    replies.iter().map(|r| r.to_string()).collect(),
                )),
                calls: calls.clone(),
            };
            (backend, calls)
        }
    }

    #[async_trait]
    impl Backend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        fn format_tools(&self, specs: &[ToolSpec]) -> Vec<Value> {
            specs.iter().map(|s| json!({"name": s.name})).collect()
        }

        async fn get_response(
            &self,
            turns: &[Turn],
            tools: &[Value],
        ) -> Result<String, BackendError> {
            self.calls.lock().unwrap().push(RecordedCall {
                turns: turns.to_vec(),
                tool_count: tools.len(),
            });
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| BackendError::Unavailable {
                    backend: "scripted".into(),
                    reason: "no scripted reply left".into(),
                })
        }
    }

    fn math_config(memory: bool) -> AgentConfig {
        AgentConfig {
            agent_name: "MathAssistant".into(),
            config: AgentSettings {
                backstory: "I am a helpful assistant with math skills.".into(),
                task: "help users solve mathematical problems".into(),
                tools: vec!["calculator".into()],
                memory,
                prompt_template: None,
                think: None,
            },
        }
    }

    fn math_agent(replies: &[&str]) -> (Agent, Arc<Mutex<Vec<RecordedCall>>>) {
        let (backend, calls) = ScriptedBackend::new(replies);
        let registry = ToolRegistry::from_specs([calculator::spec()]);
        (
            Agent::new(math_config(true), registry, Box::new(backend)),
            calls,
        )
    }

    #[tokio::test]
    async fn negotiates_a_tool_call_end_to_end() {
        let (mut agent, calls) = math_agent(&[
            r#"```json
{"tool": "calculator", "parameters": {"expression": "2+2"}}
```"#,
            "The answer is 4.",
        ]);

        let answer = agent.process_query("What is 2 + 2?").await;
        assert_eq!(answer, "The answer is 4.");

        // Memory holds exactly the user query and the final answer.
        let remembered = agent.memory().turns();
        assert_eq!(remembered.len(), 2);
        assert_eq!(remembered[0], Turn::user("What is 2 + 2?"));
        assert_eq!(remembered[1], Turn::assistant("The answer is 4."));

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);

        // First call offers the tool list; the second never does.
        assert_eq!(calls[0].tool_count, 1);
        assert_eq!(calls[1].tool_count, 0);

        // The second call carries the action echo and the dispatch result.
        let second = &calls[1].turns;
        let action_turn = &second[second.len() - 2];
        assert_eq!(action_turn.role, Role::Assistant);
        assert!(action_turn.content.contains(r#""tool":"calculator""#));
        let result_turn = &second[second.len() - 1];
        assert_eq!(result_turn.role, Role::System);
        assert_eq!(result_turn.content, "Tool result: 4");
    }

    #[tokio::test]
    async fn plain_reply_is_final_after_one_call() {
        let (mut agent, calls) = math_agent(&["Hello, how can I help?"]);

        let answer = agent.process_query("Hi there").await;
        assert_eq!(answer, "Hello, how can I help?");
        assert_eq!(calls.lock().unwrap().len(), 1);

        let remembered = agent.memory().turns();
        assert_eq!(remembered.len(), 2);
        assert_eq!(remembered[1].content, "Hello, how can I help?");
    }

    #[tokio::test]
    async fn failing_tool_still_completes_the_turn() {
        let (mut agent, calls) = math_agent(&[
            r#"```json
{"tool": "calculator", "parameters": {"expression": "1 / 0"}}
```"#,
            "I'm afraid that expression cannot be evaluated.",
        ]);

        let answer = agent.process_query("What is 1 / 0?").await;
        assert_eq!(answer, "I'm afraid that expression cannot be evaluated.");

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        let result_turn = calls[1].turns.last().unwrap();
        assert_eq!(result_turn.role, Role::System);
        assert!(result_turn.content.starts_with("Tool result: Error:"));
        assert!(result_turn.content.contains("division by zero"));
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_not_fatal() {
        let (mut agent, calls) = math_agent(&[
            r#"{"tool": "teleport", "parameters": {}}"#,
            "I don't have a teleporter, sorry.",
        ]);

        let answer = agent.process_query("Beam me up").await;
        assert_eq!(answer, "I don't have a teleporter, sorry.");

        let calls = calls.lock().unwrap();
        let result_turn = calls[1].turns.last().unwrap();
        assert!(result_turn.content.contains("tool 'teleport' not found"));
    }

    #[tokio::test]
    async fn first_call_sends_prompt_history_and_query_in_order() {
        let (mut agent, calls) = math_agent(&["One.", "Two."]);

        agent.process_query("first question").await;
        agent.process_query("second question").await;

        let calls = calls.lock().unwrap();
        let second_call = &calls[1].turns;

        assert_eq!(second_call[0].role, Role::System);
        assert!(second_call[0].content.starts_with("You are MathAssistant."));
        assert_eq!(second_call[1], Turn::user("first question"));
        assert_eq!(second_call[2], Turn::assistant("One."));
        assert_eq!(second_call[3], Turn::user("second question"));
    }

    #[tokio::test]
    async fn disabled_memory_records_nothing() {
        let (backend, calls) = ScriptedBackend::new(&["Sure.", "Again."]);
        let registry = ToolRegistry::from_specs([calculator::spec()]);
        let mut agent = Agent::new(math_config(false), registry, Box::new(backend));

        agent.process_query("remember me").await;
        agent.process_query("do you?").await;

        assert!(agent.memory().turns().is_empty());

        // No history leaks into the second query's context.
        let calls = calls.lock().unwrap();
        assert_eq!(calls[1].turns.len(), 2); // system + user only
    }

    #[tokio::test]
    async fn memory_eviction_applies_across_queries() {
        let (backend, _) = ScriptedBackend::new(&["a", "b", "c", "d", "e", "f"]);
        let registry = ToolRegistry::new();
        let mut agent = Agent::new(math_config(true), registry, Box::new(backend))
            .with_memory_capacity(2);

        agent.process_query("q1").await;
        agent.process_query("q2").await;
        agent.process_query("q3").await;

        let remembered = agent.memory().turns();
        assert_eq!(remembered.len(), 2);
        assert_eq!(remembered[0], Turn::user("q3"));
        assert_eq!(remembered[1], Turn::assistant("c"));
    }

    #[tokio::test]
    async fn backend_error_becomes_a_textual_reply() {
        let (mut agent, _) = math_agent(&[]); // no scripted replies

        let answer = agent.process_query("anyone there?").await;
        assert!(answer.starts_with("Error:"));
        assert!(answer.contains("no scripted reply left"));

        // The user turn was still recorded, and the error reply too.
        let remembered = agent.memory().turns();
        assert_eq!(remembered.len(), 2);
        assert_eq!(remembered[0], Turn::user("anyone there?"));
        assert_eq!(remembered[1].content, answer);
    }

    #[tokio::test]
    async fn template_failure_surfaces_at_the_turn_boundary() {
        let (backend, _) = ScriptedBackend::new(&["never reached"]);
        let mut config = math_config(true);
        config.config.prompt_template = Some("Hello {who_is_this}".into());
        let mut agent = Agent::new(config, ToolRegistry::new(), Box::new(backend));

        let answer = agent.process_query("hi").await;
        assert!(answer.starts_with("Error processing query:"));
        assert!(answer.contains("who_is_this"));
    }

    #[test]
    fn string_tool_results_are_injected_bare() {
        assert_eq!(render_tool_result(&json!("already text")), "already text");
        assert_eq!(render_tool_result(&json!(4)), "4");
        assert_eq!(render_tool_result(&json!(2.5)), "2.5");
        assert_eq!(
            render_tool_result(&json!({"k": [1, 2]})),
            r#"{"k":[1,2]}"#
        );
    }
}
