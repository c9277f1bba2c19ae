//! System prompt construction.
//!
//! Either a user-supplied template (with `{agent_name}`, `{backstory}`,
//! and `{task}` placeholders) or the default prompt, which additionally
//! enumerates the registered tools and an optional thinking hint. Both
//! paths end with the fixed instruction block that tells the model the
//! exact JSON shape a tool invocation must take.

use palaver_config::AgentConfig;
use palaver_core::error::TemplateError;
use palaver_tools::ToolRegistry;

/// The instruction block appended to every system prompt.
const TOOL_CALL_INSTRUCTIONS: &str = r#"
To use a tool, use the following format:
```
{
  "tool": "tool_name",
  "parameters": {
    "param1": "value1",
    "param2": "value2"
  }
}
```

First think about the request, then decide if you need to use a tool.
If you need to use a tool, output ONLY the JSON above.
After receiving tool results, respond to the user naturally.
"#;

/// Assemble the system prompt for one query turn.
pub fn build_system_prompt(
    config: &AgentConfig,
    registry: &ToolRegistry,
) -> Result<String, TemplateError> {
    let settings = &config.config;

    let mut prompt = match &settings.prompt_template {
        Some(template) => render_template(
            template,
            &config.agent_name,
            &settings.backstory,
            &settings.task,
        )?,
        None => default_prompt(config, registry),
    };

    prompt.push_str(TOOL_CALL_INSTRUCTIONS);
    Ok(prompt)
}

/// The default prompt: persona sentence, task, tool roster, thinking hint.
fn default_prompt(config: &AgentConfig, registry: &ToolRegistry) -> String {
    let settings = &config.config;
    let mut prompt = format!(
        "You are {}. {}\nYour task is to {}.\n\nYou have access to the following tools:\n",
        config.agent_name, settings.backstory, settings.task
    );

    for spec in registry.specs() {
        prompt.push_str(&format!("- {}: {}\n", spec.name, spec.description));
    }

    if let Some(think) = &settings.think {
        prompt.push_str(&format!("\nThinking process: {think}\n"));
    }

    prompt
}

/// Substitute placeholders into a custom template.
///
/// Policy (deterministic, the strict branch of the two the contract
/// allows): a placeholder that is not one of the three supported names is
/// a `TemplateError`, as is an unclosed `{`. Doubled braces (`{{`, `}}`)
/// escape to literal braces. Supported placeholders the template chooses
/// not to use are fine.
pub fn render_template(
    template: &str,
    agent_name: &str,
    backstory: &str,
    task: &str,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    out.push('{');
                    continue;
                }

                let mut key = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    key.push(next);
                }
                if !closed {
                    return Err(TemplateError::UnbalancedBrace);
                }

                match key.as_str() {
                    "agent_name" => out.push_str(agent_name),
                    "backstory" => out.push_str(backstory),
                    "task" => out.push_str(task),
                    other => return Err(TemplateError::UnknownPlaceholder(other.to_string())),
                }
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                }
                out.push('}');
            }
            c => out.push(c),
        }
    }

    Ok(out)
}
