//! The command catalog embedded in the oracle's system prompt: every
//! layer/action the dispatcher accepts, with its param schema (spec.md §6
//! "System prompt enumerates available commands by layer/action with param
//! schemas and response-format rules").

/// One dispatcher action, documented for the oracle.
pub struct ActionDoc {
    pub layer: &'static str,
    pub action: &'static str,
    pub params: &'static str,
    pub description: &'static str,
}

pub const CATALOG: &[ActionDoc] = &[
    ActionDoc { layer: "shell", action: "exec", params: "{command: string, timeoutMs?: number}", description: "Run a raw shell command, capturing stdout/stderr/exit code." },
    ActionDoc { layer: "shell", action: "launch_app", params: "{app: string}", description: "Launch an application by name." },
    ActionDoc { layer: "shell", action: "switch_app", params: "{app: string}", description: "Activate an already-running application." },
    ActionDoc { layer: "shell", action: "close_app", params: "{app: string}", description: "Quit an application." },
    ActionDoc { layer: "shell", action: "list_apps", params: "{}", description: "List running application names." },
    ActionDoc { layer: "shell", action: "minimize_window", params: "{app: string}", description: "Minimize an application's frontmost window." },
    ActionDoc { layer: "shell", action: "get_frontmost", params: "{}", description: "Name of the frontmost application." },
    ActionDoc { layer: "browser", action: "launch", params: "{}", description: "Start (or no-op if already running) the owned browser instance." },
    ActionDoc { layer: "browser", action: "close", params: "{}", description: "Tear down the browser context." },
    ActionDoc { layer: "browser", action: "navigate", params: "{url: string}", description: "Navigate the active page and wait for DOM content loaded." },
    ActionDoc { layer: "browser", action: "snapshot", params: "{interactive?: boolean}", description: "Enumerate elements and assign refs (e1, e2, ...)." },
    ActionDoc { layer: "browser", action: "click", params: "{ref: string}", description: "Click the element identified by ref." },
    ActionDoc { layer: "browser", action: "type", params: "{ref: string, text: string}", description: "Type text into the element identified by ref." },
    ActionDoc { layer: "browser", action: "select", params: "{ref: string, value: string}", description: "Choose a dropdown option by visible label or value." },
    ActionDoc { layer: "browser", action: "screenshot", params: "{}", description: "Base64 PNG of the current page." },
    ActionDoc { layer: "browser", action: "page_info", params: "{}", description: "Current URL and title." },
    ActionDoc { layer: "browser", action: "new_tab", params: "{url?: string}", description: "Open a new tab." },
    ActionDoc { layer: "browser", action: "close_tab", params: "{}", description: "Close the active tab." },
    ActionDoc { layer: "browser", action: "list_tabs", params: "{}", description: "List open tabs." },
    ActionDoc { layer: "accessibility", action: "get_tree", params: "{app: string}", description: "Depth-limited display tree for diagnostics." },
    ActionDoc { layer: "accessibility", action: "snapshot", params: "{app: string}", description: "Enumerate interactive elements and assign refs (ax_1, ax_2, ...)." },
    ActionDoc { layer: "accessibility", action: "press_button", params: "{ref: string}", description: "Press the button identified by ref." },
    ActionDoc { layer: "accessibility", action: "set_value", params: "{ref: string, value: string}", description: "Set the value of the element identified by ref." },
    ActionDoc { layer: "accessibility", action: "get_value", params: "{ref: string}", description: "Read the value of the element identified by ref." },
    ActionDoc { layer: "accessibility", action: "focus", params: "{ref: string}", description: "Focus the element identified by ref." },
    ActionDoc { layer: "accessibility", action: "menu_click", params: "{app: string, menuPath: string[]}", description: "Activate app then click a menu path." },
    ActionDoc { layer: "accessibility", action: "find_element", params: "{app: string, query: string}", description: "Substring search across role/label/value in a fresh snapshot." },
    ActionDoc { layer: "vision", action: "screenshot", params: "{mode?: \"fullscreen\"|\"region\"|\"window\", app?: string}", description: "Capture a screenshot." },
    ActionDoc { layer: "vision", action: "context_collection", params: "{app?: string, currentStep?: string, expectedOutcome?: string, workflowName?: string}", description: "Screenshot plus app/title/bounds/partial accessibility." },
    ActionDoc { layer: "vision", action: "click_coordinates", params: "{x: number, y: number, verify?: boolean}", description: "Click at image-space coordinates (1280 wide)." },
    ActionDoc { layer: "vision", action: "double_click", params: "{x: number, y: number, verify?: boolean}", description: "Double-click at image-space coordinates." },
    ActionDoc { layer: "vision", action: "right_click", params: "{x: number, y: number, verify?: boolean}", description: "Right-click at image-space coordinates." },
    ActionDoc { layer: "vision", action: "drag", params: "{fromX: number, fromY: number, toX: number, toY: number, verify?: boolean}", description: "Drag between two image-space points." },
    ActionDoc { layer: "vision", action: "scroll", params: "{x: number, y: number, deltaY: number, verify?: boolean}", description: "Scroll at an image-space point." },
    ActionDoc { layer: "vision", action: "type_text", params: "{text: string, verify?: boolean}", description: "Type text via keystroke injection." },
    ActionDoc { layer: "vision", action: "key_combo", params: "{combo: string, verify?: boolean}", description: "Press a modifier+key combo, e.g. \"cmd+s\"." },
    ActionDoc { layer: "system", action: "ping", params: "{}", description: "No-op health check; no stratum is touched." },
];

/// The system prompt text sent once at the start of a conversation,
/// enumerating the catalog and the exact reply grammar (spec.md §6).
pub fn system_prompt() -> String {
    let mut out = String::from(
        "You control a desktop computer through a layered command interface. \
         On every turn you receive one screenshot and a text description of the \
         current state. Reply with exactly one JSON object and nothing else — \
         no prose, no markdown code fences. Valid replies:\n\n\
         {\"thinking\": string, \"action\": {\"layer\": string, \"action\": string, \"params\": object}}\n\
         {\"thinking\": string, \"status\": \"complete\", \"summary\": string}\n\
         {\"thinking\": string, \"status\": \"needs_help\", \"question\": string}\n\n\
         Available commands:\n",
    );
    for doc in CATALOG {
        out.push_str(&format!(
            "- {}.{} {} — {}\n",
            doc.layer, doc.action, doc.params, doc.description
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_lists_every_catalog_entry() {
        let prompt = system_prompt();
        for doc in CATALOG {
            assert!(
                prompt.contains(&format!("{}.{}", doc.layer, doc.action)),
                "missing {}.{} in system prompt",
                doc.layer,
                doc.action
            );
        }
    }

    #[test]
    fn system_prompt_states_the_reply_grammar() {
        let prompt = system_prompt();
        assert!(prompt.contains("\"status\": \"complete\""));
        assert!(prompt.contains("\"status\": \"needs_help\""));
    }
}
