// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Output discipline appended to every prompt that expects JSON back.
/// Small local models ignore system prompts, so this travels inside the prompt body.
pub const JSON_ONLY_INSTRUCTION: &str = "\
- Respond ONLY with raw, valid JSON. No headings, no explanations, no natural language.
- Do NOT wrap the JSON in triple backticks or any markdown.
- Do NOT add notes or comments before or after the JSON.";
