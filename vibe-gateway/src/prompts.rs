//! Prompt assembly for the upstream model

/// Reply used when the model answers with nothing
pub const EMPTY_REPLY: &str = "My brain glitched 💀 Try again?";

/// Feedback used when validation cannot produce a verdict
pub const VALIDATION_APOLOGY: &str = "My brain glitched checking that. Try again?";

/// Persona prompt with the learner's current code appended
pub fn with_code_context(system_prompt: &str, current_code: &str) -> String {
    format!("{system_prompt}\n[CURRENT CODE]:\n```html\n{current_code}\n```")
}

/// Reviewer prompt asking for a `{passed, feedback}` JSON object
pub fn review(objective: &str, criteria: &str, code: &str) -> String {
    format!(
        r#"Act as a code reviewer.
Lesson Objective: "{objective}"
Validation Criteria: "{criteria}"

User Code:
```html
{code}
```

Task: Check if the code meets the objective.
Output: JSON object with keys: "passed" (boolean) and "feedback" (string, max 2 sentences, encouraging slang)."#
    )
}
