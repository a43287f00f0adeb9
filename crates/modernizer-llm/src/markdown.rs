/// Strip a surrounding Markdown code fence from a model reply.
///
/// ````text
/// ```java
/// void init() {}
/// ```
/// ````
///
/// becomes `void init() {}`. Replies without a fence are only trimmed.
pub fn strip_code_fence(text: &str) -> String {
    let mut text = text.trim();
    if text.starts_with("```") {
        if let Some(newline) = text.find('\n') {
            text = &text[newline + 1..];
        }
        if let Some(stripped) = text.strip_suffix("```") {
            text = stripped;
        }
    }
    text.trim().to_string()
}
