//! Evaluation prompt assembly.

use taskeval_core::types::Task;

/// Builds the review prompt for a task.
///
/// The model is asked for bug fixes, refactoring suggestions, and
/// performance improvements, plus a rewritten version of the snippet,
/// all wrapped in a single JSON object.
pub fn build_prompt(task: &Task) -> String {
    let context = task
        .description
        .as_deref()
        .map(|d| format!("\nContext: {d}\n"))
        .unwrap_or_default();

    format!(
        r#"You are an expert code reviewer and software engineer. Your task is to comprehensively evaluate the following {language} code.

Your evaluation MUST focus on three main areas:
1. **Bug Fixes** - Identify any bugs, errors, edge cases, or potential runtime issues
2. **Refactoring** - Suggest improvements to code structure, readability, maintainability, and design patterns
3. **Performance Improvements** - Identify performance bottlenecks, inefficiencies, and optimization opportunities

Code to review:
```{language}
{code}
```
{context}
**IMPORTANT**: You must also provide a complete rewritten version of the code with ALL improvements applied.

Provide your response in the following JSON format:
{{
  "score": <number 0-100>,
  "strengths": [<string>, ...],
  "improvements": [<string>, ...],
  "fullReport": "<detailed analysis covering bug fixes, refactoring, and performance>",
  "fixedCode": "<complete rewritten code with all improvements applied>"
}}"#,
        language = task.language,
        code = task.code,
        context = context,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_prompt_includes_code_and_language() {
        let task = Task::new(Uuid::new_v4(), "t", "python", "def f(): pass");
        let prompt = build_prompt(&task);

        assert!(prompt.contains("python"));
        assert!(prompt.contains("def f(): pass"));
        assert!(prompt.contains("fullReport"));
        assert!(!prompt.contains("Context:"));
    }

    #[test]
    fn test_prompt_includes_description_when_present() {
        let task =
            Task::new(Uuid::new_v4(), "t", "rust", "fn f() {}").with_description("a no-op");
        let prompt = build_prompt(&task);

        assert!(prompt.contains("Context: a no-op"));
    }
}
