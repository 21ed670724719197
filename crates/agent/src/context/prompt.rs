//! Prompt construction for the decision call and the summary call.

use sift_core::state::AgentState;
use sift_core::tool::{ToolKind, ToolRegistry};
use std::fmt::Write;

/// The pseudo-action that ends the loop with `action_input` as the answer.
pub const FINAL_ANSWER: &str = "Final Answer";

/// Build the decision prompt for the next step of `state`.
pub fn build_prompt(state: &AgentState, tools: &ToolRegistry) -> String {
    let descriptors = tools.descriptors();
    let first_attempt = state.step_count() == 0;

    let mut prompt = String::from(
        "You are an AI web scraping assistant. Your job is to help users extract information from websites.\n\n",
    );

    prompt.push_str("🛠️ **AVAILABLE TOOLS:**\n");
    for (i, tool) in descriptors.iter().enumerate() {
        let _ = writeln!(prompt, "  {}. **{}**: {}", i + 1, tool.name, tool.description);
    }

    let _ = write!(
        prompt,
        "\n📋 **USER REQUEST:**\n\"{}\"\n\n",
        state.user_request()
    );

    prompt.push_str("📝 **CONTEXT:** ");
    if first_attempt {
        prompt.push_str("**First attempt.** Choose the best tool for the task.\n\n");
    } else {
        prompt.push_str(
            "**Previous attempts recorded below.** Learn from any failures and try a different approach if needed.\n\n",
        );
        let _ = write!(prompt, "**WORK LOG:**\n{}\n\n", state.scratchpad());
    }

    prompt.push_str("---\n\n⚡ **YOUR TASK:**\n");
    prompt.push_str("1. Read the user's request carefully\n");
    prompt.push_str("2. Select the most appropriate tool\n");
    prompt.push_str("3. Provide the exact input needed (for URLs, include the full URL)\n\n");

    let url_tool = descriptors
        .iter()
        .find(|d| d.kind == ToolKind::Scrape)
        .or_else(|| descriptors.iter().find(|d| d.kind.fetches_url()))
        .map(|d| d.name.as_str());

    prompt.push_str("🎯 **DECISION RULES:**\n");
    if let Some(tool) = url_tool {
        let _ = writeln!(prompt, "- For \"scrape [url]\" → use **{tool}** to get the full content");
        let _ = writeln!(
            prompt,
            "- For \"resume/resumen/summarize [url]\" → use **{tool}** (the result is summarized automatically)"
        );
        prompt.push_str("- JavaScript-heavy sites are handled automatically\n");
    }
    prompt.push_str("- DO NOT call the same tool twice with the same input\n");
    prompt.push_str("- If a previous attempt failed, the site may not be accessible\n\n");

    prompt.push_str("📤 **RESPONSE FORMAT** (JSON only, no markdown, no extra text):\n");
    let _ = writeln!(
        prompt,
        "{{\"thought\": \"what you are doing and why\", \"action\": \"{}\", \"action_input\": \"...\"}}\n",
        url_tool.unwrap_or(FINAL_ANSWER)
    );

    let mut actions: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
    actions.push(FINAL_ANSWER);
    let _ = write!(prompt, "**Valid actions:** {}\n\n", actions.join(", "));

    prompt.push_str("**EXAMPLES:**\n");
    if let Some(tool) = url_tool {
        let _ = write!(
            prompt,
            "Input: \"scrape https://example.com\"\n\
             Output: {{\"thought\": \"I need to extract content from this URL\", \"action\": \"{tool}\", \"action_input\": \"https://example.com\"}}\n\n\
             Input: \"summarize https://news.com/article\"\n\
             Output: {{\"thought\": \"The user wants a summary, so I scrape and let the system summarize\", \"action\": \"{tool}\", \"action_input\": \"https://news.com/article\"}}\n\n"
        );
    }
    prompt.push_str(
        "Input: \"What is 2+2?\"\n\
         Output: {\"thought\": \"This is a simple question, I can answer directly\", \"action\": \"Final Answer\", \"action_input\": \"4\"}\n\n",
    );

    prompt.push_str("🤖 **Your response (JSON only):**");
    prompt
}

/// Prompt asking for a plain-text summary of `content`. `language` is an
/// English language name; `None` defers to the language of the request.
pub fn summary_prompt(content: &str, language: Option<&str>) -> String {
    let language_rule = match language {
        Some(lang) => format!("- Write in {lang}"),
        None => "- Write in the same language as the user's request".to_string(),
    };
    format!(
        "You are a professional summarizer. Create a concise, well-structured summary.\n\n\
         CONTENT TO SUMMARIZE:\n{content}\n\n\
         INSTRUCTIONS:\n{language_rule}\n\
         - Focus on the most important information\n\
         - Be clear and direct\n\
         - No markdown, just plain text\n\n\
         SUMMARY:"
    )
}
