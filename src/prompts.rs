// src/prompts.rs

//! Prompt templates for the two language-model call sites: tool recognition
//! and answer synthesis (plus the error translator used on failed dispatches).

use serde_json::Value;

use crate::catalog::ToolDefinition;

/// Schema of the web-search pseudo-tool offered alongside the real catalog
/// entries. It is not part of the catalog: the dispatcher recognizes the
/// name and routes it to the search client instead of a backend.
pub const INTERNET_SEARCH_TOOL_NAME: &str = "internet_search";

const INTERNET_SEARCH_TOOL_PROMPT: &str = r#"- Name: internet_search
  Description: Performs a general internet search for broad questions, general knowledge, news, or topics not covered by the on-chain data tools. Use this only if no listed tool matches the query's intent.
  Parameters Schema: {"type":"object","properties":{"search_query":{"type":"string","description":"A concise web search query derived from the user's question."}},"required":["search_query"]}
"#;

/// Renders the tool-recognition prompt: the query, the target network, and
/// the serialized schema of every eligible tool plus the search pseudo-tool
/// and the `unknown` pseudo-option.
pub fn recognizer_prompt(query: &str, network: &str, tools: &[&ToolDefinition]) -> String {
    let mut tools_section = String::from("AVAILABLE TOOLS (CHOOSE ONE):\n");
    for tool in tools {
        tools_section.push_str(&format!("- Name: {}\n", tool.name));
        tools_section.push_str(&format!("  Description: {}\n", tool.description));
        if tool.parameters.is_empty() {
            tools_section.push_str("  Parameters Schema: {}\n\n");
        } else {
            let schema = serde_json::to_string(&tool.parameters).unwrap_or_default();
            tools_section.push_str(&format!("  Parameters Schema: {schema}\n\n"));
        }
    }
    tools_section.push_str(INTERNET_SEARCH_TOOL_PROMPT);

    format!(
        r#"You are an expert assistant for the Polkaquery system, specializing in the Polkadot ecosystem.
Your task is to understand user queries about the '{network}' network, select the most appropriate single tool
from the list of AVAILABLE TOOLS, and extract the parameters required by that tool from the user's query.

{tools_section}
User Query: "{query}"
Target Network: "{network}"

Instructions:
1. Analyze the User Query and the Target Network.
2. Choose the single best tool from the AVAILABLE TOOLS that can fulfill the user's request.
3. Extract all necessary parameters for the chosen tool from the User Query. Adhere strictly to the
   parameter types, enums and bounds defined in the tool's Parameters Schema. Ensure all 'required'
   parameters are present.
4. If no suitable tool is found, or required parameters are missing, respond with "intent": "unknown"
   and a "reason" inside "parameters".
5. Respond ONLY with a single, valid JSON object containing "intent" (the chosen tool's name) and
   "parameters" (an object with extracted parameter values).

Example response when a tool is chosen:
{{"intent": "chosen_tool_name", "parameters": {{"param1": "value1"}}}}

Example response when no tool is suitable:
{{"intent": "unknown", "parameters": {{"reason": "Could not find a suitable tool."}}}}

JSON Response:"#
    )
}

/// Renders the final-answer synthesis prompt. Large payloads are truncated
/// so a verbose backend reply cannot blow the model's context.
pub fn final_answer_prompt(
    query: &str,
    network: &str,
    source: &str,
    data: &Value,
) -> String {
    let mut data_summary = serde_json::to_string_pretty(data).unwrap_or_default();
    if data_summary.len() > 25_000 {
        data_summary.truncate(25_000);
        data_summary.push_str("\n... (data truncated)");
    }

    format!(
        r#"You are Polkaquery, a helpful assistant for the Polkadot ecosystem.
Answer the user's question in clear natural language using only the data below.

User Question: "{query}"
Target Network: "{network}"
Data Source: {source}
Data:
{data_summary}

Write a concise, accurate answer. If the data does not contain the answer, say so plainly.
Answer:"#
    )
}

/// Renders the error-translator prompt used when a dispatch failed and the
/// technical message needs turning into a user-facing explanation.
pub fn error_explanation_prompt(
    query: &str,
    tool_name: &str,
    parameters: &Value,
    error_message: &str,
) -> String {
    format!(
        r#"You are Polkaquery, a helpful assistant for the Polkadot ecosystem.
A data lookup on behalf of the user failed. Explain what went wrong in one or two friendly sentences,
without inventing data. Preserve any concrete limits or values mentioned in the error.

User Question: "{query}"
Tool Attempted: {tool_name}
Parameters: {parameters}
Error: {error_message}

Explanation:"#
    )
}
