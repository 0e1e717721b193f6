use crate::tools::ToolRegistry;

/// System prompt for the analysis run. Lists the registered tools so the
/// model sees the same capability set it can call.
pub fn analyst_system_prompt(registry: &ToolRegistry) -> String {
    let tools = registry
        .specs()
        .iter()
        .map(|spec| format!("- `{}`: {}", spec.name, spec.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a stock analysis assistant. You produce advisory text only; you do not place \
         orders or manage positions.\n\n\
         ## TOOLS\n\n\
         {tools}\n\n\
         Each tool takes a single `query` string that names the ticker, for example \"TSLA\". \
         Call the tools you need, one or several, and read each result before deciding whether \
         another call is useful. A tool result that starts with \"Error\" or \"Validation error\" \
         means that signal is unavailable; say so rather than guessing values.\n\n\
         ## ANSWER\n\n\
         When you have enough information, answer in plain prose:\n\
         - State a clear recommendation using one of the words BUY, SELL or HOLD.\n\
         - Explain the reasoning from the technical, fundamental and risk signals you used.\n\
         - Mention any data that was missing or defaulted.\n\
         Keep the answer under 200 words."
    )
}

/// The task line handed to the model for one analysis.
pub fn analysis_task(ticker: &str, focus: Option<&str>) -> String {
    match focus {
        Some(focus) => format!("Analyze {ticker} stock with focus on: {focus}"),
        None => format!("Analyze {ticker} stock"),
    }
}
