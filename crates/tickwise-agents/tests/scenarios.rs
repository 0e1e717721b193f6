//! End-to-end scenarios: signal tools over a stub provider, and the
//! orchestrator driven by a scripted model backend.

use std::sync::Arc;

use tickwise_agents::test_support::{
    analyzer, call_tools, orchestrator, tool_context, ScriptedBackend, ScriptedTurn,
};
use tickwise_agents::{AgentError, ModelTurn, ToolRegistry};
use tickwise_market::test_support::{synthetic_market_series, StubProvider};
use tickwise_models::{
    Confidence, Fundamentals, LlmConfig, ProviderKind, Recommendation, RiskLevel, ValidationError,
};

fn registry(stub: &Arc<StubProvider>) -> ToolRegistry {
    ToolRegistry::standard(tool_context(stub.clone()))
}

fn backend(turns: Vec<ModelTurn>) -> Arc<ScriptedBackend> {
    Arc::new(ScriptedBackend::new(
        ProviderKind::Anthropic,
        "claude-sonnet-4-0",
        turns,
    ))
}

#[tokio::test]
async fn market_data_tool_reports_synthetic_series() {
    let stub = Arc::new(StubProvider::new().with_series(synthetic_market_series("TSLA")));
    let tool = registry(&stub).get("get_market_data").unwrap();

    let output = tool.invoke("TSLA").await;

    assert!(
        output.contains(
            "Price=$250.00, Change=2.04%, Volume=1,000,000, RSI=55.0, 20SMA=$240.00, 50SMA=$230.00"
        ),
        "unexpected output: {output}"
    );
    assert!(output.starts_with("TSLA Market Data: "));
}

#[tokio::test]
async fn ticker_is_extracted_from_natural_language() {
    let stub = Arc::new(StubProvider::new().with_series(synthetic_market_series("NVDA")));
    let tool = registry(&stub).get("get_market_data").unwrap();

    let output = tool.invoke("should I buy NVDA now").await;

    assert!(output.starts_with("NVDA Market Data: "), "unexpected output: {output}");
    assert_eq!(stub.history_calls("NVDA"), 1);
    assert_eq!(stub.history_calls("TSLA"), 0);
}

#[tokio::test]
async fn query_without_ticker_uses_default_symbol() {
    let stub = Arc::new(StubProvider::new().with_series(synthetic_market_series("TSLA")));
    let tool = registry(&stub).get("technical_analysis").unwrap();

    let output = tool.invoke("should I buy now").await;

    assert!(output.starts_with("TSLA Technical Analysis: RSI=55.0 (Neutral)"), "{output}");
    assert_eq!(stub.history_calls("TSLA"), 1);
}

#[tokio::test]
async fn always_empty_upstream_yields_error_after_three_attempts() {
    let stub = Arc::new(StubProvider::new().with_empty_history("TSLA"));
    let registry = registry(&stub);

    let output = registry.get("get_market_data").unwrap().invoke("TSLA").await;
    assert_eq!(output, "Error: Unable to fetch TSLA market data after multiple attempts");
    assert_eq!(stub.history_calls("TSLA"), 3);

    let output = registry.get("risk_assessment").unwrap().invoke("TSLA").await;
    assert_eq!(
        output,
        "Error: Unable to fetch TSLA data for risk assessment after multiple attempts"
    );
    assert_eq!(stub.history_calls("TSLA"), 6);
}

#[tokio::test]
async fn short_history_is_reported_as_insufficient() {
    let short = tickwise_market::test_support::series_from_closes("AMD", &[100.0; 30], 500);
    let stub = Arc::new(StubProvider::new().with_series(short));
    let tool = registry(&stub).get("get_market_data").unwrap();

    let output = tool.invoke("AMD").await;

    assert_eq!(
        output,
        "Error: Insufficient data for AMD - need at least 50 days of trading data"
    );
}

#[tokio::test]
async fn overlong_tool_input_is_a_validation_error() {
    let stub = Arc::new(StubProvider::new());
    let tool = registry(&stub).get("fundamental_analysis").unwrap();

    let output = tool.invoke(&"x".repeat(201)).await;

    assert!(output.starts_with("Validation error: "), "{output}");
    assert_eq!(stub.info_calls(), 0);
}

#[tokio::test]
async fn failing_benchmark_falls_back_to_neutral_beta() {
    let stub = Arc::new(
        StubProvider::new()
            .with_series(synthetic_market_series("TSLA"))
            .with_history_failure("SPY", "benchmark down"),
    );
    let tool = registry(&stub).get("risk_assessment").unwrap();

    let output = tool.invoke("TSLA").await;

    assert_eq!(
        output,
        "TSLA Risk Assessment: Volatility=43.8%, Beta=1.50, Risk Level=Low (Score: 2), \
         Factors: Moderate volatility, Elevated beta \
         (Note: benchmark unavailable, neutral beta 1.5 used; defaulted to 0: Debt/Equity, Profit Margin)"
    );
    assert_eq!(stub.history_calls("SPY"), 1);
}

#[tokio::test]
async fn empty_benchmark_also_uses_neutral_beta() {
    let stub = Arc::new(
        StubProvider::new()
            .with_series(synthetic_market_series("TSLA"))
            .with_empty_history("SPY")
            .with_info(
                "TSLA",
                Fundamentals {
                    debt_to_equity: Some(17.08),
                    profit_margins: Some(0.07),
                    ..Default::default()
                },
            ),
    );
    let tool = registry(&stub).get("risk_assessment").unwrap();

    let output = tool.invoke("TSLA").await;

    assert!(output.contains("Beta=1.50"), "{output}");
    assert!(output.contains("Risk Level=Medium (Score: 4)"), "{output}");
    assert!(output.contains("High debt levels"), "{output}");
    assert!(output.ends_with("(Note: benchmark unavailable, neutral beta 1.5 used)"));
}

#[tokio::test]
async fn invalid_ticker_fails_before_any_fetch() {
    let stub = Arc::new(StubProvider::new());
    let model = backend(vec![ModelTurn::Final("BUY".to_string())]);
    let analyzer = analyzer(stub.clone(), model.clone());

    let err = analyzer.analyze("tsla123", None).await.unwrap_err();

    assert!(matches!(
        err,
        AgentError::Validation(ValidationError::InvalidTicker(_))
    ));
    assert_eq!(stub.total_history_calls(), 0);
    assert_eq!(stub.info_calls(), 0);
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn overlong_query_is_rejected() {
    let stub = Arc::new(StubProvider::new());
    let analyzer = analyzer(stub.clone(), backend(vec![]));

    let err = analyzer
        .analyze("TSLA", Some("q".repeat(501).as_str()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AgentError::Validation(ValidationError::InvalidQuery(_))
    ));
    assert_eq!(stub.total_history_calls(), 0);
}

#[tokio::test]
async fn full_analysis_dispatches_tools_and_classifies() {
    let stub = Arc::new(StubProvider::new().with_series(synthetic_market_series("TSLA")));
    let model = backend(vec![
        call_tools(&[("get_market_data", "TSLA"), ("risk_assessment", "TSLA")]),
        call_tools(&[("technical_analysis", "TSLA")]),
        ModelTurn::Final("Momentum is healthy. I recommend a BUY with a tight stop.".to_string()),
    ]);
    let analyzer = analyzer(stub.clone(), model.clone());

    let report = analyzer.analyze("tsla", Some("should I buy?")).await.unwrap();

    assert_eq!(report.ticker.as_str(), "TSLA");
    assert_eq!(report.recommendation, Recommendation::Buy);
    assert_eq!(report.confidence, Confidence::High);
    assert_eq!(report.risk_level, RiskLevel::Low);
    assert!(report.risk_level_assessed);
    assert_eq!(
        report.tools_invoked,
        vec!["get_market_data", "risk_assessment", "technical_analysis"]
    );
    assert_eq!(report.provider, "anthropic");
    assert_eq!(report.model, "claude-sonnet-4-0");

    let market = report.market.unwrap();
    assert!((market.price - 250.0).abs() < 1e-9);
    assert_eq!(market.volume, 1_000_000);
    assert!(report.market_data.starts_with("TSLA Market Data: Price=$250.00"));

    let requests = model.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].tools.len(), 4);
    assert_eq!(
        requests[0].messages[0],
        tickwise_agents::backends::Message::User {
            content: "Analyze TSLA stock with focus on: should I buy?".to_string()
        }
    );
    // user, assistant, two tool results
    assert_eq!(requests[1].messages.len(), 4);
    assert_eq!(requests[2].messages.len(), 6);
}

#[tokio::test]
async fn no_risk_tool_means_default_medium_and_hold() {
    let stub = Arc::new(StubProvider::new().with_series(synthetic_market_series("AAPL")));
    let model = backend(vec![ModelTurn::Final(
        "Signals are mixed; wait for confirmation.".to_string(),
    )]);
    let analyzer = analyzer(stub, model);

    let report = analyzer.analyze("AAPL", None).await.unwrap();

    assert_eq!(report.recommendation, Recommendation::Hold);
    assert_eq!(report.confidence, Confidence::Medium);
    assert_eq!(report.risk_level, RiskLevel::Medium);
    assert!(!report.risk_level_assessed);
    assert!(report.tools_invoked.is_empty());
}

#[tokio::test]
async fn market_snapshot_failure_does_not_abort_analysis() {
    let stub = Arc::new(StubProvider::new().with_empty_history("MSFT"));
    let model = backend(vec![ModelTurn::Final("Strong sell.".to_string())]);
    let analyzer = analyzer(stub, model);

    let report = analyzer.analyze("msft", None).await.unwrap();

    assert!(report.market.is_none());
    assert_eq!(
        report.market_data,
        "Error: Unable to fetch MSFT market data after multiple attempts"
    );
    assert_eq!(report.recommendation, Recommendation::Sell);
    assert_eq!(report.confidence, Confidence::High);
}

#[tokio::test]
async fn reasoning_is_truncated_for_display() {
    let stub = Arc::new(StubProvider::new().with_series(synthetic_market_series("TSLA")));
    let model = backend(vec![ModelTurn::Final("hold ".repeat(400))]);
    let analyzer = analyzer(stub, model);

    let report = analyzer.analyze("TSLA", None).await.unwrap();

    assert_eq!(report.reasoning.chars().count(), 1024);
}

#[tokio::test]
async fn unknown_tool_is_a_single_failure() {
    let stub = Arc::new(StubProvider::new());
    let model = backend(vec![call_tools(&[("place_order", "TSLA")])]);
    let orchestrator = orchestrator(stub.clone(), model.clone(), LlmConfig::default());

    let err = orchestrator.run("Analyze TSLA stock").await.unwrap_err();

    assert!(matches!(err, AgentError::UnknownTool(name) if name == "place_order"));
    assert_eq!(model.calls(), 1);
    assert_eq!(stub.total_history_calls(), 0);
}

#[tokio::test]
async fn backend_failure_is_not_retried() {
    let stub = Arc::new(StubProvider::new());
    let model = Arc::new(ScriptedBackend::with_script(
        ProviderKind::OpenAi,
        "gpt-4",
        vec![
            ScriptedTurn::Fail("503 overloaded".to_string()),
            ScriptedTurn::Turn(ModelTurn::Final("BUY".to_string())),
        ],
    ));
    let orchestrator = orchestrator(stub, model.clone(), LlmConfig::default());

    let err = orchestrator.run("Analyze TSLA stock").await.unwrap_err();

    assert!(matches!(err, AgentError::Backend(_)));
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn tool_rounds_are_bounded() {
    let stub = Arc::new(StubProvider::new().with_series(synthetic_market_series("TSLA")));
    let model = backend(vec![
        call_tools(&[("get_market_data", "TSLA")]),
        call_tools(&[("get_market_data", "TSLA")]),
        call_tools(&[("get_market_data", "TSLA")]),
        ModelTurn::Final("HOLD".to_string()),
    ]);
    let llm = LlmConfig {
        max_tool_rounds: 2,
        ..LlmConfig::default()
    };
    let orchestrator = orchestrator(stub.clone(), model, llm);

    let err = orchestrator.run("Analyze TSLA stock").await.unwrap_err();

    assert!(matches!(err, AgentError::ToolRoundsExceeded(2)));
    assert_eq!(stub.history_calls("TSLA"), 2);
}

#[tokio::test]
async fn tool_errors_reach_the_model_as_text() {
    let stub = Arc::new(StubProvider::new().with_info_failure("TSLA", "crumb rejected"));
    let model = backend(vec![
        call_tools(&[("fundamental_analysis", "TSLA")]),
        ModelTurn::Final("Fundamentals unavailable; HOLD.".to_string()),
    ]);
    let orchestrator = orchestrator(stub, model.clone(), LlmConfig::default());

    let run = orchestrator.run("Analyze TSLA stock").await.unwrap();

    assert_eq!(run.rounds, 1);
    assert_eq!(
        run.invocations[0].output,
        "Error in fundamental analysis: Provider error: crumb rejected"
    );
    let last = model.requests().pop().unwrap();
    assert_eq!(
        last.messages.last(),
        Some(&tickwise_agents::backends::Message::ToolResult {
            call_id: "call_0".to_string(),
            content: "Error in fundamental analysis: Provider error: crumb rejected".to_string(),
        })
    );
}

#[tokio::test]
async fn ticker_that_is_a_common_word_is_not_replaced_by_default() {
    let stub = Arc::new(
        StubProvider::new()
            .with_series(synthetic_market_series("NOW"))
            .with_series(synthetic_market_series("TSLA")),
    );
    let registry = registry(&stub);

    let output = registry.get("get_market_data").unwrap().invoke("NOW").await;
    assert!(output.starts_with("NOW Market Data: "), "unexpected output: {output}");

    let output = registry.get("technical_analysis").unwrap().invoke("ALL").await;
    assert!(output.starts_with("Error: Unable to fetch data for ALL"), "{output}");

    assert_eq!(stub.history_calls("NOW"), 1);
    assert_eq!(stub.history_calls("ALL"), 3);
    assert_eq!(stub.history_calls("TSLA"), 0);
}

#[tokio::test]
async fn analysis_of_common_word_ticker_fetches_that_ticker() {
    let stub = Arc::new(
        StubProvider::new()
            .with_series(synthetic_market_series("NOW"))
            .with_series(synthetic_market_series("TSLA")),
    );
    let model = backend(vec![
        call_tools(&[("get_market_data", "NOW stock"), ("risk_assessment", "NOW")]),
        ModelTurn::Final("Hold for now.".to_string()),
    ]);
    let analyzer = analyzer(stub.clone(), model);

    let report = analyzer.analyze("now", None).await.unwrap();

    assert_eq!(report.ticker.as_str(), "NOW");
    assert!(report.market_data.starts_with("NOW Market Data: "));
    assert_eq!(stub.history_calls("NOW"), 3);
    assert_eq!(stub.history_calls("TSLA"), 0);
}
