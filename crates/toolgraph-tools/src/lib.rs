//! # toolgraph-tools
//!
//! Built-in tools: an arithmetic `calculator` and a simulated `weather`
//! lookup.

pub mod calculator;
pub mod weather;

pub use calculator::CalculatorTool;
pub use weather::WeatherTool;

use toolgraph_core::ToolRegistry;

/// Registry with every built-in tool
pub fn default_registry() -> ToolRegistry {
    let mut tools = ToolRegistry::new();
    tools.register(CalculatorTool);
    tools.register(WeatherTool);
    tools
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let tools = default_registry();
        assert_eq!(tools.names(), vec!["calculator", "weather"]);
        assert!(tools.render_prompt_section().contains("- weather: 查询指定地点的天气情况"));
    }

    #[tokio::test]
    async fn test_registry_validates_before_invoking() {
        let tools = default_registry();
        let calculator = tools.resolve("calculator").unwrap();
        let err = tools
            .invoke(calculator.as_ref(), &Default::default())
            .await
            .unwrap_err();
        assert_eq!(err.message, "missing required parameter: expression");
    }
}
