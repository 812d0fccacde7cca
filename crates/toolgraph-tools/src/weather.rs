//! Simulated weather lookup

use async_trait::async_trait;
use toolgraph_core::{ParameterSchema, Tool, ToolError, ToolParams, ToolSchema};

const FORECASTS: &[(&str, &str)] = &[
    ("北京", "晴朗，温度26°C"),
    ("上海", "多云，温度24°C"),
    ("广州", "小雨，温度28°C"),
    ("深圳", "阴天，温度27°C"),
];

pub struct WeatherTool;

impl WeatherTool {
    fn forecast(location: &str) -> &'static str {
        FORECASTS
            .iter()
            .find(|(city, _)| *city == location)
            .map_or("无法获取天气信息", |(_, forecast)| forecast)
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "weather".into(),
            description: "查询指定地点的天气情况".into(),
            parameters: vec![ParameterSchema::required(
                "location",
                "要查询天气的地点，例如'北京'",
            )],
        }
    }

    async fn invoke(&self, params: &ToolParams) -> Result<String, ToolError> {
        let location = params
            .get("location")
            .map(|l| l.trim())
            .ok_or_else(|| ToolError::missing_param("location"))?;

        Ok(format!("{location}的天气: {}", Self::forecast(location)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(location: &str) -> ToolParams {
        ToolParams::from([("location".to_string(), location.to_string())])
    }

    #[tokio::test]
    async fn test_known_city() {
        let out = WeatherTool.invoke(&params("北京")).await.unwrap();
        assert_eq!(out, "北京的天气: 晴朗，温度26°C");
    }

    #[tokio::test]
    async fn test_unknown_city_is_not_an_error() {
        let out = WeatherTool.invoke(&params("Paris")).await.unwrap();
        assert_eq!(out, "Paris的天气: 无法获取天气信息");
    }

    #[tokio::test]
    async fn test_missing_location() {
        let err = WeatherTool.invoke(&ToolParams::new()).await.unwrap_err();
        assert_eq!(err.message, "missing required parameter: location");
    }
}
