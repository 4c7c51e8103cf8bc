//! Prompt construction for the narration and vision tasks
//!
//! Pure functions of caller input and language.

use crate::models::{Language, PanelDescriptor};

const NARRATION_INSTRUCTIONS_ZH: &str = r#"你是一位专业的数据分析师，擅长解读Dashboard数据并提供商业洞察。
请根据以下Panel数据生成结构化的解读报告。

要求：
1. 必须引用具体的数值和时间范围
2. 不得凭空猜测原因，需标注"可能"或"需验证"
3. 高亮异常数据（超过阈值或显著波动）
4. 输出JSON格式

输出格式：
{
  "summary": "整体概述（2-3句话）",
  "highlights": ["亮点1", "亮点2"],
  "risks": ["风险1", "风险2"],
  "nextActions": ["建议行动1", "建议行动2"]
}"#;

const NARRATION_INSTRUCTIONS_EN: &str = r#"You are a professional data analyst skilled at interpreting dashboard data and providing business insights.
Please generate a structured analysis report based on the following Panel data.

Requirements:
1. Must reference specific values and time ranges
2. Do not guess reasons without evidence, mark as "possibly" or "needs verification"
3. Highlight anomalies (threshold breaches or significant fluctuations)
4. Output in JSON format

Output format:
{
  "summary": "Overall summary (2-3 sentences)",
  "highlights": ["highlight1", "highlight2"],
  "risks": ["risk1", "risk2"],
  "nextActions": ["action1", "action2"]
}"#;

const VISION_INSTRUCTIONS_ZH: &str = r#"请分析这张Dashboard/图表截图，并提供结构化的解读。

要求：
1. 识别图表类型（折线图、柱状图、饼图等）
2. 提取关键数值和趋势
3. 标注异常或需要关注的点
4. 不要编造数据，如果看不清请标注
5. 给出0到1之间的置信度

输出JSON格式：
{
  "summary": "整体概述",
  "text": "详细解读文本",
  "highlights": ["亮点1", "亮点2"],
  "risks": ["风险1"],
  "next_actions": ["建议1"],
  "chart_types": ["line", "bar"],
  "confidence": 0.85
}"#;

const VISION_INSTRUCTIONS_EN: &str = r#"Please analyze this Dashboard/chart screenshot and provide a structured interpretation.

Requirements:
1. Identify chart types (line, bar, pie, etc.)
2. Extract key values and trends
3. Highlight anomalies or points of attention
4. Don't fabricate data, mark if unclear
5. Give a confidence between 0 and 1

Output JSON format:
{
  "summary": "Overall summary",
  "text": "Detailed interpretation",
  "highlights": ["highlight1", "highlight2"],
  "risks": ["risk1"],
  "next_actions": ["action1"],
  "chart_types": ["line", "bar"],
  "confidence": 0.85
}"#;

/// Render the narration prompt: instructions followed by the panel list as JSON
pub fn build_narration_prompt(
    panels: &[PanelDescriptor],
    language: Language,
) -> serde_json::Result<String> {
    let panel_data = serde_json::to_string_pretty(panels)?;

    let prompt = if language.is_zh() {
        format!(
            "{}\n\nPanel数据：\n{}\n\n请生成解读报告。",
            NARRATION_INSTRUCTIONS_ZH, panel_data
        )
    } else {
        format!(
            "{}\n\nPanel data:\n{}\n\nPlease generate the analysis report.",
            NARRATION_INSTRUCTIONS_EN, panel_data
        )
    };

    Ok(prompt)
}

/// Render the vision prompt; the image travels alongside it, not inside it
pub fn build_vision_prompt(language: Language) -> String {
    if language.is_zh() {
        VISION_INSTRUCTIONS_ZH.to_string()
    } else {
        VISION_INSTRUCTIONS_EN.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn revenue_panel() -> PanelDescriptor {
        serde_json::from_value(json!({
            "panelId": "revenue",
            "title": "收入趋势",
            "metricType": "time_series",
            "unit": "USD",
            "timeRange": "2025-01",
            "data": [{"t": "2025-01", "v": 100000}]
        }))
        .unwrap()
    }

    #[test]
    fn test_narration_prompt_embeds_panel_json() {
        let prompt = build_narration_prompt(&[revenue_panel()], Language::En).unwrap();
        assert!(prompt.starts_with("You are a professional data analyst"));
        assert!(prompt.contains("\"panelId\": \"revenue\""));
        assert!(prompt.contains("100000"));
        assert!(prompt.contains("\"nextActions\""));
    }

    #[test]
    fn test_narration_prompt_keeps_non_ascii() {
        let prompt = build_narration_prompt(&[revenue_panel()], Language::Zh).unwrap();
        assert!(prompt.contains("收入趋势"));
        assert!(prompt.contains("Panel数据"));
        assert!(prompt.contains("需验证"));
    }

    #[test]
    fn test_narration_prompt_is_deterministic() {
        let a = build_narration_prompt(&[revenue_panel()], Language::En).unwrap();
        let b = build_narration_prompt(&[revenue_panel()], Language::En).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_vision_prompt_asks_for_chart_types_and_confidence() {
        for language in [Language::Zh, Language::En] {
            let prompt = build_vision_prompt(language);
            assert!(prompt.contains("chart_types"));
            assert!(prompt.contains("confidence"));
        }
        assert!(build_vision_prompt(Language::En).contains("Don't fabricate data"));
        assert!(build_vision_prompt(Language::Zh).contains("不要编造数据"));
    }
}
