//! Canned backend output used when no inference credential is configured

use serde_json::json;

use crate::models::Language;

/// Minimal MPEG audio frame header returned as demo speech
pub const DEMO_MP3_FRAME: [u8; 16] = [
    0xFF, 0xFB, 0x90, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Sample narration response text for `language`
pub fn narration_response(language: Language) -> String {
    let body = if language.is_zh() {
        json!({
            "summary": "本月整体业务表现良好。收入较上月增长12.5%，达到135,000美元，超过预警阈值。订单量保持稳定增长态势。",
            "highlights": [
                "月度收入增长12.5%，表现强劲",
                "订单转化率提升至3.2%",
                "电子产品类目贡献最大"
            ],
            "risks": [
                "新增客户数较上月下降5.2%，需关注获客渠道",
                "小程序渠道转化率下滑，可能需要优化体验"
            ],
            "nextActions": [
                "分析客户流失原因，优化获客策略",
                "排查小程序转化漏斗，找出瓶颈环节",
                "继续保持电子产品的营销投入"
            ]
        })
    } else {
        json!({
            "summary": "Overall business performance is strong this month. Revenue increased by 12.5% compared to last month, reaching $135,000, exceeding the warning threshold.",
            "highlights": [
                "Monthly revenue grew 12.5%, showing strong performance",
                "Order conversion rate improved to 3.2%",
                "Electronics category contributed the most"
            ],
            "risks": [
                "New customer acquisition dropped 5.2% MoM, need to monitor acquisition channels",
                "Mini program conversion rate declined, may need UX optimization"
            ],
            "nextActions": [
                "Analyze customer churn reasons and optimize acquisition strategy",
                "Audit mini program conversion funnel to identify bottlenecks",
                "Maintain marketing investment in electronics category"
            ]
        })
    };
    body.to_string()
}

/// Sample screenshot interpretation text for `language`
pub fn vision_response(language: Language) -> String {
    let body = if language.is_zh() {
        json!({
            "summary": "这是一个销售数据Dashboard，展示了月度收入、订单量和客户增长趋势。整体表现良好，收入呈上升趋势。",
            "text": "Dashboard包含4个核心指标面板：1）月度收入135,000美元，环比增长12.5%；2）订单数量1,234单；3）新增客户89人；4）转化率3.2%。收入趋势图显示稳步上升，但新客户增长有所放缓。",
            "highlights": [
                "月度收入达到135,000美元，超过预期",
                "转化率提升至3.2%，表现优异",
                "订单量保持稳定增长"
            ],
            "risks": [
                "新增客户数量下降5.2%，需要关注",
                "部分地区数据缺失"
            ],
            "next_actions": [
                "分析新客户下降原因",
                "优化获客渠道投放",
                "关注转化率持续性"
            ],
            "chart_types": ["line", "bar", "number"],
            "confidence": 0.88
        })
    } else {
        json!({
            "summary": "This is a sales data Dashboard showing monthly revenue, order volume, and customer growth trends. Overall performance is good with revenue trending upward.",
            "text": "The Dashboard contains 4 key metric panels: 1) Monthly revenue $135,000, up 12.5% MoM; 2) Order count 1,234; 3) New customers 89; 4) Conversion rate 3.2%.",
            "highlights": [
                "Monthly revenue reached $135,000, exceeding expectations",
                "Conversion rate improved to 3.2%",
                "Order volume maintains steady growth"
            ],
            "risks": [
                "New customer acquisition down 5.2%, needs attention",
                "Some regional data is missing"
            ],
            "next_actions": [
                "Analyze new customer decline reasons",
                "Optimize acquisition channel spending",
                "Monitor conversion rate sustainability"
            ],
            "chart_types": ["line", "bar", "number"],
            "confidence": 0.88
        })
    };
    body.to_string()
}
