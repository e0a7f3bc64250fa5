use serde_json::json;

use crate::domain::llm::entities::ToolDefinition;

pub const WEEKLY_DAYS_RANGE: (i64, i64) = (1, 30);
pub const WEEKLY_DAYS_DEFAULT: i64 = 7;
pub const PATTERN_DAYS_RANGE: (i64, i64) = (7, 90);
pub const PATTERN_DAYS_DEFAULT: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoachTool {
    TodayStatus,
    WeeklyProgress,
    PatternAnalysis,
}

impl CoachTool {
    pub const ALL: [CoachTool; 3] = [
        CoachTool::TodayStatus,
        CoachTool::WeeklyProgress,
        CoachTool::PatternAnalysis,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CoachTool::TodayStatus => "fetch_today_status",
            CoachTool::WeeklyProgress => "fetch_weekly_progress",
            CoachTool::PatternAnalysis => "fetch_pattern_analysis",
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        let (description, input_schema) = match self {
            CoachTool::TodayStatus => (
                "Fetch today's nutrition status with current totals and remaining targets. \
                 Use when the user asks about their progress today.",
                json!({ "type": "object", "properties": {} }),
            ),
            CoachTool::WeeklyProgress => (
                "Fetch a multi-day progress summary with averages, consistency and target hit rates. \
                 Use when the user asks about recent trends or their week.",
                json!({
                    "type": "object",
                    "properties": {
                        "days": {
                            "type": "integer",
                            "minimum": WEEKLY_DAYS_RANGE.0,
                            "maximum": WEEKLY_DAYS_RANGE.1,
                            "description": "Number of days to analyze (default 7)"
                        }
                    }
                }),
            ),
            CoachTool::PatternAnalysis => (
                "Analyze eating patterns over time, either weekday versus weekend or macro consistency. \
                 Use when the user asks about long-term trends or recurring struggles.",
                json!({
                    "type": "object",
                    "properties": {
                        "days": {
                            "type": "integer",
                            "minimum": PATTERN_DAYS_RANGE.0,
                            "maximum": PATTERN_DAYS_RANGE.1,
                            "description": "Number of days to analyze (default 30)"
                        },
                        "pattern_type": {
                            "type": "string",
                            "enum": ["weekday_weekend", "macro_consistency"],
                            "description": "Kind of analysis (default weekday_weekend)"
                        }
                    }
                }),
            ),
        };

        ToolDefinition {
            name: self.name().to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// The tools a coach agent may expose and run. Order of registration is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSet {
    tools: Vec<CoachTool>,
}

impl ToolSet {
    pub fn new(tools: Vec<CoachTool>) -> Self {
        let mut registered: Vec<CoachTool> = Vec::with_capacity(tools.len());
        for tool in tools {
            if !registered.contains(&tool) {
                registered.push(tool);
            }
        }
        Self { tools: registered }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(CoachTool::definition).collect()
    }

    pub fn find(&self, name: &str) -> Option<CoachTool> {
        self.tools.iter().copied().find(|t| t.name() == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_set_only_exposes_registered_tools() {
        let tools = ToolSet::new(vec![CoachTool::TodayStatus, CoachTool::TodayStatus]);

        assert_eq!(tools.len(), 1);
        assert_eq!(tools.definitions()[0].name, "fetch_today_status");
        assert!(tools.find("fetch_weekly_progress").is_none());
    }

    #[test]
    fn test_definitions_keep_registration_order() {
        let tools = ToolSet::new(vec![CoachTool::PatternAnalysis, CoachTool::WeeklyProgress]);
        let names: Vec<String> = tools.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["fetch_pattern_analysis", "fetch_weekly_progress"]);
    }
}
