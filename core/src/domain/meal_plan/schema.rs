use serde_json::json;

fn macro_totals_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "calories": { "type": "number", "minimum": 0 },
            "protein": { "type": "number", "minimum": 0 },
            "carbs": { "type": "number", "minimum": 0 },
            "fat": { "type": "number", "minimum": 0 }
        },
        "required": ["calories", "protein", "carbs", "fat"]
    })
}

/// Returns the JSON schema for a 1-2 day chunk of generated meals
pub fn get_day_chunk_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "daily_target": macro_totals_schema(),
            "days": {
                "type": "array",
                "minItems": 1,
                "maxItems": 2,
                "items": {
                    "type": "object",
                    "properties": {
                        "date": {
                            "type": "string",
                            "description": "Date in YYYY-MM-DD format"
                        },
                        "day_name": {
                            "type": "string",
                            "enum": [
                                "Monday", "Tuesday", "Wednesday", "Thursday",
                                "Friday", "Saturday", "Sunday"
                            ]
                        },
                        "meals": {
                            "type": "array",
                            "minItems": 1,
                            "items": {
                                "type": "object",
                                "properties": {
                                    "id": { "type": "string" },
                                    "name": { "type": "string", "minLength": 1 },
                                    "meal_type": {
                                        "type": "string",
                                        "enum": ["breakfast", "lunch", "dinner", "snack"]
                                    },
                                    "foods": {
                                        "type": "array",
                                        "minItems": 1,
                                        "items": {
                                            "type": "object",
                                            "properties": {
                                                "name": { "type": "string", "minLength": 1 },
                                                "quantity_g": { "type": "number", "exclusiveMinimum": 0 },
                                                "calories": { "type": "number", "minimum": 0 },
                                                "protein": { "type": "number", "minimum": 0 },
                                                "carbs": { "type": "number", "minimum": 0 },
                                                "fat": { "type": "number", "minimum": 0 }
                                            },
                                            "required": [
                                                "name", "quantity_g", "calories",
                                                "protein", "carbs", "fat"
                                            ]
                                        }
                                    },
                                    "totals": macro_totals_schema()
                                },
                                "required": ["id", "name", "meal_type", "foods", "totals"]
                            }
                        },
                        "daily_totals": macro_totals_schema()
                    },
                    "required": ["date", "day_name", "meals", "daily_totals"]
                }
            }
        },
        "required": ["daily_target", "days"]
    })
}
