use chatweave_llm::ResponseSchema;
use serde_json::json;

fn probability() -> serde_json::Value {
    json!({ "type": "number", "minimum": 0.0, "maximum": 1.0 })
}

pub fn thread_classification_schema() -> ResponseSchema {
    ResponseSchema::new(
        "thread_classification",
        json!({
            "type": "object",
            "properties": {
                "matches": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "thread_id": { "type": "string" },
                            "probability": probability(),
                            "reasoning": { "type": "string", "maxLength": 4096 }
                        },
                        "required": ["thread_id", "probability", "reasoning"]
                    }
                },
                "new_thread_suggestion": {
                    "type": "object",
                    "properties": {
                        "theme": { "type": "string", "maxLength": 200 },
                        "probability": probability()
                    },
                    "required": ["theme", "probability"]
                }
            },
            "required": ["matches"]
        }),
    )
}

pub fn thread_summary_schema() -> ResponseSchema {
    ResponseSchema::new(
        "thread_summary",
        json!({
            "type": "object",
            "properties": {
                "theme": { "type": "string", "maxLength": 200 },
                "summary": { "type": "string", "maxLength": 4096 }
            },
            "required": ["theme", "summary"]
        }),
    )
}

/// `suggested_strategy` is restricted to the registered strategy names
pub fn response_analysis_schema(strategy_names: &[String]) -> ResponseSchema {
    let mut names: Vec<serde_json::Value> = strategy_names.iter().map(|n| json!(n)).collect();
    names.push(json!(""));
    ResponseSchema::new(
        "response_analysis",
        json!({
            "type": "object",
            "properties": {
                "should_respond": { "type": "boolean" },
                "confidence": probability(),
                "reason": { "type": "string", "maxLength": 4096 },
                "suggested_strategy": { "type": "string", "enum": names }
            },
            "required": ["should_respond", "confidence", "reason"]
        }),
    )
}

pub fn user_information_schema() -> ResponseSchema {
    ResponseSchema::new(
        "user_information",
        json!({
            "type": "object",
            "properties": {
                "bio": { "type": "string", "maxLength": 300 },
                "interests": { "type": "array", "items": { "type": "string", "maxLength": 100 } },
                "hobbies": { "type": "array", "items": { "type": "string", "maxLength": 100 } }
            },
            "required": ["bio", "interests", "hobbies"]
        }),
    )
}

pub fn fact_check_needed_schema() -> ResponseSchema {
    ResponseSchema::new(
        "fact_check_needed",
        json!({
            "type": "object",
            "properties": {
                "needs_checking": { "type": "boolean" },
                "confidence": probability()
            },
            "required": ["needs_checking", "confidence"]
        }),
    )
}

pub fn fact_check_schema() -> ResponseSchema {
    ResponseSchema::new(
        "fact_check",
        json!({
            "type": "object",
            "properties": {
                "verified": { "type": "boolean" },
                "confidence": probability(),
                "explanation": { "type": "string", "maxLength": 2000 },
                "additional_info": { "type": "string", "maxLength": 2000 }
            },
            "required": ["verified", "confidence", "explanation"]
        }),
    )
}

pub fn agreements_schema() -> ResponseSchema {
    ResponseSchema::new(
        "agreements",
        json!({
            "type": "object",
            "properties": {
                "agreements": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "topic": { "type": "string" },
                            "decision": { "type": "string" },
                            "participants": { "type": "array", "items": { "type": "string" } },
                            "confidence": probability()
                        },
                        "required": ["topic", "decision"]
                    }
                }
            },
            "required": ["agreements"]
        }),
    )
}

pub fn reminders_schema() -> ResponseSchema {
    ResponseSchema::new(
        "reminders",
        json!({
            "type": "object",
            "properties": {
                "reminders": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "person": { "type": "string" },
                            "action": { "type": "string" },
                            "deadline": { "type": "string" },
                            "priority": { "type": "string", "enum": ["high", "medium", "low"] }
                        },
                        "required": ["person", "action"]
                    }
                }
            },
            "required": ["reminders"]
        }),
    )
}

pub fn assessment_needed_schema() -> ResponseSchema {
    ResponseSchema::new(
        "assessment_needed",
        json!({
            "type": "object",
            "properties": {
                "should_respond": { "type": "boolean" },
                "confidence": probability(),
                "reason": { "type": "string" }
            },
            "required": ["should_respond", "confidence"]
        }),
    )
}

pub fn assessment_schema() -> ResponseSchema {
    ResponseSchema::new(
        "assessment",
        json!({
            "type": "object",
            "properties": {
                "score": { "type": "integer", "minimum": 0, "maximum": 10 },
                "feedback": { "type": "string", "maxLength": 2000 },
                "follow_up_needed": { "type": "boolean" },
                "follow_up_question": { "type": "string" }
            },
            "required": ["score", "feedback", "follow_up_needed"]
        }),
    )
}
