//! Prompt text and response schemas for every backend call the engine makes

mod schemas;
mod templates;

pub use schemas::*;
pub use templates::*;

/// Stable `GenerateRequest::purpose` labels
pub mod purpose {
    pub const THREAD_CLASSIFICATION: &str = "thread_classification";
    pub const THREAD_SUMMARY: &str = "thread_summary";
    pub const RESPONSE_ANALYSIS: &str = "response_analysis";
    pub const GENERAL_RESPONSE: &str = "general_response";
    pub const USER_INFORMATION: &str = "user_information";
    pub const INTRODUCTION_CONFIRMATION: &str = "introduction_confirmation";
    pub const FACT_CHECK_NEEDED: &str = "fact_check_needed";
    pub const FACT_CHECK: &str = "fact_check";
    pub const AGREEMENTS: &str = "agreements";
    pub const REMINDERS: &str = "reminders";
    pub const ASSESSMENT_NEEDED: &str = "assessment_needed";
    pub const ASSESSMENT: &str = "assessment";
    pub const USER_QUESTION: &str = "user_question";
}
