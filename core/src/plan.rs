//! Plan synthesis: turn a completed intake into a support plan.
//!
//! The synthesizer never fails outward. When the generation backend is
//! unavailable it falls back to a deterministic, locally built plan so the
//! user always gets a usable result.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::catalog::DomainDefinition;

/// Response-length budget for the generation call.
pub const PLAN_MAX_TOKENS: u32 = 500;

/// Moderate creativity: varied phrasing, on-topic content.
pub const PLAN_TEMPERATURE: f32 = 0.7;

/// The terminal artifact of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlanResult {
    /// Display name of the selected stress domain
    pub stress_area: String,
    /// Free-text plan, either generated or the deterministic fallback
    pub detailed_plan: String,
}

/// Why a generation call failed. All variants take the same recovery path:
/// the deterministic fallback plan.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no generation backend configured")]
    NotConfigured,
    #[error("request to generation backend failed: {0}")]
    Transport(String),
    #[error("generation backend returned status {0}")]
    Status(u16),
    #[error("generation backend returned an empty or malformed completion")]
    EmptyCompletion,
}

/// External text-generation capability. One prompt in, one completion out;
/// implementations own their timeout.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, GenerationError>;
}

/// Builds the plan prompt, invokes the generator once, and maps the outcome
/// into a [`PlanResult`].
pub struct PlanSynthesizer {
    generator: Arc<dyn TextGenerator>,
}

impl PlanSynthesizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Produce a plan for a finished intake. Infallible: any generator error
    /// is absorbed into the fallback plan.
    pub async fn synthesize(&self, domain: &DomainDefinition, answers: &[String]) -> PlanResult {
        let prompt = build_prompt(domain, answers);

        let detailed_plan = match self
            .generator
            .generate(&prompt, PLAN_MAX_TOKENS, PLAN_TEMPERATURE)
            .await
        {
            Ok(text) => {
                debug!(domain = domain.id, chars = text.len(), "plan generated");
                text
            }
            Err(err) => {
                warn!(domain = domain.id, error = %err, "plan generation failed, using fallback");
                fallback_plan(domain, answers)
            }
        };

        PlanResult {
            stress_area: domain.display_name.to_string(),
            detailed_plan,
        }
    }
}

/// The single structured prompt handed to the generation backend.
fn build_prompt(domain: &DomainDefinition, answers: &[String]) -> String {
    let numbered_answers = answers
        .iter()
        .enumerate()
        .map(|(i, answer)| format!("{}. {}", i + 1, answer))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an expert mental wellness assistant for University of Miami students.\n\
         A student has provided the following detailed responses regarding their challenges in the area of {area}:\n\
         Responses:\n\
         {numbered_answers}\n\
         \n\
         Based on these responses, please provide a comprehensive, step-by-step plan that includes:\n\
         1. A brief analysis of the underlying issues causing their stress.\n\
         2. Specific actions they can take to address these challenges.\n\
         3. Detailed recommendations for UM resources (include the following specific resource for {area}: {resource}) and any steps to take.\n\
         4. Any additional advice or tips that would help them manage their stress effectively.\n\
         \n\
         Return the output in the following JSON format:\n\
         {{\n \"stress_area\": \"{area}\",\n \"detailed_plan\": \"<Your detailed plan here>\"\n}}",
        area = domain.display_name,
        resource = domain.resource,
    )
}

/// Deterministic plan built from local data only. Byte-for-byte reproducible
/// for identical inputs.
fn fallback_plan(domain: &DomainDefinition, answers: &[String]) -> String {
    let first_answer = answers.first().map(String::as_str).unwrap_or_default();

    format!(
        "After reviewing your responses regarding {area}, it appears the key issues include {first_answer}.\n\
         Here is a suggested plan:\n\
         1. Reflect on your main challenges and consider keeping a daily journal to identify stress triggers.\n\
         2. Schedule a meeting with the appropriate UM resource: {resource}.\n\
         3. Consider joining a support group or workshop addressing your concerns.\n\
         4. Establish a routine that includes stress-reduction activities like exercise or mindfulness.\n\
         5. Follow up in a week to reassess and adjust your plan if needed.",
        area = domain.display_name,
        resource = domain.resource,
    )
}
