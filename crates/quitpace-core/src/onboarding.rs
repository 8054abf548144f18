//! Onboarding: turn the user's answers into a profile and a quit plan.
//!
//! Completing onboarding is the only place a [`QuitPlan`] is generated.
//! Running it again replaces both the profile and the plan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::plan::{generate_quit_plan, PlanSpeed, QuitPlan};
use crate::stats::Pricing;
use crate::storage::OnboardingConfig;

/// Raw answers collected from the user.
///
/// Missing prices fall back to the configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnboardingInput {
    pub cigarettes_per_week: u32,
    pub vapes_per_week: u32,
    pub plan_speed: Option<PlanSpeed>,
    pub cigarette_pack_price: Option<f64>,
    pub vape_price: Option<f64>,
}

/// Answers as stored after onboarding completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub cigarettes_per_week: u32,
    pub vapes_per_week: u32,
    pub plan_speed: PlanSpeed,
    pub cigarette_pack_price: f64,
    pub vape_price: f64,
    pub start_date: DateTime<Utc>,
}

impl UserProfile {
    pub fn pricing(&self) -> Pricing {
        Pricing::from_prices(self.cigarette_pack_price, self.vape_price)
    }
}

fn check_price(field: &str, price: Option<f64>) -> Result<(), ValidationError> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("price must be a non-negative number, got {p}"),
        }),
        _ => Ok(()),
    }
}

impl OnboardingInput {
    /// # Errors
    /// Rejects an all-zero baseline and negative or non-finite prices.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.cigarettes_per_week == 0 && self.vapes_per_week == 0 {
            return Err(ValidationError::InvalidValue {
                field: "cigarettes_per_week + vapes_per_week".into(),
                message: "enter how many cigarettes or vapes you use per week".into(),
            });
        }
        check_price("cigarette_pack_price", self.cigarette_pack_price)?;
        check_price("vape_price", self.vape_price)?;
        Ok(())
    }
}

/// Validate the answers and build the profile and plan, both anchored at `now`.
///
/// # Errors
/// Returns a validation error for unusable answers.
pub fn complete_onboarding(
    input: &OnboardingInput,
    defaults: &OnboardingConfig,
    now: DateTime<Utc>,
) -> Result<(UserProfile, QuitPlan)> {
    input.validate()?;

    let profile = UserProfile {
        cigarettes_per_week: input.cigarettes_per_week,
        vapes_per_week: input.vapes_per_week,
        plan_speed: input.plan_speed.unwrap_or(defaults.default_speed),
        cigarette_pack_price: input.cigarette_pack_price.unwrap_or(defaults.pack_price),
        vape_price: input.vape_price.unwrap_or(defaults.vape_price),
        start_date: now,
    };
    // Defaults come from the config file and get the same checks as answers.
    check_price("cigarette_pack_price", Some(profile.cigarette_pack_price))?;
    check_price("vape_price", Some(profile.vape_price))?;

    let plan = generate_quit_plan(
        profile.cigarettes_per_week,
        profile.vapes_per_week,
        profile.plan_speed,
        now,
    )?;

    tracing::info!(
        cigarettes = profile.cigarettes_per_week,
        vapes = profile.vapes_per_week,
        speed = %profile.plan_speed,
        weeks = plan.total_weeks,
        "onboarding completed"
    );

    Ok((profile, plan))
}
