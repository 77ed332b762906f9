use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::fallback::example_menu;
use super::model::{Day, Slot, WeeklyMenu};
use super::normalize::normalize_menu;
use super::validate::{check_intolerances, validate_menu, MenuRejection};
use crate::llm::client::{LlmClient, LlmError};
use crate::llm::extract::{clean_plain_text, extract_json_object, ExtractError};
use crate::llm::prompts;
use crate::profiles::dto::Profile;
use crate::retry::{retry_validated, RetryOutcome};
use crate::text::fold;

#[derive(Debug, Error)]
pub enum MenuError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Rejected(#[from] MenuRejection),
    #[error("model returned an empty dish name")]
    EmptyDish,
    #[error("suggested dish {0:?} is already in the week")]
    AlreadyInWeek(String),
}

/// Where the week that was stored came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum MenuOrigin {
    Generated { attempts: u32 },
    Fallback { reason: String },
}

/// A validated candidate (or the example menu), not yet normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedMenu {
    pub candidate: Value,
    pub origin: MenuOrigin,
}

impl GeneratedMenu {
    pub fn normalize(&self, intolerances: &[String]) -> WeeklyMenu {
        normalize_menu(&self.candidate, intolerances)
    }
}

/// Asks the model for a week, validating every candidate. After
/// `max_attempts` rejected candidates the static example menu is returned
/// and the origin records the last rejection.
#[instrument(skip(llm, profile), fields(user_id = %profile.id))]
pub async fn generate_weekly_menu(
    llm: &dyn LlmClient,
    profile: &Profile,
    max_attempts: u32,
) -> GeneratedMenu {
    let outcome: RetryOutcome<Value, MenuError> = retry_validated(
        max_attempts,
        |attempt, previous: Option<&MenuError>| {
            let prompt = prompts::weekly_menu(profile, previous.map(|e| e.to_string()).as_deref());
            info!(attempt, "requesting weekly menu");
            async move {
                let text = llm.generate(&prompt).await?;
                Ok::<_, MenuError>(extract_json_object(&text)?)
            }
        },
        |candidate| {
            debug!("validating menu candidate");
            Ok(validate_menu(candidate, &profile.intolerances)?)
        },
        |_| Some(example_menu().to_value()),
    )
    .await;

    let origin = match &outcome {
        RetryOutcome::Success { attempts, .. } => MenuOrigin::Generated {
            attempts: *attempts,
        },
        RetryOutcome::FallbackUsed { last_error, .. } | RetryOutcome::Failed { last_error, .. } => {
            warn!(error = %last_error, "using example menu");
            MenuOrigin::Fallback {
                reason: last_error.to_string(),
            }
        }
    };
    let candidate = outcome
        .into_value()
        .unwrap_or_else(|_| example_menu().to_value());
    GeneratedMenu { candidate, origin }
}

/// Asks for a replacement of the dish at (`day`, `slot`). The suggestion
/// must be non-empty, new to the week and free of the user's intolerances.
#[instrument(skip(llm, profile, menu), fields(user_id = %profile.id))]
pub async fn suggest_alternative(
    llm: &dyn LlmClient,
    profile: &Profile,
    menu: &WeeklyMenu,
    day: Day,
    slot: Slot,
    max_attempts: u32,
) -> Result<String, MenuError> {
    let current = menu.dish(day, slot).unwrap_or_default().to_string();
    let week = menu.distinct_dishes();
    let prompt = prompts::alternative_dish(profile, &current, day, slot, &week);
    let taken: Vec<String> = week.iter().map(|d| fold(d)).collect();

    retry_validated(
        max_attempts,
        |_, _| {
            let prompt = &prompt;
            async move {
                let text = llm.generate(prompt).await?;
                Ok::<_, MenuError>(clean_plain_text(&text))
            }
        },
        |dish: &String| {
            if dish.is_empty() {
                return Err(MenuError::EmptyDish);
            }
            if taken.contains(&fold(dish)) {
                return Err(MenuError::AlreadyInWeek(dish.clone()));
            }
            check_intolerances([dish.as_str()], &profile.intolerances)?;
            Ok(())
        },
        |_| None,
    )
    .await
    .into_value()
}
