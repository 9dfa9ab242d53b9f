use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartSessionRequest {
    pub user_id: Uuid,
    #[validate(
        length(min = 1, message = "Quiz list cannot be empty"),
        custom(function = "validate_quiz_ids")
    )]
    pub quiz_ids: Vec<i32>,
}

fn validate_quiz_ids(quiz_ids: &[i32]) -> Result<(), ValidationError> {
    if quiz_ids.iter().any(|id| *id <= 0) {
        return Err(ValidationError::new("quiz_id_not_positive"));
    }
    Ok(())
}
