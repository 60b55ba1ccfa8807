/// Operation layer
///
/// Each public function here is one operation of the service surface. An
/// operation receives the pool, the [`RequestContext`] and any settings it
/// needs as arguments, resolves the actor, runs the authorization guard,
/// then calls into the models, the board or the analytics aggregator.
///
/// Errors are [`ServiceError`]s carrying a stable kind; failed checks end
/// the operation before anything is written.
///
/// # Modules
///
/// - `accounts`: signup, signin, current user, profile update
/// - `workspaces`: workspace CRUD, join, invite-code reset
/// - `members`: member listing, removal, role change
/// - `projects`: project CRUD
/// - `tasks`: task CRUD, bulk reorder, partition rebalance
/// - `analytics`: project and workspace analytics
/// - `uploads`: asset upload
///
/// [`RequestContext`]: crate::auth::session::RequestContext
/// [`ServiceError`]: crate::error::ServiceError

pub mod accounts;
pub mod analytics;
pub mod members;
pub mod projects;
pub mod tasks;
pub mod uploads;
pub mod workspaces;

use crate::error::{ServiceError, ServiceResult};

/// Longest accepted name, in characters
pub const MAX_NAME_LENGTH: usize = 255;

/// Trims a required name and checks its length
pub(crate) fn clean_name(value: &str, field: &str) -> ServiceResult<String> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ServiceError::bad_input(format!("{} is required", field)));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ServiceError::bad_input(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_LENGTH
        )));
    }

    Ok(trimmed.to_string())
}

/// Trims optional free text; blank becomes `None`
pub(crate) fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("  Acme  ", "Name").unwrap(), "Acme");
        assert!(matches!(
            clean_name("   ", "Name"),
            Err(ServiceError::BadUserInput(msg)) if msg == "Name is required"
        ));
        assert!(clean_name(&"x".repeat(256), "Name").is_err());
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text(Some("  hi ".to_string())), Some("hi".to_string()));
        assert_eq!(clean_text(Some("   ".to_string())), None);
        assert_eq!(clean_text(None), None);
    }
}
