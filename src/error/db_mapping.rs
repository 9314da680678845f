use super::app_error::AppError;

pub(super) const ACTIVE_CONVERSATION_CONSTRAINT: &str = "uq_conversations_active_pair";
pub(super) const ORDER_RESPONSE_CONSTRAINT: &str = "messages_responds_to_message_id_key";

/// Translates PostgreSQL SQLSTATE codes into caller-facing errors. Returns
/// `None` for anything that should stay an opaque storage failure.
pub(super) fn map_database_error(
    code: Option<&str>,
    constraint: Option<&str>,
    message: &str,
) -> Option<AppError> {
    match code? {
        "23505" => Some(AppError::Conflict(
            conflict_message_from_constraint(constraint).to_string(),
        )),
        "23502" => Some(AppError::validation_error(
            required_field_message_from_db(message)
                .unwrap_or_else(|| "required field is missing".to_string()),
        )),
        "23503" => Some(AppError::BadRequest(
            "referenced resource does not exist".to_string(),
        )),
        "23514" => Some(AppError::validation_error(
            "request violates validation rules",
        )),
        "22P02" => Some(AppError::validation_error("invalid input format")),
        "22003" => Some(AppError::validation_error("numeric value out of range")),
        "08001" | "08006" => Some(AppError::ServiceUnavailable {
            service: "database".to_string(),
            message: "Unable to connect to database. Please try again later.".to_string(),
        }),
        "53300" => Some(AppError::ServiceUnavailable {
            service: "database".to_string(),
            message: "Service temporarily unavailable. Please try again later.".to_string(),
        }),
        "40001" | "55P03" => Some(AppError::Conflict(
            "Resource is currently locked. Please try again.".to_string(),
        )),
        _ => None,
    }
}

pub(super) fn conflict_message_from_constraint(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(ACTIVE_CONVERSATION_CONSTRAINT) => {
            "an active conversation with this artisan already exists"
        }
        Some(ORDER_RESPONSE_CONSTRAINT) => "order request has already been answered",
        Some("conversation_participants_conversation_id_user_id_key") => {
            "user is already a participant in this conversation"
        }
        Some("conversation_participants_conversation_id_role_key") => {
            "conversation already has a participant with this role"
        }
        Some("orders_order_number_key") => "order number already issued",
        Some("profiles_email_key") => "email already registered",
        Some("artisan_profiles_user_id_key") => "artisan profile already exists",
        _ => "resource already exists",
    }
}

pub(super) fn required_field_message_from_db(message: &str) -> Option<String> {
    let marker = "column \"";
    let rest = &message[message.find(marker)? + marker.len()..];
    let field = &rest[..rest.find('"')?];
    Some(format!("{field} is required"))
}
