use thiserror::Error;

/// Cron schedule errors
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid cron expression '{expression}': {reason}")]
    InvalidCronExpression { expression: String, reason: String },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("No next execution time available for {schedule}")]
    NoNextExecution { schedule: String },
}

/// Authentication and authorization errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    CouldNotValidateCredentials,

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Invalid user")]
    InvalidUser,

    #[error("Inactive user")]
    InactiveUser,

    #[error("User not verified")]
    UserNotVerified,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("{0}")]
    WeakPassword(String),

    #[error("Current password is incorrect")]
    IncorrectCurrentPassword,

    #[error("New password must be different from current password")]
    PasswordUnchanged,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Invalid OAuth provider")]
    InvalidOAuthProvider,

    #[error("Invalid OAuth token")]
    InvalidOAuthToken,

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Token creation failed: {0}")]
    TokenCreationFailed(String),
}

/// Validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("{reason}")]
    InvalidFieldValue { field: String, reason: String },

    #[error("{0}")]
    ConstraintViolation(String),
}

impl ValidationError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFieldValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Database-specific errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
}

/// Report export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Export I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV generation failed: {0}")]
    Csv(String),

    #[error("Spreadsheet generation failed: {0}")]
    Spreadsheet(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("Start date and end date are required for custom period reports")]
    MissingDateRange,

    #[error("Export file not found or expired")]
    FileUnavailable,
}

/// AI chat assistant errors
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Session not found")]
    SessionNotFound,

    #[error("OpenAI API key is not configured")]
    NotConfigured,

    #[error("OpenAI API error: {0}")]
    Completion(String),

    #[error("Unexpected completion response: {0}")]
    InvalidResponse(String),

    #[error("Tool execution failed: {0}")]
    Tool(String),
}

/// Error returned by domain services, mapped onto HTTP statuses by the api crate
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ServiceError::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::CouldNotValidateCredentials
            | AuthError::InvalidToken(_)
            | AuthError::TokenExpired
            | AuthError::InvalidRefreshToken
            | AuthError::InvalidUser
            | AuthError::InvalidOAuthToken => ServiceError::Unauthorized(err.to_string()),
            AuthError::HashingFailed(_) | AuthError::TokenCreationFailed(_) => {
                ServiceError::Internal(err.to_string())
            }
            _ => ServiceError::BadRequest(err.to_string()),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::BadRequest(err.to_string())
    }
}

impl From<ExportError> for ServiceError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::MissingDateRange => ServiceError::BadRequest(err.to_string()),
            ExportError::FileUnavailable => ServiceError::NotFound(err.to_string()),
            _ => ServiceError::Internal(err.to_string()),
        }
    }
}

impl From<ChatError> for ServiceError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::SessionNotFound => ServiceError::NotFound(err.to_string()),
            _ => ServiceError::Internal(format!("Error processing message: {}", err)),
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => DatabaseError::DuplicateKey(db_err.message().to_string()),
                        "23503" => DatabaseError::ForeignKeyViolation(db_err.message().to_string()),
                        _ => DatabaseError::QueryFailed(db_err.message().to_string()),
                    }
                } else {
                    DatabaseError::QueryFailed(db_err.message().to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(err.into())
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Csv(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ExportError::Spreadsheet(err.to_string())
    }
}

impl From<printpdf::Error> for ExportError {
    fn from(err: printpdf::Error) -> Self {
        ExportError::Pdf(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_error_display() {
        let err = ScheduleError::InvalidCronExpression {
            expression: "* * * *".to_string(),
            reason: "invalid format".to_string(),
        };
        assert!(err.to_string().contains("Invalid cron expression"));
    }

    #[test]
    fn test_credential_errors_are_unauthorized() {
        let err: ServiceError = AuthError::InvalidCredentials.into();
        assert!(matches!(err, ServiceError::Unauthorized(ref m) if m == "Incorrect email or password"));

        let err: ServiceError = AuthError::InvalidRefreshToken.into();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn test_account_state_errors_are_bad_requests() {
        let err: ServiceError = AuthError::InactiveUser.into();
        assert!(matches!(err, ServiceError::BadRequest(ref m) if m == "Inactive user"));

        let err: ServiceError = AuthError::EmailAlreadyRegistered.into();
        assert!(matches!(err, ServiceError::BadRequest(ref m) if m == "Email already registered"));
    }

    #[test]
    fn test_validation_error_keeps_reason_only() {
        let err = ValidationError::invalid("amount", "Amount must be positive");
        assert_eq!(err.to_string(), "Amount must be positive");
        let err: ServiceError = err.into();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[test]
    fn test_chat_errors_wrap_message() {
        let err: ServiceError = ChatError::Completion("timeout".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Error processing message: OpenAI API error: timeout"
        );

        let err: ServiceError = ChatError::SessionNotFound.into();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn test_export_unavailable_is_not_found() {
        let err: ServiceError = ExportError::FileUnavailable.into();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Export file not found or expired"));
    }
}
