use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use validator::{ValidationError, ValidationErrors};

/// Error body returned by every endpoint: `{error}` plus optional per-field detail
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.into(),
            fields: None,
        }
    }

    pub fn with_fields(error: impl Into<String>, fields: serde_json::Value) -> Self {
        ErrorResponse {
            error: error.into(),
            fields: Some(fields),
        }
    }
}

/// Flatten validator output into `{field: {errors: [..]}}`
pub fn field_errors(errors: &ValidationErrors) -> serde_json::Value {
    let mut fields = serde_json::Map::new();
    for (field, errs) in errors.field_errors() {
        let messages: Vec<String> = errs
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Validation error in field: {}", field))
            })
            .collect();
        fields.insert(field.to_string(), serde_json::json!({ "errors": messages }));
    }
    serde_json::Value::Object(fields)
}

/// Rejects empty and whitespace-only strings
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// First human-readable message in a set of validation errors
pub fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| "Validation failed".to_string())
}

fn deserialize_message(err_string: &str) -> &'static str {
    if err_string.contains("EOF while parsing") {
        "Request body is empty. Expected JSON payload"
    } else if err_string.contains("unknown variant") || err_string.contains("Unknown stage") {
        "Invalid enum value. Check allowed values for this field"
    } else if err_string.contains("missing field") {
        "Required field is missing"
    } else {
        "Invalid JSON format"
    }
}

fn bad_request(body: ErrorResponse) -> actix_web::Error {
    actix_web::error::InternalError::from_response("", HttpResponse::BadRequest().json(body)).into()
}

/// Creates a configured JsonConfig with standardized error handling for validated payloads
pub fn json_config() -> actix_web_validator::JsonConfig {
    actix_web_validator::JsonConfig::default().error_handler(|err, _req| match err {
        actix_web_validator::Error::Validate(validation_errors) => bad_request(
            ErrorResponse::with_fields("Validation failed", field_errors(&validation_errors)),
        ),
        actix_web_validator::Error::Deserialize(de_err) => {
            let message = deserialize_message(&de_err.to_string());
            bad_request(ErrorResponse::with_fields(
                "Request validation failed",
                serde_json::json!({ "message": message }),
            ))
        }
        _ => bad_request(ErrorResponse::with_fields(
            "Validation failed",
            serde_json::json!({ "message": "Validation error" }),
        )),
    })
}

/// Same error envelope for plain `web::Json` extractors
pub fn web_json_config() -> actix_web::web::JsonConfig {
    actix_web::web::JsonConfig::default().error_handler(|err, _req| {
        let message = deserialize_message(&err.to_string());
        bad_request(ErrorResponse::new(message))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Title is required"))]
        title: String,
    }

    #[test]
    fn collects_field_messages() {
        let errors = Sample { title: String::new() }.validate().unwrap_err();
        let fields = field_errors(&errors);
        assert_eq!(fields["title"]["errors"][0], "Title is required");
        assert_eq!(first_message(&errors), "Title is required");
    }

    #[derive(Validate)]
    struct Named {
        #[validate(custom(function = "not_blank", message = "Name is required"))]
        name: String,
        #[validate(custom(function = "not_blank", message = "Nickname must not be empty"))]
        nickname: Option<String>,
    }

    #[test]
    fn whitespace_only_values_are_blank() {
        assert!(not_blank("  Ada ").is_ok());
        assert!(not_blank("").is_err());
        assert!(not_blank(" \t\n").is_err());

        let errors = Named { name: "   ".to_string(), nickname: None }
            .validate()
            .unwrap_err();
        assert_eq!(field_errors(&errors)["name"]["errors"][0], "Name is required");

        let errors = Named { name: "Ada".to_string(), nickname: Some(" ".to_string()) }
            .validate()
            .unwrap_err();
        assert_eq!(first_message(&errors), "Nickname must not be empty");
        assert!(Named { name: "Ada".to_string(), nickname: None }.validate().is_ok());
    }

    #[test]
    fn empty_bodies_get_a_specific_message() {
        assert_eq!(
            deserialize_message("EOF while parsing a value at line 1 column 0"),
            "Request body is empty. Expected JSON payload"
        );
        assert_eq!(deserialize_message("expected `,`"), "Invalid JSON format");
    }

    #[test]
    fn error_body_omits_absent_fields() {
        let value = serde_json::to_value(ErrorResponse::new("UID is required")).unwrap();
        assert_eq!(value, serde_json::json!({ "error": "UID is required" }));
    }
}
