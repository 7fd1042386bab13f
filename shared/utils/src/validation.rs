use crate::error::{PackslipError, PackslipResult};
use validator::{Validate, ValidationErrors};

pub fn validate_model<T: Validate>(model: &T) -> PackslipResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let (field, message) = first_validation_error(&errors);
            Err(PackslipError::validation(field, message))
        }
    }
}

/// Field and message of the first failing rule, preferring the rule's own message.
pub fn first_validation_error(errors: &ValidationErrors) -> (String, String) {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);

    for (field, field_errors) in fields {
        if let Some(error) = field_errors.first() {
            let message = match &error.message {
                Some(message) => message.to_string(),
                None => match error.code.as_ref() {
                    "length" => format!("Length validation failed for field '{}'", field),
                    "required" => format!("Field '{}' is required", field),
                    code => format!("Validation failed for field '{}': {}", field, code),
                },
            };
            return (field.to_string(), message);
        }
    }

    ("model".to_string(), "Validation failed".to_string())
}

/// Check the uploaded file name the way the upload endpoint requires it.
pub fn validate_pdf_filename(filename: Option<&str>) -> PackslipResult<&str> {
    let filename = filename.unwrap_or_default();

    if filename.is_empty() {
        return Err(PackslipError::validation("file", "No file selected"));
    }
    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(PackslipError::validation("file", "File must be a PDF"));
    }
    Ok(filename)
}
