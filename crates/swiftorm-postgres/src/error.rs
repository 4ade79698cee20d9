//! Reclassification of driver failures into domain errors.

use swiftorm_core::{
    Error, IntegrityError, IntegrityErrorKind, QueryError, QueryErrorKind, ValidationErrorKind,
};

/// Field name reported when the backend rejects a bind value without naming
/// the column.
const INPUT_FIELD: &str = "input";

/// Reclassify a driver error raised by a DML statement.
///
/// SQLSTATE class `23` becomes [`Error::Integrity`] and class `22` becomes
/// [`Error::Validation`]. Without a SQLSTATE the message is inspected for the
/// same conditions. Everything else is returned unchanged.
pub fn translate_driver_error(err: Error) -> Error {
    let Error::Query(query) = err else {
        return err;
    };

    let translated = match query.sqlstate.as_deref() {
        Some(code) if code.starts_with("23") => Some(integrity(&query, integrity_kind(code))),
        Some(code) if code.starts_with("22") => Some(invalid_input(&query)),
        Some(_) => None,
        None => classify_message(&query),
    };

    match translated {
        Some(domain) => {
            tracing::warn!(
                sqlstate = query.sqlstate.as_deref().unwrap_or(""),
                error = %query,
                "Reclassified driver error"
            );
            domain
        }
        None => Error::Query(query),
    }
}

fn integrity_kind(code: &str) -> IntegrityErrorKind {
    match code {
        "23505" => IntegrityErrorKind::Unique,
        "23503" => IntegrityErrorKind::ForeignKey,
        "23502" => IntegrityErrorKind::NotNull,
        "23514" => IntegrityErrorKind::Check,
        _ => IntegrityErrorKind::Other,
    }
}

fn classify_message(query: &QueryError) -> Option<Error> {
    let message = query.message.to_lowercase();
    if message.contains("duplicate key") || message.contains("violates unique constraint") {
        return Some(integrity(query, IntegrityErrorKind::Unique));
    }
    if message.contains("violates foreign key constraint") {
        return Some(integrity(query, IntegrityErrorKind::ForeignKey));
    }
    if message.contains("violates not-null constraint") {
        return Some(integrity(query, IntegrityErrorKind::NotNull));
    }
    if message.contains("invalid input syntax") {
        return Some(invalid_input(query));
    }
    if query.kind == QueryErrorKind::Constraint {
        return Some(integrity(query, IntegrityErrorKind::Other));
    }
    None
}

fn integrity(query: &QueryError, kind: IntegrityErrorKind) -> Error {
    Error::Integrity(IntegrityError {
        kind,
        constraint: query.constraint.clone(),
        message: query.message.clone(),
    })
}

fn invalid_input(query: &QueryError) -> Error {
    Error::validation(
        INPUT_FIELD,
        ValidationErrorKind::InvalidInput,
        query.message.clone(),
    )
}
