pub mod schema;
pub mod validator;

pub use schema::{DefaultGenerator, DefaultValue, Field, FieldKind, Schema};
pub use validator::{
    ErrorBody, RawSections, RequestValidator, Section, ValidatedSections, ValidationContext,
    ValidationOutcome, validate_param, validate_single,
};
