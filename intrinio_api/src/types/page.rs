use serde_json::{Map, Value};

use crate::Error;

/// One row returned by the API. The schema is not enforced here; records
/// are passed through as the server sent them.
pub type Record = Map<String, Value>;

/// Field carrying the continuation token on every paginated response.
pub const NEXT_PAGE_FIELD: &str = "next_page";

/// A single decoded page: its records plus the token for the following page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub records: Vec<Record>,
    /// `None` when this is the last page.
    pub next_page: Option<String>,
}

impl Page {
    /// Splits a response body into its records and continuation token.
    ///
    /// An absent, `null`, or empty `next_page` marks the last page. Any other
    /// non-string token is rejected rather than guessed at.
    pub fn from_json(body: Value, output_field: &str) -> Result<Self, Error> {
        let mut body = match body {
            Value::Object(map) => map,
            _ => {
                return Err(Error::UnexpectedType {
                    field: "<root>".to_string(),
                    expected: "object",
                })
            }
        };

        let records = match body.remove(output_field) {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(record) => Ok(record),
                    _ => Err(Error::UnexpectedType {
                        field: output_field.to_string(),
                        expected: "array of objects",
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(Error::UnexpectedType {
                    field: output_field.to_string(),
                    expected: "array",
                })
            }
            None => return Err(Error::MissingField(output_field.to_string())),
        };

        let next_page = match body.remove(NEXT_PAGE_FIELD) {
            None | Some(Value::Null) => None,
            Some(Value::String(token)) if token.is_empty() => None,
            Some(Value::String(token)) => Some(token),
            Some(_) => {
                return Err(Error::UnexpectedType {
                    field: NEXT_PAGE_FIELD.to_string(),
                    expected: "string or null",
                })
            }
        };

        Ok(Self { records, next_page })
    }

    pub fn is_last(&self) -> bool {
        self.next_page.is_none()
    }
}
