use crate::{error::Error, json_path, session::Session};
use serde_json::Value;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SavedValue {
    Text,
    Integer,
}

#[derive(Debug)]
pub struct SaveAs {
    path: String,
    name: String,
    saved_value: SavedValue,
}

impl SaveAs {
    pub fn new<S1: Into<String>, S2: Into<String>>(
        path: S1,
        name: S2,
        saved_value: SavedValue,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            saved_value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn save(&self, json: Option<&Value>, session: &mut Session) -> Result<(), Error> {
        let value = json
            .and_then(|json| json_path::select(json, &self.path))
            .ok_or_else(|| self.failure("no value found"))?;

        let text = match (self.saved_value, value) {
            (SavedValue::Integer, Value::Number(number)) if number.is_i64() || number.is_u64() => {
                number.to_string()
            }
            (SavedValue::Integer, other) => {
                return Err(self.failure(format!("{} is not an integer", other)))
            }
            (SavedValue::Text, Value::Null) => return Err(self.failure("value is null")),
            (SavedValue::Text, other) => json_path::display(other),
        };

        if text.is_empty() {
            return Err(self.failure("value is empty"));
        }

        session.set(self.name.as_str(), text);
        Ok(())
    }

    fn failure<S: Into<String>>(&self, reason: S) -> Error {
        Error::ExtractionFailed {
            path: self.path.clone(),
            name: self.name.clone(),
            reason: reason.into(),
        }
    }
}
