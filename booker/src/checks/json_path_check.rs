use super::ResponseCheck;
use crate::{error::Error, json_path, ResponseData};
use serde_json::Value;

const MISSING: &str = "<missing>";

#[derive(Debug)]
pub struct JsonPathIsCheck {
    path: String,
    expected: Value,
}

impl JsonPathIsCheck {
    pub fn new<S: Into<String>>(path: S, expected: Value) -> Self {
        Self {
            path: path.into(),
            expected,
        }
    }
}

impl ResponseCheck for JsonPathIsCheck {
    fn verify(&self, _: &ResponseData, json: Option<&Value>) -> Result<(), Error> {
        match json.and_then(|json| json_path::select(json, &self.path)) {
            Some(actual) if *actual == self.expected => Ok(()),
            Some(actual) => Err(Error::assertion(
                self.path.as_str(),
                json_path::display(&self.expected),
                json_path::display(actual),
            )),
            None => Err(Error::assertion(
                self.path.as_str(),
                json_path::display(&self.expected),
                MISSING,
            )),
        }
    }
}

#[derive(Debug)]
pub struct JsonPathNotEmptyCheck {
    path: String,
}

impl JsonPathNotEmptyCheck {
    pub fn new<S: Into<String>>(path: S) -> Self {
        Self { path: path.into() }
    }
}

impl ResponseCheck for JsonPathNotEmptyCheck {
    fn verify(&self, _: &ResponseData, json: Option<&Value>) -> Result<(), Error> {
        let actual = json.and_then(|json| json_path::select(json, &self.path));

        match actual {
            Some(Value::Null) | None => Err(Error::assertion(
                self.path.as_str(),
                "a non-empty value",
                MISSING,
            )),
            Some(Value::String(text)) if text.is_empty() => Err(Error::assertion(
                self.path.as_str(),
                "a non-empty value",
                "\"\"",
            )),
            Some(_) => Ok(()),
        }
    }
}
