mod json_path_check;
mod save_as;
mod status_check;

use crate::{error::Error, session::Session, ResponseData};
use json_path_check::{JsonPathIsCheck, JsonPathNotEmptyCheck};
use save_as::{SaveAs, SavedValue};
use serde_json::Value;
use status_check::{StatusIsCheck, StatusNotSuccessCheck};
use std::fmt::Debug;

/// A single assertion against a response.
///
/// `json` is the response body parsed once per response, `None` when the body is not JSON.
pub trait ResponseCheck: Debug {
    fn verify(&self, response: &ResponseData, json: Option<&Value>) -> Result<(), Error>;
}

#[derive(Debug)]
enum CheckType {
    Verify(Box<dyn ResponseCheck + Send + Sync>),
    Save(SaveAs),
}

/// One entry of a step's check list: either an assertion or an extraction into the session.
#[derive(Debug)]
pub struct Check {
    check_type: CheckType,
}

impl Check {
    fn from_check_type(check_type: CheckType) -> Self {
        Self { check_type }
    }

    pub fn custom<C: ResponseCheck + Send + Sync + 'static>(check: C) -> Self {
        Self::from_check_type(CheckType::Verify(Box::new(check)))
    }

    pub fn apply(
        &self,
        response: &ResponseData,
        json: Option<&Value>,
        session: &mut Session,
    ) -> Result<(), Error> {
        match &self.check_type {
            CheckType::Verify(check) => check.verify(response, json),
            CheckType::Save(save_as) => save_as.save(json, session),
        }
    }

    /// Name of the binding this check extracts, if it is an extraction.
    pub fn saved_name(&self) -> Option<&str> {
        match &self.check_type {
            CheckType::Save(save_as) => Some(save_as.name()),
            CheckType::Verify(_) => None,
        }
    }
}

pub fn status() -> StatusChecks {
    StatusChecks
}

pub fn json_path<S: Into<String>>(path: S) -> JsonPathChecks {
    JsonPathChecks { path: path.into() }
}

pub struct StatusChecks;

impl StatusChecks {
    pub fn is(self, expected: u16) -> Check {
        Check::custom(StatusIsCheck::new(expected))
    }

    /// Passes for any status outside 2xx.
    pub fn not_success(self) -> Check {
        Check::custom(StatusNotSuccessCheck)
    }
}

pub struct JsonPathChecks {
    path: String,
}

impl JsonPathChecks {
    pub fn is<V: Into<Value>>(self, expected: V) -> Check {
        Check::custom(JsonPathIsCheck::new(self.path, expected.into()))
    }

    pub fn not_empty(self) -> Check {
        Check::custom(JsonPathNotEmptyCheck::new(self.path))
    }

    /// Saves the selected value as text. Missing or empty values fail the check.
    pub fn save_as<S: Into<String>>(self, name: S) -> Check {
        Check::from_check_type(CheckType::Save(SaveAs::new(
            self.path,
            name,
            SavedValue::Text,
        )))
    }

    /// Saves the selected value, which must be a JSON integer.
    pub fn save_integer_as<S: Into<String>>(self, name: S) -> Check {
        Check::from_check_type(CheckType::Save(SaveAs::new(
            self.path,
            name,
            SavedValue::Integer,
        )))
    }
}
