use super::ResponseCheck;
use crate::{error::Error, ResponseData};
use serde_json::Value;

#[derive(Debug)]
pub struct StatusIsCheck {
    expected: u16,
}

impl StatusIsCheck {
    pub fn new(expected: u16) -> Self {
        Self { expected }
    }
}

impl ResponseCheck for StatusIsCheck {
    fn verify(&self, response: &ResponseData, _: Option<&Value>) -> Result<(), Error> {
        if response.status_code == self.expected {
            Ok(())
        } else {
            Err(Error::assertion(
                "status",
                self.expected,
                response.status_code,
            ))
        }
    }
}

#[derive(Debug)]
pub struct StatusNotSuccessCheck;

impl ResponseCheck for StatusNotSuccessCheck {
    fn verify(&self, response: &ResponseData, _: Option<&Value>) -> Result<(), Error> {
        if response.is_success() {
            Err(Error::assertion("status", "4xx or 5xx", response.status_code))
        } else {
            Ok(())
        }
    }
}
