use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct RequestData {
    pub uri: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct ResponseData {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ResponseData {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
