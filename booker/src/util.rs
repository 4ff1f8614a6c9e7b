use crate::error::Error;
use hyper::{
    header::{HeaderName, HeaderValue},
    HeaderMap,
};
use std::collections::HashMap;

pub fn extract_headers(header_map: &HeaderMap) -> HashMap<String, String> {
    // values that are not visible ASCII are dropped
    header_map
        .iter()
        .map(|(k, v)| (String::from(k.as_str()), v.to_str()))
        .filter_map(|(key, value)| value.ok().map(|v| (key, String::from(v))))
        .collect::<HashMap<_, _>>()
}

pub fn put_headers<'a, I: IntoIterator<Item = (&'a String, &'a String)>>(
    header_map: &mut HeaderMap<HeaderValue>,
    headers: I,
) -> Result<(), Error> {
    for (key, value) in headers {
        let header_name = HeaderName::from_lowercase(key.to_lowercase().as_bytes())?;
        let header_value = HeaderValue::from_str(value)?;
        header_map.insert(header_name, header_value);
    }

    Ok(())
}

/// Looks up a `name=value` pair in a `Cookie` header value.
pub fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_headers_replaces_existing_values() {
        let mut header_map = HeaderMap::new();
        let first = HashMap::from([("Accept".to_string(), "text/plain".to_string())]);
        let second = HashMap::from([("accept".to_string(), "application/json".to_string())]);

        put_headers(&mut header_map, &first).unwrap();
        put_headers(&mut header_map, &second).unwrap();

        let extracted = extract_headers(&header_map);
        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted["accept"], "application/json");
    }

    #[test]
    fn extract_headers_drops_opaque_values() {
        let mut header_map = HeaderMap::new();
        header_map.insert("x-plain", HeaderValue::from_static("booker"));
        header_map.insert("x-opaque", HeaderValue::from_bytes(b"caf\xe9").unwrap());

        let extracted = extract_headers(&header_map);

        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted["x-plain"], "booker");
    }

    #[test]
    fn put_headers_rejects_invalid_names() {
        let mut header_map = HeaderMap::new();
        let headers = HashMap::from([("bad header".to_string(), "x".to_string())]);

        assert!(matches!(
            put_headers(&mut header_map, &headers),
            Err(Error::InvalidHeaderName)
        ));
    }

    #[test]
    fn cookie_value_finds_named_pair() {
        assert_eq!(cookie_value("token=abc123", "token"), Some("abc123"));
        assert_eq!(cookie_value("a=1; token=xyz", "token"), Some("xyz"));
        assert_eq!(cookie_value("a=1", "token"), None);
    }
}
