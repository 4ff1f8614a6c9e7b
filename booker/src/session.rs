use crate::error::Error;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::{BTreeSet, HashMap};

lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex =
        Regex::new(r"\$\{(?P<name>[A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
}

/// Named values bound by earlier steps and substituted into later ones.
///
/// Every virtual user and every suite run owns its own session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    values: HashMap<String, String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<S1: Into<String>, S2: Into<String>>(&mut self, name: S1, value: S2) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    /// Substitutes every `${name}` in `template`.
    pub fn resolve(&self, template: &str) -> Result<String, Error> {
        if let Some(missing) = placeholders(template).find(|name| !self.contains(name)) {
            return Err(Error::UnresolvedBinding(missing.into()));
        }

        Ok(PLACEHOLDER_REGEX
            .replace_all(template, |captures: &Captures| {
                self.get(&captures["name"]).unwrap_or_default().to_string()
            })
            .into_owned())
    }
}

/// Names referenced by `${...}` placeholders, in order of appearance.
pub fn placeholders(template: &str) -> impl Iterator<Item = &str> {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .filter_map(|captures| captures.name("name").map(|m| m.as_str()))
}

pub(crate) fn collect_placeholders<'a, I>(templates: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    templates
        .into_iter()
        .flat_map(|template| placeholders(template))
        .map(String::from)
        .collect()
}
