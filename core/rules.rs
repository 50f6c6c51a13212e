use crate::error::Result;
use globset::{Glob, GlobMatcher};
use indexmap::IndexMap;
use log;

pub mod mapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleClass {
    Exact,
    Suffix,
    Glob,
}

#[derive(Debug, Clone)]
struct GroupRule {
    key: String,
    label: String,
    glob: Option<GlobMatcher>,
}

/// Maps file names to group labels through three ordered rule classes.
///
/// Each class contributes at most its first matching rule (in configuration
/// order); the labels of all classes are unioned in the order exact name,
/// suffix, glob.
#[derive(Debug, Clone, Default)]
pub struct FileGroupResolver {
    exact: Vec<GroupRule>,
    suffix: Vec<GroupRule>,
    glob: Vec<GroupRule>,
}

fn classify(key: &str) -> RuleClass {
    if key.contains(['*', '?', '[']) {
        RuleClass::Glob
    } else if key.starts_with('.') {
        RuleClass::Suffix
    } else {
        RuleClass::Exact
    }
}

impl FileGroupResolver {
    pub fn from_mapping(mapping: &IndexMap<String, String>) -> Result<Self> {
        let mut resolver = Self::default();
        for (key, label) in mapping {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            let class = classify(key);
            let glob = match class {
                RuleClass::Glob => Some(Glob::new(key)?.compile_matcher()),
                _ => None,
            };
            let rule = GroupRule {
                key: key.to_string(),
                label: label.clone(),
                glob,
            };
            log::trace!("File group rule {:?}: '{}' -> '{}'", class, key, label);
            match class {
                RuleClass::Exact => resolver.exact.push(rule),
                RuleClass::Suffix => resolver.suffix.push(rule),
                RuleClass::Glob => resolver.glob.push(rule),
            }
        }
        Ok(resolver)
    }

    /// Labels for one file name (the final path segment, not a path).
    pub fn resolve(&self, file_name: &str) -> Vec<String> {
        let exact = self.exact.iter().find(|rule| rule.key == file_name);
        let suffix = self
            .suffix
            .iter()
            .find(|rule| file_name.len() > rule.key.len() && file_name.ends_with(&rule.key));
        let glob = self.glob.iter().find(|rule| {
            rule.glob
                .as_ref()
                .is_some_and(|matcher| matcher.is_match(file_name))
        });

        let mut labels: Vec<String> = Vec::new();
        for rule in [exact, suffix, glob].into_iter().flatten() {
            if !labels.contains(&rule.label) {
                labels.push(rule.label.clone());
            }
        }
        labels
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.suffix.is_empty() && self.glob.is_empty()
    }
}
