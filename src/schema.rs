//! Validation of version-check responses
//!
//! Supports the JSON Schema keywords the response schemas use: `type`,
//! `required`, `properties` and `pattern`, plus annotations such as `title`.
//! A schema using any other keyword fails to load instead of validating less
//! than it states.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Pattern of the built-in schema: one or more dot-separated numbers
const DOTTED_VERSION_PATTERN: &str = r"^\d+(\.\d+)*$";

/// Keywords that carry no validation and are accepted anywhere
const ANNOTATIONS: &[&str] = &[
    "$schema",
    "$id",
    "$comment",
    "title",
    "description",
    "default",
    "examples",
];

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read schema {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse schema {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported schema keyword {keyword:?}")]
    UnsupportedKeyword { keyword: String },

    #[error("Invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{location}: missing required property {property:?}")]
    MissingProperty { location: Location, property: String },

    #[error("{location}: expected {expected}")]
    WrongType { location: Location, expected: String },

    #[error("{location}: does not match pattern {pattern:?}")]
    PatternMismatch { location: Location, pattern: String },
}

/// Position of a value inside the validated document, e.g. `/modelsVersion`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location(Vec<String>);

impl Location {
    fn child(&self, name: &str) -> Self {
        let mut path = self.0.clone();
        path.push(name.to_string());
        Self(path)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl JsonType {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => {
                value.is_i64()
                    || value.is_u64()
                    || value.as_f64().is_some_and(|n| n.fract() == 0.0)
            }
            Self::Boolean => value.is_boolean(),
            Self::Null => value.is_null(),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TypeSpec {
    One(JsonType),
    Any(Vec<JsonType>),
}

/// Schema document as written on disk
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSchema {
    #[serde(rename = "type")]
    kind: Option<TypeSpec>,
    required: Vec<String>,
    properties: IndexMap<String, RawSchema>,
    pattern: Option<String>,
    #[serde(flatten)]
    other: serde_json::Map<String, Value>,
}

/// Compiled schema node
#[derive(Debug, Clone, Default)]
struct Node {
    types: Vec<JsonType>,
    required: Vec<String>,
    properties: IndexMap<String, Node>,
    pattern: Option<Regex>,
}

impl Node {
    fn compile(raw: RawSchema) -> Result<Self, SchemaError> {
        if let Some(keyword) = raw.other.keys().find(|k| !ANNOTATIONS.contains(&k.as_str())) {
            return Err(SchemaError::UnsupportedKeyword {
                keyword: keyword.clone(),
            });
        }

        let types = match raw.kind {
            None => vec![],
            Some(TypeSpec::One(kind)) => vec![kind],
            Some(TypeSpec::Any(kinds)) => kinds,
        };

        let pattern = raw
            .pattern
            .map(|pattern| {
                Regex::new(&translate_pattern(&pattern)).map_err(|e| SchemaError::Pattern {
                    pattern,
                    source: e,
                })
            })
            .transpose()?;

        let properties = raw
            .properties
            .into_iter()
            .map(|(name, raw)| Ok((name, Self::compile(raw)?)))
            .collect::<Result<_, SchemaError>>()?;

        Ok(Self {
            types,
            required: raw.required,
            properties,
            pattern,
        })
    }

    fn validate(&self, value: &Value, location: &Location) -> Result<(), ValidationError> {
        if !self.types.is_empty() && !self.types.iter().any(|t| t.matches(value)) {
            let expected = self
                .types
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(" or ");
            return Err(ValidationError::WrongType {
                location: location.clone(),
                expected,
            });
        }

        if let (Some(pattern), Some(text)) = (&self.pattern, value.as_str())
            && !pattern.is_match(text)
        {
            return Err(ValidationError::PatternMismatch {
                location: location.clone(),
                pattern: pattern.as_str().to_string(),
            });
        }

        if let Some(object) = value.as_object() {
            if let Some(missing) = self.required.iter().find(|name| !object.contains_key(*name)) {
                return Err(ValidationError::MissingProperty {
                    location: location.clone(),
                    property: missing.clone(),
                });
            }

            for (name, node) in &self.properties {
                if let Some(child) = object.get(name) {
                    node.validate(child, &location.child(name))?;
                }
            }
        }

        Ok(())
    }
}

/// Schema that version-check responses must satisfy
#[derive(Debug, Clone)]
pub struct ResponseSchema {
    root: Node,
}

impl ResponseSchema {
    /// Load a schema document from a JSON file
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawSchema =
            serde_json::from_str(&content).map_err(|source| SchemaError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            root: Node::compile(raw)?,
        })
    }

    /// Parse a schema from an in-memory JSON value
    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        let raw: RawSchema = serde_json::from_value(value).map_err(|source| SchemaError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        Ok(Self {
            root: Node::compile(raw)?,
        })
    }

    /// Schema requiring `field` to be a string holding a dotted version
    pub fn for_field(field: &str) -> Self {
        let version = Node {
            types: vec![JsonType::String],
            pattern: Regex::new(DOTTED_VERSION_PATTERN).ok(),
            ..Node::default()
        };

        Self {
            root: Node {
                types: vec![JsonType::Object],
                required: vec![field.to_string()],
                properties: IndexMap::from([(field.to_string(), version)]),
                pattern: None,
            },
        }
    }

    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        self.root.validate(value, &Location::default())
    }
}

/// Rewrite Python-style `\Z` anchors, which the regex crate spells `\z`
fn translate_pattern(pattern: &str) -> String {
    let mut translated = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            translated.push(c);
            continue;
        }
        match chars.next() {
            Some('Z') => translated.push_str(r"\z"),
            Some(next) => {
                translated.push('\\');
                translated.push(next);
            }
            None => translated.push('\\'),
        }
    }

    translated
}
