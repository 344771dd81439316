// Declarative per-field request validation.
//
// Each endpoint declares an ordered list of `FieldRule`s. Every rule runs a
// short-circuiting chain of checks against one field; all failing fields are
// collected so the client sees every problem at once.

pub mod identifier;
pub mod sanitize;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

pub use identifier::{is_valid_id, is_valid_id_str, new_id};
pub use sanitize::Sanitize;

/// A JSON object as received in a request or stored in a collection
pub type Document = Map<String, Value>;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// Where a validated value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Body,
    Params,
}

/// One failing field in a validation response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub location: Location,
    pub msg: String,
    pub param: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    String,
    Integer,
    Boolean,
}

/// Cross-field predicate: receives the field value and the whole source object
pub type Predicate = fn(&Value, &Document) -> bool;

/// Ordered chain of checks for a single field
#[derive(Clone)]
pub struct FieldRule {
    location: Location,
    name: &'static str,
    optional: bool,
    kind: Option<Kind>,
    length: Option<(usize, usize)>,
    range: (Option<i64>, Option<i64>),
    one_of: Option<&'static [&'static str]>,
    email: bool,
    custom: Vec<(Predicate, String)>,
    sanitize: Sanitize,
}

impl FieldRule {
    fn new(location: Location, name: &'static str) -> Self {
        Self {
            location,
            name,
            optional: false,
            kind: None,
            length: None,
            range: (None, None),
            one_of: None,
            email: false,
            custom: Vec::new(),
            sanitize: Sanitize::None,
        }
    }

    pub fn body(name: &'static str) -> Self {
        Self::new(Location::Body, name)
    }

    pub fn param(name: &'static str) -> Self {
        Self::new(Location::Params, name)
    }

    /// Skip every check when the field is absent
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn string(mut self) -> Self {
        self.kind = Some(Kind::String);
        self
    }

    /// Free text: a string that gets stripped, escaped and trimmed
    pub fn text(mut self) -> Self {
        self.kind = Some(Kind::String);
        self.sanitize = Sanitize::Text;
        self
    }

    pub fn integer(mut self) -> Self {
        self.kind = Some(Kind::Integer);
        self
    }

    pub fn boolean(mut self) -> Self {
        self.kind = Some(Kind::Boolean);
        self
    }

    pub fn length(mut self, min: usize, max: usize) -> Self {
        self.length = Some((min, max));
        self
    }

    pub fn min(mut self, min: i64) -> Self {
        self.range.0 = Some(min);
        self
    }

    pub fn max(mut self, max: i64) -> Self {
        self.range.1 = Some(max);
        self
    }

    pub fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.kind = Some(Kind::String);
        self.one_of = Some(values);
        self
    }

    pub fn email(mut self) -> Self {
        self.kind = Some(Kind::String);
        self.email = true;
        self.sanitize = Sanitize::Trim;
        self
    }

    /// A resource identifier (`school_id`, path `id`, ...), normalized to
    /// lowercase once it passes
    pub fn object_id(mut self) -> Self {
        let msg = format!("{} must be a valid id", self.name);
        self.sanitize = Sanitize::Lowercase;
        self.custom(|v, _| is_valid_id(v), msg)
    }

    pub fn custom(mut self, predicate: Predicate, msg: impl Into<String>) -> Self {
        self.custom.push((predicate, msg.into()));
        self
    }

    fn fail(&self, msg: impl Into<String>, value: Option<&Value>) -> FieldError {
        FieldError {
            location: self.location,
            msg: msg.into(),
            param: self.name.to_string(),
            value: value.cloned(),
        }
    }

    /// Run the chain. `Ok(None)` means the field is optional and absent.
    pub fn check(&self, source: &Document) -> Result<Option<Value>, FieldError> {
        let value = match source.get(self.name) {
            Some(v) => v,
            None if self.optional => return Ok(None),
            None => return Err(self.fail(format!("{} is required", self.name), None)),
        };

        let blank = match value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        };
        if blank {
            return Err(self.fail(format!("{} cannot be empty", self.name), Some(value)));
        }

        match self.kind {
            Some(Kind::String) if !value.is_string() => {
                return Err(self.fail(format!("{} must be a string", self.name), Some(value)));
            }
            Some(Kind::Integer) if value.as_i64().is_none() => {
                return Err(self.fail(format!("{} must be an integer", self.name), Some(value)));
            }
            Some(Kind::Boolean) if !value.is_boolean() => {
                return Err(self.fail(format!("{} must be a boolean", self.name), Some(value)));
            }
            _ => {}
        }

        if let (Some((min, max)), Some(s)) = (self.length, value.as_str()) {
            let len = s.trim().chars().count();
            if len < min || len > max {
                return Err(self.fail(
                    format!("{} must be between {} and {} characters", self.name, min, max),
                    Some(value),
                ));
            }
        }

        if let Some(n) = value.as_i64() {
            match self.range {
                (Some(min), Some(max)) if n < min || n > max => {
                    return Err(self.fail(
                        format!("{} must be between {} and {}", self.name, min, max),
                        Some(value),
                    ));
                }
                (Some(min), None) if n < min => {
                    return Err(self.fail(format!("{} must be at least {}", self.name, min), Some(value)));
                }
                (None, Some(max)) if n > max => {
                    return Err(self.fail(format!("{} must be at most {}", self.name, max), Some(value)));
                }
                _ => {}
            }
        }

        if let (Some(allowed), Some(s)) = (self.one_of, value.as_str()) {
            if !allowed.contains(&s) {
                return Err(self.fail(
                    format!("{} must be one of: {}", self.name, allowed.join(", ")),
                    Some(value),
                ));
            }
        }

        if self.email && !value.as_str().map(|s| EMAIL_RE.is_match(s.trim())).unwrap_or(false) {
            return Err(self.fail(format!("{} must be a valid email", self.name), Some(value)));
        }

        for (predicate, msg) in &self.custom {
            if !predicate(value, source) {
                return Err(self.fail(msg.clone(), Some(value)));
            }
        }

        Ok(Some(match value {
            Value::String(s) => Value::String(self.sanitize.apply(s)),
            other => other.clone(),
        }))
    }
}

/// Both request sources after every rule passed, with sanitized values written back
#[derive(Debug, Clone, PartialEq)]
pub struct Sanitized {
    pub params: Document,
    pub body: Document,
}

/// Run every rule against its source and collect all failures in declaration order.
pub fn validate(rules: &[FieldRule], params: &Document, body: Document) -> Result<Sanitized, Vec<FieldError>> {
    let mut sanitized = Sanitized {
        params: params.clone(),
        body: body.clone(),
    };
    let mut errors = Vec::new();

    for rule in rules {
        let (source, target) = match rule.location {
            Location::Body => (&body, &mut sanitized.body),
            Location::Params => (params, &mut sanitized.params),
        };
        match rule.check(source) {
            Ok(Some(value)) => {
                target.insert(rule.name.to_string(), value);
            }
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(sanitized)
    } else {
        Err(errors)
    }
}
