//! Route classification: which API operations are exposed as tools.
//!
//! A [`RoutePlan`] is an ordered list of method/path rules compiled once at
//! startup. Classification walks the list in declaration order and returns the
//! decision of the first rule that matches. Precedence is positional: a later
//! rule never overrides an earlier match, however specific it is.
//!
//! Every compiled plan ends in a catch-all [`RouteDecision::Exclude`], so an
//! operation that no rule names explicitly is hidden.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::InvalidRuleError;

/// HTTP method of an API operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
    /// `OPTIONS`
    Options,
    /// `HEAD`
    Head,
    /// `PATCH`
    Patch,
    /// `TRACE`
    Trace,
}

impl HttpMethod {
    /// All methods, in the order path items list them.
    pub const ALL: [Self; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];

    /// Upper-case method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP method name that is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown HTTP method '{0}'")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

/// Methods a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodSet {
    /// Every method.
    Any,
    /// Only the listed methods.
    Only(BTreeSet<HttpMethod>),
}

impl MethodSet {
    /// Whether `method` is in the set.
    pub fn contains(&self, method: HttpMethod) -> bool {
        match self {
            Self::Any => true,
            Self::Only(methods) => methods.contains(&method),
        }
    }
}

/// What happens to an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteDecision {
    /// Expose the operation as a callable tool.
    Tool,
    /// Hide the operation.
    Exclude,
}

impl fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tool => f.write_str("Tool"),
            Self::Exclude => f.write_str("Exclude"),
        }
    }
}

/// A decision string that is neither `Tool` nor `Exclude`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown route decision '{0}' (expected Tool or Exclude)")]
pub struct UnknownDecision(pub String);

impl FromStr for RouteDecision {
    type Err = UnknownDecision;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tool" => Ok(Self::Tool),
            "exclude" => Ok(Self::Exclude),
            _ => Err(UnknownDecision(s.to_string())),
        }
    }
}

/// An API operation as seen by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operation {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template, e.g. `/v1/alerts/{id}`.
    pub path: String,
}

impl Operation {
    /// Create an operation.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

impl AsRef<Operation> for Operation {
    fn as_ref(&self) -> &Operation {
        self
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Configuration form of a rule, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRuleSpec {
    /// Method names; absent or `*` means every method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    /// Path regex; absent, empty or `*` means every path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// `Tool` or `Exclude`, case-insensitive.
    pub decision: String,
}

impl RouteRuleSpec {
    /// A rule for the given methods and pattern.
    pub fn new<I, S>(methods: I, pattern: &str, decision: RouteDecision) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            methods: Some(methods.into_iter().map(Into::into).collect()),
            pattern: Some(pattern.to_string()),
            decision: decision.to_string(),
        }
    }

    /// A rule matching every operation.
    pub fn catch_all(decision: RouteDecision) -> Self {
        Self {
            methods: None,
            pattern: None,
            decision: decision.to_string(),
        }
    }
}

/// Top-level shape of a route rule file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Rules in precedence order.
    #[serde(default)]
    pub rules: Vec<RouteRuleSpec>,
}

/// A validated rule.
#[derive(Debug, Clone)]
pub struct RouteRule {
    methods: MethodSet,
    pattern: Option<Regex>,
    source: Option<String>,
    decision: RouteDecision,
}

impl RouteRule {
    /// Methods this rule applies to.
    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    /// The pattern as configured, before anchoring.
    pub fn pattern(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// The rule's decision.
    pub fn decision(&self) -> RouteDecision {
        self.decision
    }

    /// Whether this rule matches every operation.
    ///
    /// A method list naming all methods counts as every method, and a pattern
    /// that accepts any path counts as no pattern.
    pub fn is_catch_all(&self) -> bool {
        self.methods == MethodSet::Any && self.pattern.is_none()
    }

    /// Whether this rule matches `operation`.
    pub fn matches(&self, operation: &Operation) -> bool {
        if !self.methods.contains(operation.method) {
            return false;
        }
        match &self.pattern {
            Some(pattern) => pattern.is_match(&operation.path),
            None => true,
        }
    }

    fn compile(index: usize, spec: &RouteRuleSpec) -> Result<Self, InvalidRuleError> {
        let pattern_text = spec.pattern.as_deref();
        let invalid = |reason: String| InvalidRuleError::new(index, pattern_text, reason);

        let methods = match &spec.methods {
            None => MethodSet::Any,
            Some(names) if names.is_empty() => {
                return Err(invalid("method list is empty".to_string()));
            }
            Some(names) if names.iter().any(|n| n.trim() == "*") => MethodSet::Any,
            Some(names) => {
                let methods = names
                    .iter()
                    .map(|n| n.parse::<HttpMethod>())
                    .collect::<Result<BTreeSet<_>, _>>()
                    .map_err(|e| invalid(e.to_string()))?;
                if methods.len() == HttpMethod::ALL.len() {
                    MethodSet::Any
                } else {
                    MethodSet::Only(methods)
                }
            }
        };

        let source = pattern_text
            .map(str::trim)
            .filter(|p| !p.is_empty() && *p != "*")
            .map(str::to_string);
        let pattern = source
            .as_deref()
            .map(|p| Regex::new(&format!("^(?:{})$", expand_placeholders(p))))
            .transpose()
            .map_err(|e| invalid(format!("pattern does not compile: {e}")))?
            .filter(|re| !matches_any_path(re));

        let decision = spec
            .decision
            .parse::<RouteDecision>()
            .map_err(|e| invalid(e.to_string()))?;

        let rule = Self {
            methods,
            pattern,
            source,
            decision,
        };
        if rule.is_catch_all() && decision == RouteDecision::Tool {
            return Err(invalid(
                "a catch-all rule cannot expose every operation".to_string(),
            ));
        }
        Ok(rule)
    }
}

/// Whether a compiled pattern accepts every path, such as `.*`.
///
/// Sampled on the empty path and on a path no real template contains.
fn matches_any_path(pattern: &Regex) -> bool {
    pattern.is_match("") && pattern.is_match("/\u{0}")
}

/// Replace `{name}` path placeholders with a single-segment matcher.
///
/// Regex repetition counts such as `{2}` or `{1,3}` are left alone, as is
/// anything escaped with a backslash.
fn expand_placeholders(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(pos) = rest.find(['{', '\\']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(escaped) = tail.strip_prefix('\\') {
            out.push('\\');
            let mut chars = escaped.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
            continue;
        }

        match tail[1..].find('}') {
            Some(end) if is_identifier(&tail[1..=end]) => {
                out.push_str("[^/]+");
                rest = &tail[end + 2..];
            }
            _ => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Compiled, immutable route plan.
#[derive(Debug, Clone)]
pub struct RoutePlan {
    rules: Vec<RouteRule>,
}

impl RoutePlan {
    /// Validate `specs` and compile them into a plan.
    ///
    /// A catch-all `Exclude` is appended unless the list already ends in one.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRuleError`] for the first rule with an empty or unknown
    /// method list, a pattern that does not compile, an unknown decision, or a
    /// catch-all `Tool` decision.
    pub fn compile(
        specs: impl IntoIterator<Item = RouteRuleSpec>,
    ) -> Result<Self, InvalidRuleError> {
        let mut rules = specs
            .into_iter()
            .enumerate()
            .map(|(index, spec)| RouteRule::compile(index, &spec))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(pos) = rules.iter().position(RouteRule::is_catch_all)
            && pos + 1 < rules.len()
        {
            warn!(
                catch_all = pos,
                unreachable = rules.len() - pos - 1,
                "Rules after the catch-all can never match"
            );
        }

        if !rules.last().is_some_and(RouteRule::is_catch_all) {
            rules.push(RouteRule {
                methods: MethodSet::Any,
                pattern: None,
                source: None,
                decision: RouteDecision::Exclude,
            });
        }

        debug!(rules = rules.len(), "Compiled route plan");
        Ok(Self { rules })
    }

    /// The built-in StackRox allow-list.
    ///
    /// # Errors
    ///
    /// Never in practice; the list is fixed and valid.
    pub fn stackrox_default() -> Result<Self, InvalidRuleError> {
        Self::compile(stackrox_default_rules())
    }

    /// Compiled rules, ending in the catch-all.
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Decision of the first rule matching `operation`.
    pub fn classify(&self, operation: &Operation) -> RouteDecision {
        self.rules
            .iter()
            .find(|rule| rule.matches(operation))
            .map_or(RouteDecision::Exclude, RouteRule::decision)
    }

    /// Split operations into `(exposed, excluded)`, preserving order.
    pub fn partition<T: AsRef<Operation>>(
        &self,
        operations: impl IntoIterator<Item = T>,
    ) -> (Vec<T>, Vec<T>) {
        operations
            .into_iter()
            .partition(|op| self.classify(op.as_ref()) == RouteDecision::Tool)
    }
}

/// Rule list of the built-in StackRox allow-list.
pub fn stackrox_default_rules() -> Vec<RouteRuleSpec> {
    use RouteDecision::{Exclude, Tool};

    vec![
        RouteRuleSpec::new(["GET"], r"^/v1/alerts$", Tool),
        RouteRuleSpec::new(["GET"], r"^/v1/alerts/{id}$", Tool),
        RouteRuleSpec::new(["GET"], r"^/v1/clusters$", Tool),
        RouteRuleSpec::new(["GET"], r"^/v1/cve/requests.*", Tool),
        RouteRuleSpec::new(["POST"], r"^/v1/cve/requests.*", Tool),
        RouteRuleSpec::new(["GET"], r"^/v1/deployments$", Tool),
        RouteRuleSpec::new(["GET"], r"^/v1/namespaces$", Tool),
        RouteRuleSpec::new(["GET"], r"^/v1/deploymentswithrisk/{id}$", Tool),
        RouteRuleSpec::new(["GET"], r"^/v1/policies$", Tool),
        RouteRuleSpec::new(["GET"], r"^/v1/policies/{id}$", Tool),
        RouteRuleSpec::new(["POST", "PUT"], r"^/v1/policies$|^/v1/policies/{id}$", Tool),
        RouteRuleSpec::catch_all(Exclude),
    ]
}
