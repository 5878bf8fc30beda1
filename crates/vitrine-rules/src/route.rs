//! First-match request routing.

use http::uri::{PathAndQuery, Scheme};
use http::Uri;

use crate::error::{Result, RulesError};
use crate::pattern::PathPattern;
use crate::spec::RouteSpec;

/// Literal prefix replacement applied before forwarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    from: String,
    to: String,
}

impl Rewrite {
    /// Create a rewrite of `from` into `to`.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Prefix that is removed.
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Prefix that is put in its place.
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Rewrite `path`.
    ///
    /// Paths that do not start with `from` come back unchanged. A doubled `/`
    /// at the join is collapsed and an empty result becomes `/`, so
    /// `/admin/org/x` with `/admin -> /` yields `/org/x`.
    pub fn apply(&self, path: &str) -> String {
        let Some(rest) = path.strip_prefix(self.from.as_str()) else {
            return path.to_string();
        };

        let mut out = String::with_capacity(self.to.len() + rest.len() + 1);
        out.push_str(&self.to);
        if out.ends_with('/') && rest.starts_with('/') {
            out.pop();
        }
        out.push_str(rest);

        if !out.starts_with('/') {
            out.insert(0, '/');
        }
        out
    }
}

/// A plain-HTTP origin requests are forwarded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    uri: Uri,
}

impl Upstream {
    /// Parse and validate an upstream origin such as `http://localhost:3200`.
    ///
    /// `route` is only used to name the rule in errors.
    pub fn parse(route: &str, upstream: &str) -> Result<Self> {
        let invalid = |reason: &str| RulesError::InvalidUpstream {
            name: route.to_string(),
            upstream: upstream.to_string(),
            reason: reason.to_string(),
        };

        let uri: Uri = upstream.parse().map_err(|e: http::uri::InvalidUri| invalid(&e.to_string()))?;
        if uri.scheme() != Some(&Scheme::HTTP) {
            return Err(invalid("only http:// upstreams are supported"));
        }
        if uri.authority().is_none() {
            return Err(invalid("missing host"));
        }
        if let Some(pq) = uri.path_and_query() {
            if pq.query().is_some() || !matches!(pq.path(), "" | "/") {
                return Err(invalid("upstream must be an origin without path or query"));
            }
        }
        Ok(Self { uri })
    }

    /// `host[:port]`, the value the `Host` header is rewritten to.
    pub fn authority(&self) -> &str {
        self.uri.authority().map(|a| a.as_str()).unwrap_or_default()
    }

    /// Host without the port, IPv6 brackets removed.
    pub fn host(&self) -> &str {
        self.uri
            .host()
            .map(|host| host.trim_start_matches('[').trim_end_matches(']'))
            .unwrap_or_default()
    }

    /// Port to connect to, defaulting to 80.
    pub fn port(&self) -> u16 {
        self.uri.port_u16().unwrap_or(80)
    }

    /// The origin as a URI.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "http://{}", self.authority())
    }
}

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    name: String,
    mount: PathPattern,
    rewrite: Option<Rewrite>,
    upstream: Upstream,
}

impl RouteRule {
    /// Build a rule mounted at `match_prefix`.
    pub fn new(
        name: impl Into<String>,
        match_prefix: &str,
        rewrite: Option<Rewrite>,
        upstream: Upstream,
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            mount: PathPattern::mount(match_prefix)?,
            rewrite,
            upstream,
        })
    }

    /// Rule name, used in logs and error bodies.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The mount pattern.
    pub fn mount(&self) -> &PathPattern {
        &self.mount
    }

    /// The optional rewrite.
    pub fn rewrite(&self) -> Option<&Rewrite> {
        self.rewrite.as_ref()
    }

    /// Where matched requests go.
    pub fn upstream(&self) -> &Upstream {
        &self.upstream
    }

    /// Whether this rule matches every path.
    pub fn is_catch_all(&self) -> bool {
        self.mount.is_catch_all()
    }

    /// Check if this rule claims `path`.
    pub fn matches(&self, path: &str) -> bool {
        self.mount.matches(path)
    }

    /// The path to send upstream for an inbound `path`.
    pub fn forward_path(&self, path: &str) -> String {
        match &self.rewrite {
            Some(rewrite) => rewrite.apply(path),
            None => path.to_string(),
        }
    }
}

impl TryFrom<&RouteSpec> for RouteRule {
    type Error = RulesError;

    fn try_from(spec: &RouteSpec) -> Result<Self> {
        let rewrite = match (&spec.rewrite_from, &spec.rewrite_to) {
            (Some(from), Some(to)) => Some(Rewrite::new(from.clone(), to.clone())),
            (None, None) => None,
            _ => {
                return Err(RulesError::IncompleteRewrite {
                    name: spec.name.clone(),
                })
            }
        };
        let upstream = Upstream::parse(&spec.name, &spec.upstream)?;
        Self::new(spec.name.clone(), &spec.match_prefix, rewrite, upstream)
    }
}

/// The outcome of routing one request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    /// The rule that won.
    pub rule: &'a RouteRule,
    /// Path after any rewrite.
    pub forward_path: String,
}

impl RouteMatch<'_> {
    /// Origin-form target for the upstream request, keeping the query string.
    pub fn path_and_query(&self, query: Option<&str>) -> std::result::Result<PathAndQuery, http::Error> {
        let target = match query {
            Some(q) => format!("{}?{}", self.forward_path, q),
            None => self.forward_path.clone(),
        };
        Ok(PathAndQuery::try_from(target)?)
    }
}

/// An ordered, validated route table ending in a catch-all.
///
/// Built once at startup and shared read-only between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Validate and freeze a rule list.
    pub fn new(rules: Vec<RouteRule>) -> Result<Self> {
        let Some(last) = rules.last() else {
            return Err(RulesError::MissingCatchAll {
                last: "<empty>".into(),
            });
        };
        if !last.is_catch_all() {
            return Err(RulesError::MissingCatchAll {
                last: last.name().to_string(),
            });
        }
        let last_index = rules.len() - 1;
        if let Some((index, rule)) = rules
            .iter()
            .enumerate()
            .find(|(index, rule)| *index != last_index && rule.is_catch_all())
        {
            return Err(RulesError::CatchAllNotLast {
                name: rule.name().to_string(),
                index,
            });
        }
        Ok(Self { rules })
    }

    /// Build a table from configuration documents.
    pub fn from_specs(specs: &[RouteSpec]) -> Result<Self> {
        let rules = specs
            .iter()
            .map(RouteRule::try_from)
            .collect::<Result<Vec<_>>>()?;
        Self::new(rules)
    }

    /// Pick the first rule claiming `path` and compute the forwarded path.
    pub fn resolve(&self, path: &str) -> RouteMatch<'_> {
        // The last rule is a validated catch-all, so the search always succeeds
        // before falling off the end.
        let rule = self
            .rules
            .iter()
            .find(|rule| rule.matches(path))
            .unwrap_or_else(|| &self.rules[self.rules.len() - 1]);
        RouteMatch {
            rule,
            forward_path: rule.forward_path(path),
        }
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}
