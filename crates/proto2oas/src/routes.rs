//! HTTP route resolution for RPC methods.
//!
//! Each method is exposed at one `(verb, template)` pair, picked in order from:
//!
//! 1. the caller's override table, keyed `Service.Method`, with values like
//!    `"get /users/:userId"`;
//! 2. the method's `google.api.http` binding, when enabled;
//! 3. the default `post /{tag}/{method}`.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::schema::HttpBinding;

/// Known HTTP methods per the `OpenAPI` specification.
const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Verb used when a method has no explicit route.
pub const DEFAULT_VERB: &str = "post";

/// Verb, `{param}`-style URL template and placeholder names for one method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Lower-case HTTP verb.
    pub verb: String,
    /// URL template with brace placeholders.
    pub template: String,
    /// Placeholder names, left to right.
    pub path_params: Vec<String>,
}

/// Caller-supplied `Service.Method` → `"verb /path"` overrides.
pub type RouteTable = IndexMap<String, String>;

/// Resolve the route for `service.method`.
///
/// `tag` is the service's qualified name, used by the default template.
/// `binding` is the method's `google.api.http` option, consulted only when
/// `use_http_annotations` is set.
///
/// # Errors
///
/// Returns [`Error::InvalidRoute`] if the override is not `"<verb> <path>"`
/// with a known HTTP verb.
pub fn resolve_route(
    tag: &str,
    service: &str,
    method: &str,
    routes: &RouteTable,
    binding: Option<&HttpBinding>,
    use_http_annotations: bool,
) -> Result<ResolvedRoute> {
    let key = format!("{service}.{method}");

    // A blank override counts as absent.
    if let Some(route) = routes.get(&key).filter(|r| !r.trim().is_empty()) {
        return parse_override(&key, route);
    }

    if let Some(binding) = binding.filter(|_| use_http_annotations) {
        let (template, path_params) = convert_brace_params(&binding.template);
        return Ok(ResolvedRoute {
            verb: binding.verb.to_ascii_lowercase(),
            template,
            path_params,
        });
    }

    Ok(ResolvedRoute {
        verb: DEFAULT_VERB.to_string(),
        template: format!("/{tag}/{method}"),
        path_params: Vec::new(),
    })
}

/// Split `"get /users/:userId"` into verb and template, converting `:name`
/// placeholders to `{name}`.
///
/// The template is the first whitespace-delimited token after the verb;
/// anything following it is ignored.
fn parse_override(key: &str, route: &str) -> Result<ResolvedRoute> {
    let invalid = || Error::InvalidRoute {
        method: key.to_string(),
        route: route.to_string(),
    };

    let mut tokens = route.split_whitespace();
    let verb = tokens.next().ok_or_else(invalid)?.to_ascii_lowercase();
    let path = tokens.next().ok_or_else(invalid)?;
    if !HTTP_METHODS.contains(&verb.as_str()) {
        return Err(invalid());
    }

    let (template, path_params) = convert_colon_params(path);
    Ok(ResolvedRoute {
        verb,
        template,
        path_params,
    })
}

fn is_param_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Rewrite `:name` tokens to `{name}` and collect the names in order.
///
/// A name is a run of ASCII word characters or hyphens; a `:` not followed by
/// one is kept verbatim.
fn convert_colon_params(path: &str) -> (String, Vec<String>) {
    let mut template = String::with_capacity(path.len() + 2);
    let mut params = Vec::new();
    let mut rest = path;

    while let Some(start) = rest.find(':') {
        template.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let len = after.find(|c| !is_param_char(c)).unwrap_or(after.len());

        if len == 0 {
            template.push(':');
        } else {
            let name = &after[..len];
            template.push('{');
            template.push_str(name);
            template.push('}');
            params.push(name.to_string());
        }
        rest = &after[len..];
    }
    template.push_str(rest);

    (template, params)
}

/// Strip `=pattern` suffixes from `{name=pattern}` placeholders and collect
/// the names in order.
fn convert_brace_params(path: &str) -> (String, Vec<String>) {
    let mut template = String::with_capacity(path.len());
    let mut params = Vec::new();
    let mut rest = path;

    while let Some(start) = rest.find('{') {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let inner = &rest[start + 1..start + end];
        let name = inner.split_once('=').map_or(inner, |(name, _)| name);
        template.push_str(&rest[..start]);
        template.push('{');
        template.push_str(name);
        template.push('}');
        params.push(name.to_string());
        rest = &rest[start + end + 1..];
    }
    template.push_str(rest);

    (template, params)
}
