//! Path Resolver: base URL + segments -> absolute URL.
//!
//! # Design
//! Two addressing styles are supported:
//! - positional segments (`["customers", id, "bank_accounts", id]`), used by
//!   resource handles;
//! - named endpoints, a fixed template looked up by name and filled with
//!   arguments (`"accounts?currency={currency}"`).
//!
//! Joining is delegated to `url::Url` path-segment editing, so there is
//! exactly one `/` between segments whether or not the base ends in one,
//! empty segments are skipped, and reserved characters inside a segment are
//! percent-escaped. Dot segments (`.`, `..`) are rejected: they cannot be
//! carried through a URL without changing which resource it names.
//! Resolution is a pure function of its inputs.

use std::collections::BTreeMap;

use url::Url;

use crate::error::ApiError;

/// Parse and validate a base URL. Only absolute `http`/`https` URLs are accepted.
pub fn parse_base(raw: &str) -> Result<Url, ApiError> {
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base".to_string()));
    }
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    url.set_fragment(None);
    Ok(url)
}

/// Join `segments` onto `base`.
pub fn resolve<I, S>(base: &Url, segments: I) -> Result<Url, ApiError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut url = base.clone();
    {
        let mut path = url.path_segments_mut().map_err(|()| ApiError::InvalidBaseUrl {
            url: base.to_string(),
            reason: "URL cannot be a base".to_string(),
        })?;
        path.pop_if_empty();
        for segment in segments {
            let segment = segment.as_ref();
            // `.` and `..` are dropped by URL normalization, even percent-encoded.
            if matches!(segment, "." | "..") {
                return Err(ApiError::InvalidSegment(segment.to_string()));
            }
            if !segment.is_empty() {
                path.push(segment);
            }
        }
    }
    Ok(url)
}

/// Append form-encoded query pairs. A no-op for an empty slice, so no stray `?`.
pub fn append_query(url: &mut Url, query: &[(&str, &str)]) {
    if query.is_empty() {
        return;
    }
    let mut pairs = url.query_pairs_mut();
    for (key, value) in query {
        pairs.append_pair(key, value);
    }
}

/// Named endpoint templates.
///
/// Placeholders are written `{name}`. In the path they must occupy a whole
/// segment; in the query they supply a value.
#[derive(Debug, Clone, Default)]
pub struct EndpointTable {
    templates: BTreeMap<String, String>,
}

impl EndpointTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a template.
    pub fn with(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.insert(name, template);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(name.into(), template.into());
    }

    pub fn template(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    /// Resolve endpoint `name` against `base`, substituting `args`.
    pub fn resolve(&self, base: &Url, name: &str, args: &[(&str, &str)]) -> Result<Url, ApiError> {
        let template = self
            .template(name)
            .ok_or_else(|| ApiError::UnknownEndpoint(name.to_string()))?;

        let lookup = |piece: &str| -> Result<String, ApiError> {
            match placeholder(piece) {
                None => Ok(piece.to_string()),
                Some(key) => args
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| (*v).to_string())
                    .ok_or_else(|| ApiError::MissingTemplateArgument {
                        endpoint: name.to_string(),
                        name: key.to_string(),
                    }),
            }
        };

        let (path, query) = match template.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (template, None),
        };

        let segments = path.split('/').map(lookup).collect::<Result<Vec<_>, _>>()?;
        let mut url = resolve(base, &segments)?;

        if let Some(query) = query {
            let mut pairs = Vec::new();
            for pair in query.split('&').filter(|p| !p.is_empty()) {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                pairs.push((key.to_string(), lookup(value)?));
            }
            let borrowed: Vec<(&str, &str)> =
                pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            append_query(&mut url, &borrowed);
        }
        Ok(url)
    }
}

fn placeholder(piece: &str) -> Option<&str> {
    piece.strip_prefix('{')?.strip_suffix('}')
}
