//! Anti-forgery tokens

use std::fmt;

/// Cookie the storefront stores its anti-forgery token in.
pub const DEFAULT_COOKIE_NAME: &str = "csrftoken";

/// Header every mutating request carries the token in.
pub const HEADER_NAME: &str = "X-CSRFToken";

/// Anti-forgery token sent with every cart request.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Wraps a token value. Returns `None` for blank values.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();

        (!value.trim().is_empty()).then_some(Self(value))
    }

    /// Finds `name` in a `Cookie` header (`a=1; b=2`) and URI-decodes its value.
    pub fn from_cookie_header(header: &str, name: &str) -> Option<Self> {
        let raw = header
            .split(';')
            .map(str::trim)
            .filter_map(|pair| pair.split_once('='))
            .find_map(|(key, value)| (key == name).then_some(value))?;

        let decoded = urlencoding::decode(raw).ok()?;

        Self::new(decoded.into_owned())
    }

    /// Resolves the token from the cookie, falling back to the embedded form field.
    pub fn resolve(
        cookie_header: Option<&str>,
        name: &str,
        form_field: Option<&str>,
    ) -> Option<Self> {
        cookie_header
            .and_then(|header| Self::from_cookie_header(header, name))
            .or_else(|| form_field.and_then(Self::new))
    }

    /// Returns the token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CsrfToken(***)")
    }
}
