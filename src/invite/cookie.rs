//! Invite cookie codec.
//!
//! A small typed builder over `axum_extra`'s cookie type. The invite cookie is
//! always `HttpOnly` and `Secure`; [`InviteCookie::new`] refuses options that
//! would drop either attribute or outlive the TTL cap.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use thiserror::Error;

use crate::config::{InviteConfig, MAX_INVITE_COOKIE_TTL_SECONDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSitePolicy {
    Strict,
    Lax,
    None,
}

impl From<SameSitePolicy> for SameSite {
    fn from(policy: SameSitePolicy) -> Self {
        match policy {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::Lax => SameSite::Lax,
            SameSitePolicy::None => SameSite::None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CookieError {
    #[error("cookie name cannot be empty")]
    EmptyName,

    #[error("cookie path must start with '/'")]
    InvalidPath,

    #[error("SameSite=None requires the Secure attribute")]
    SameSiteNoneRequiresSecure,

    #[error("invite cookie must be HttpOnly and Secure")]
    InsecureInviteCookie,

    #[error("invite cookie needs a max-age")]
    MissingTtl,

    #[error("invite cookie max-age must be between 1 and {max} seconds, got {got}")]
    InvalidTtl { got: i64, max: i64 },
}

/// Attributes attached to a `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub max_age: Option<i64>,
    pub domain: Option<String>,
    pub path: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSitePolicy,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            max_age: None,
            domain: None,
            path: "/".to_string(),
            http_only: true,
            secure: true,
            same_site: SameSitePolicy::Lax,
        }
    }
}

impl CookieOptions {
    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn same_site(mut self, same_site: SameSitePolicy) -> Self {
        self.same_site = same_site;
        self
    }

    fn check(&self) -> Result<(), CookieError> {
        if !self.path.starts_with('/') {
            return Err(CookieError::InvalidPath);
        }
        if self.same_site == SameSitePolicy::None && !self.secure {
            return Err(CookieError::SameSiteNoneRequiresSecure);
        }
        Ok(())
    }

    fn build(&self, name: &str, value: &str, max_age: Option<i64>) -> Cookie<'static> {
        let mut builder = Cookie::build((name.to_string(), value.to_string()))
            .path(self.path.clone())
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.same_site.into());

        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        if let Some(seconds) = max_age {
            builder = builder.max_age(time::Duration::seconds(seconds));
        }

        builder.build()
    }
}

/// Longest token accepted into the invite cookie.
pub const MAX_COOKIE_VALUE_LEN: usize = 512;

/// True when `value` is acceptable as an invite token: printable ASCII
/// without quotes, commas, semicolons or backslashes.
pub fn is_valid_value(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_COOKIE_VALUE_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_graphic() && !matches!(b, b'"' | b',' | b';' | b'\\'))
}

/// Render a cookie as a `Set-Cookie` header value. Name and value are
/// percent-encoded, matching the decoding `CookieJar` applies on the way in.
pub fn to_header(cookie: &Cookie<'_>) -> String {
    cookie.encoded().to_string()
}

/// Render a `Set-Cookie` header value.
pub fn encode(name: &str, value: &str, options: &CookieOptions) -> Result<String, CookieError> {
    if name.is_empty() {
        return Err(CookieError::EmptyName);
    }
    options.check()?;
    Ok(to_header(&options.build(name, value, options.max_age)))
}

/// The invite cookie: fixed name and attributes, shared by set and clear so
/// the browser overwrites the same cookie.
#[derive(Debug, Clone)]
pub struct InviteCookie {
    name: String,
    options: CookieOptions,
}

impl InviteCookie {
    pub fn new(name: impl Into<String>, options: CookieOptions) -> Result<Self, CookieError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CookieError::EmptyName);
        }
        options.check()?;
        if !options.http_only || !options.secure {
            return Err(CookieError::InsecureInviteCookie);
        }
        match options.max_age {
            None => return Err(CookieError::MissingTtl),
            Some(ttl) if !(1..=MAX_INVITE_COOKIE_TTL_SECONDS).contains(&ttl) => {
                return Err(CookieError::InvalidTtl { got: ttl, max: MAX_INVITE_COOKIE_TTL_SECONDS })
            }
            Some(_) => {}
        }

        Ok(Self { name, options })
    }

    pub fn from_config(config: &InviteConfig) -> Result<Self, CookieError> {
        let mut options = CookieOptions::default()
            .path(config.cookie_path.clone())
            .max_age(config.cookie_ttl_seconds)
            .same_site(SameSitePolicy::Lax);
        if let Some(domain) = &config.cookie_domain {
            options = options.domain(domain.clone());
        }
        Self::new(config.cookie_name.clone(), options)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &CookieOptions {
        &self.options
    }

    pub fn set(&self, token: &str) -> Cookie<'static> {
        self.options.build(&self.name, token, self.options.max_age)
    }

    /// Expire the cookie: empty value, `Max-Age=0`, same domain and path.
    pub fn clear(&self) -> Cookie<'static> {
        self.options.build(&self.name, "", Some(0))
    }

    /// Invite token carried by the request, if any. Empty values count as
    /// absent.
    pub fn read(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }
}
