//! One-shot messages carried across a redirect in a cookie.
//!
//! The level and message are form-urlencoded into one string, and that string
//! is percent-encoded once more for the cookie. tower-cookies percent-decodes
//! incoming values, which peels off exactly that outer layer.

use axum::response::Redirect;
use tower_cookies::{Cookie, Cookies};
use url::form_urlencoded;

pub const FLASH_COOKIE: &str = "flash";

/// Upper bound for the encoded cookie value. Browsers drop cookies over ~4 KB.
pub const MAX_COOKIE_VALUE: usize = 3072;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: String,
    pub message: String,
}

impl Flash {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: "error".to_string(),
            message: message.into(),
        }
    }

    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("level", &self.level)
            .append_pair("message", &self.message)
            .finish()
    }

    /// Value as written into the `Set-Cookie` header.
    pub fn to_cookie_value(&self) -> String {
        form_urlencoded::byte_serialize(self.encode().as_bytes()).collect()
    }

    /// Drops trailing message characters until the cookie value fits in `limit`.
    pub fn fit_to(mut self, limit: usize) -> Self {
        while self.to_cookie_value().len() > limit && self.message.pop().is_some() {}
        self
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let mut level = None;
        let mut message = None;

        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "level" => level = Some(value.into_owned()),
                "message" => message = Some(value.into_owned()),
                _ => {}
            }
        }

        Some(Self {
            level: level.unwrap_or_else(|| "info".to_string()),
            message: message?,
        })
    }
}

/// Stores `flash` and redirects the browser back to the upload form.
pub fn redirect_with(cookies: &Cookies, flash: Flash) -> Redirect {
    let value = flash.fit_to(MAX_COOKIE_VALUE).to_cookie_value();

    let mut cookie = Cookie::new(FLASH_COOKIE, value);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_max_age(Some(time::Duration::minutes(5)));
    cookies.add(cookie);

    Redirect::to("/")
}

/// Returns the pending flash, if any, and clears it so it renders once. The
/// value seen here has already been percent-decoded by the cookie layer.
pub fn take(cookies: &Cookies) -> Option<Flash> {
    let value = cookies.get(FLASH_COOKIE)?.value().to_string();

    let mut cookie = Cookie::new(FLASH_COOKIE, "");
    cookie.set_path("/");
    cookies.remove(cookie);

    Flash::decode(&value)
}
