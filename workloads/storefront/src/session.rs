//! Shopper session: cart, checkout draft and one-shot flash messages.

use serde::{Deserialize, Serialize};
use shop_sdk::prelude::*;

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "sid";

/// Everything the storefront keeps between requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSession {
    #[serde(default)]
    pub cart: Cart,
    #[serde(default)]
    pub checkout: CheckoutDraft,
    #[serde(default)]
    pub flash: Option<Flash>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// Message shown once on the page a form action redirects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

/// The session as loaded for one request.
#[derive(Debug)]
pub struct Visit {
    id: Option<SessionId>,
    pub state: StoreSession,
    /// `Set-Cookie` value when this request wrote the session.
    pub set_cookie: Option<String>,
}

impl Visit {
    /// Load the session named by the cookie. A missing, malformed or expired
    /// id reads as an empty session; no id is issued until something is saved.
    pub fn load<S: KvStore>(
        ctx: &RequestContext,
        sessions: &Session<StoreSession, S>,
    ) -> Result<Self, PageError> {
        let id = ctx
            .cookie(SESSION_COOKIE)
            .and_then(|raw| SessionId::parse(raw).ok());

        let state = match &id {
            Some(id) => sessions.get(id).map_err(session_error)?.unwrap_or_default(),
            None => StoreSession::default(),
        };

        Ok(Self {
            id,
            state,
            set_cookie: None,
        })
    }

    pub fn has_session(&self) -> bool {
        self.id.is_some()
    }

    /// Persist the current state, issuing an id on first write. Every write
    /// re-sends the cookie so its expiry tracks the stored record.
    pub fn save<S: KvStore>(
        &mut self,
        sessions: &Session<StoreSession, S>,
        ttl_secs: u64,
    ) -> Result<(), PageError> {
        let id = self.id.get_or_insert_with(SessionId::generate).clone();
        sessions.set(&id, &self.state).map_err(session_error)?;
        self.set_cookie = Some(session_cookie(&id, ttl_secs));
        Ok(())
    }

    /// Remove the pending flash message, writing the session only when there
    /// was one.
    pub fn take_flash<S: KvStore>(
        &mut self,
        sessions: &Session<StoreSession, S>,
        ttl_secs: u64,
    ) -> Result<Option<Flash>, PageError> {
        let flash = self.state.flash.take();
        if flash.is_some() {
            self.save(sessions, ttl_secs)?;
        }
        Ok(flash)
    }
}

/// `Set-Cookie` value for a session id.
pub fn session_cookie(id: &SessionId, ttl_secs: u64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, id, ttl_secs
    )
}

fn session_error(e: CacheError) -> PageError {
    PageError::Session(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sessions() -> Session<StoreSession, MemoryStore> {
        Session::new(MemoryStore::new(), 600)
    }

    #[test]
    fn test_load_without_cookie_is_empty() {
        let s = sessions();
        let ctx = RequestContext::new(Method::Get, "/cart");
        let visit = Visit::load(&ctx, &s).unwrap();
        assert!(!visit.has_session());
        assert_eq!(visit.state, StoreSession::default());
    }

    #[test]
    fn test_malformed_cookie_is_ignored() {
        let s = sessions();
        let ctx = RequestContext::new(Method::Get, "/cart").with_header("Cookie", "sid=../../etc");
        let visit = Visit::load(&ctx, &s).unwrap();
        assert!(!visit.has_session());
    }

    #[test]
    fn test_every_save_refreshes_cookie() {
        let s = sessions();
        let ctx = RequestContext::new(Method::Post, "/cart/add");
        let mut visit = Visit::load(&ctx, &s).unwrap();
        visit.state.flash = Some(Flash::success("Added"));
        visit.save(&s, 600).unwrap();

        let cookie = visit.set_cookie.clone().unwrap();
        assert!(cookie.starts_with("sid=sess_"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.ends_with("Max-Age=600"));

        let value = cookie.split(';').next().unwrap().to_string();
        let ctx = RequestContext::new(Method::Get, "/cart").with_header("Cookie", &value);
        let mut again = Visit::load(&ctx, &s).unwrap();
        assert!(again.has_session());
        assert!(again.set_cookie.is_none());
        assert_eq!(again.take_flash(&s, 600).unwrap(), Some(Flash::success("Added")));
        assert_eq!(again.set_cookie.as_deref(), Some(cookie.as_str()));

        let ctx = RequestContext::new(Method::Get, "/cart").with_header("Cookie", &value);
        let mut third = Visit::load(&ctx, &s).unwrap();
        assert!(third.state.flash.is_none());
        assert_eq!(third.take_flash(&s, 600).unwrap(), None);
        assert!(third.set_cookie.is_none());
    }
}
