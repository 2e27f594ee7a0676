//! Cookie-addressed sessions with expiry.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use rand::Rng;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::kv::{Cache, KvStore};
use crate::{cache_key, CacheError};

const SESSION_PREFIX: &str = "sess_";
const SESSION_RANDOM_BYTES: usize = 18;
/// Base64 length of the random part.
const SESSION_RANDOM_LEN: usize = 24;

/// An opaque session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new random session ID: `sess_` followed by 24 URL-safe
    /// base64 characters.
    pub fn generate() -> Self {
        let bytes: [u8; SESSION_RANDOM_BYTES] = rand::thread_rng().gen();
        Self(format!("{}{}", SESSION_PREFIX, URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Accept only IDs shaped like ones [`generate`](Self::generate) makes,
    /// so cookie input cannot address arbitrary store keys.
    pub fn parse(raw: &str) -> Result<Self, CacheError> {
        let random = raw
            .strip_prefix(SESSION_PREFIX)
            .ok_or(CacheError::InvalidSessionId)?;
        let well_formed = random.len() == SESSION_RANDOM_LEN
            && random
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !well_formed {
            return Err(CacheError::InvalidSessionId);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session record as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData<T> {
    pub id: SessionId,
    pub data: T,
    /// Bumped on every write.
    pub version: u64,
    /// Unix timestamps (seconds).
    pub created_at: i64,
    pub updated_at: i64,
    pub expires_at: i64,
}

impl<T> SessionData<T> {
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    fn stamp(&self) -> (u64, i64) {
        (self.version, self.created_at)
    }
}

/// Session manager over a key-value store.
///
/// Every write extends the session by the configured TTL; an expired
/// record reads as absent.
pub struct Session<T, S> {
    cache: Cache<S>,
    ttl_secs: i64,
    _phantom: std::marker::PhantomData<T>,
}

impl<T, S> Session<T, S>
where
    T: Serialize + DeserializeOwned + Default,
    S: KvStore,
{
    pub fn new(store: S, ttl_secs: u64) -> Self {
        Self {
            cache: Cache::new(store),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
            _phantom: std::marker::PhantomData,
        }
    }

    /// Full record including version, if present and live. An expired
    /// record is deleted; the store has no expiry of its own.
    pub fn get_versioned(&self, id: &SessionId) -> Result<Option<SessionData<T>>, CacheError> {
        let key = session_key(id);
        match self.cache.get::<SessionData<T>>(&key)? {
            Some(record) if record.is_expired(Utc::now().timestamp()) => {
                self.cache.delete(&key)?;
                Ok(None)
            }
            record => Ok(record),
        }
    }

    pub fn get(&self, id: &SessionId) -> Result<Option<T>, CacheError> {
        Ok(self.get_versioned(id)?.map(|r| r.data))
    }

    /// Session data, writing a fresh default record when absent or expired.
    pub fn get_or_create(&self, id: &SessionId) -> Result<T, CacheError> {
        match self.get_versioned(id)? {
            Some(record) => Ok(record.data),
            None => {
                let data = T::default();
                self.write(id, &data, None)?;
                Ok(data)
            }
        }
    }

    /// Unconditional write.
    pub fn set(&self, id: &SessionId, data: &T) -> Result<(), CacheError> {
        let previous = self.get_versioned(id)?.map(|r| r.stamp());
        self.write(id, data, previous)
    }

    pub fn delete(&self, id: &SessionId) -> Result<(), CacheError> {
        self.cache.delete(&session_key(id))
    }

    pub fn exists(&self, id: &SessionId) -> Result<bool, CacheError> {
        Ok(self.get_versioned(id)?.is_some())
    }

    /// Read-modify-write. Starts from `T::default()` when the session is
    /// missing or expired. Returns the written data.
    pub fn update<F>(&self, id: &SessionId, f: F) -> Result<T, CacheError>
    where
        F: FnOnce(&mut T),
    {
        let (mut data, previous) = match self.get_versioned(id)? {
            Some(record) => {
                let stamp = record.stamp();
                (record.data, Some(stamp))
            }
            None => (T::default(), None),
        };

        f(&mut data);
        self.write(id, &data, previous)?;
        Ok(data)
    }

    fn write(
        &self,
        id: &SessionId,
        data: &T,
        previous: Option<(u64, i64)>,
    ) -> Result<(), CacheError> {
        let now = Utc::now().timestamp();
        let record = SessionData {
            id: id.clone(),
            data,
            version: previous.map(|(version, _)| version + 1).unwrap_or(1),
            created_at: previous.map(|(_, created)| created).unwrap_or(now),
            updated_at: now,
            expires_at: now.saturating_add(self.ttl_secs),
        };
        self.cache.set(&session_key(id), &record)
    }

    pub fn cache(&self) -> &Cache<S> {
        &self.cache
    }
}

fn session_key(id: &SessionId) -> String {
    cache_key!("session", id)
}
