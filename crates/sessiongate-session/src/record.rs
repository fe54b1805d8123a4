//! Typed view of everything the client persists

use sessiongate_auth::DecodedToken;

use crate::error::StoreError;
use crate::store::{KeyValueStore, StorageKey, load_json};
use crate::types::{AuthRecord, SessionObject, TokenSet};

/// Persisted client record; every part is independently optional
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PersistedAuthRecord {
    /// Sign-in details
    pub auth: Option<AuthRecord>,
    /// Whether a provider session is believed live
    pub session: Option<bool>,
    /// Last issued tokens
    pub user_info: Option<TokenSet>,
    /// Last refreshed provider session
    pub session_object: Option<SessionObject>,
    /// Last decoded ID token
    pub decoded_id_token: Option<DecodedToken>,
    /// Avatar URL
    pub image: Option<String>,
    /// Avatar owner name
    pub image_name: Option<String>,
}

impl PersistedAuthRecord {
    /// Load every key from `store`
    ///
    /// # Errors
    ///
    /// [`StoreError::Corrupt`] naming the first key that does not parse.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self, StoreError> {
        Ok(Self {
            auth: load_json(store, StorageKey::Auth)?,
            session: load_json(store, StorageKey::Session)?,
            user_info: load_json(store, StorageKey::UserInfo)?,
            session_object: load_json(store, StorageKey::SessionObject)?,
            decoded_id_token: load_json(store, StorageKey::DecodedIdToken)?,
            image: load_json(store, StorageKey::Image)?,
            image_name: load_json(store, StorageKey::ImageName)?,
        })
    }

    /// Whether nothing has been persisted
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
