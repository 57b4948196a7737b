//! Authentication and authorization: signed bearer tokens, users, roles
//! and the permission check.
//!
//! The signing key is random bytes generated once at server startup and
//! handed to [`token::TokenService`] by the caller -- there is no global
//! key and no rotation during the process lifetime.

pub mod acl;
pub mod token;
pub mod user;

pub use acl::{AclService, Permission, ADMINISTRATOR_ROLE};
pub use token::{Claims, TokenService};
pub use user::{User, UserStore};

use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{Result, SrvError};

/// Length of the HMAC signing key in bytes.
const SIGNING_KEY_LEN: usize = 32;

/// Draw a fresh random signing key.
pub fn generate_signing_key() -> Result<Vec<u8>> {
    let rng = SystemRandom::new();
    let mut key = vec![0u8; SIGNING_KEY_LEN];
    rng.fill(&mut key)
        .map_err(|_| SrvError::Signing("could not randomize signing key".into()))?;
    Ok(key)
}
