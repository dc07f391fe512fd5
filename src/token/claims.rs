use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, Header};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Claims carried by fabricated tokens.
///
/// NOTE:
/// - Field names on the wire follow what the auth service issues (`fullName`, `imageURL`, ...).
/// - Everything except `iat` is optional; absent claims are not serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(rename = "fullName", default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(rename = "imageURL", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub iat: i64,

    // Service account tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_accountname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
}

impl Claims {
    /// Empty claim set issued now.
    pub fn issued_now() -> Self {
        Self {
            iat: chrono::Utc::now().timestamp(),
            ..Self::default()
        }
    }

    pub fn is_service_account(&self) -> bool {
        self.service_accountname.is_some()
    }
}

/// A JWT, signed or not.
///
/// `raw` holds the compact serialization once the token has been signed
/// (or parsed); unsigned tokens only exist in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub header: Header,
    pub claims: Claims,
    pub raw: Option<String>,
}

impl Token {
    pub fn new(alg: Algorithm, claims: Claims) -> Self {
        let mut header = Header::new(alg);
        header.typ = Some("JWT".to_string());
        Self {
            header,
            claims,
            raw: None,
        }
    }

    pub fn is_signed(&self) -> bool {
        self.raw.is_some()
    }

    /// `base64url(header) + "." + base64url(claims)`, the part a signature covers.
    pub fn signing_string(&self) -> Result<String> {
        let header = serde_json::to_vec(&self.header)?;
        let claims = serde_json::to_vec(&self.claims)?;
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims)
        ))
    }
}
