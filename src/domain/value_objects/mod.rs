//! Value Objects for the storefront

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Product identity. Seed products use small integers; admin-added products use
/// clock-derived values above every seed id.
pub type ProductId = u64;

/// Order identifier, time-ordered so ids sort by placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    pub fn generate() -> Self { Self(Uuid::now_v7()) }
    pub fn as_uuid(&self) -> &Uuid { &self.0 }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "ORD-{}", self.0.simple()) }
}

/// `data:` URL carrying inline media, as stored for custom promotional uploads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataUrl(String);

impl DataUrl {
    pub fn encode(content_type: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{};base64,{}", content_type, BASE64.encode(bytes)))
    }
    pub fn as_str(&self) -> &str { &self.0 }
    pub fn content_type(&self) -> Option<&str> {
        self.0.strip_prefix("data:")?.split(';').next()
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}
