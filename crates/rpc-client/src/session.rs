use std::fmt;

use serde::Serialize;
use uuid::Uuid;

/// Opaque identifier correlating a queue submission with its poll stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionHash(String);

impl SessionHash {
    const LEN: usize = 12;

    pub fn random() -> Self {
        let mut s = Uuid::new_v4().simple().to_string();
        s.truncate(Self::LEN);
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
