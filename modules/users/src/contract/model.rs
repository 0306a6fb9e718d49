use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use thiserror::Error;

/// Store-assigned identifier: 12 bytes rendered as 24 lowercase hex chars.
///
/// Layout: 4-byte big-endian unix seconds, 5 random bytes fixed per process,
/// 3-byte big-endian counter. Ids generated by one process sort in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{0}' is not a valid object id")]
pub struct ObjectIdError(pub String);

const COUNTER_MASK: u32 = 0x00FF_FFFF;

struct ProcessSeed {
    random: [u8; 5],
    counter: AtomicU32,
}

fn process_seed() -> &'static ProcessSeed {
    static SEED: OnceLock<ProcessSeed> = OnceLock::new();
    SEED.get_or_init(|| {
        let bytes = *uuid::Uuid::new_v4().as_bytes();
        let mut random = [0u8; 5];
        random.copy_from_slice(&bytes[..5]);
        // Start low in the 24-bit range so a burst of inserts never wraps.
        let start = u32::from_be_bytes([0, bytes[5], bytes[6], bytes[7]]) & 0x000F_FFFF;
        ProcessSeed {
            random,
            counter: AtomicU32::new(start),
        }
    })
}

impl ObjectId {
    pub fn generate() -> Self {
        let seed = process_seed();
        let secs = chrono::Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        let count = seed.counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&seed.random);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Parse a 24-character hex string (either case).
    pub fn parse_str(s: &str) -> Result<Self, ObjectIdError> {
        if s.len() != 24 {
            return Err(ObjectIdError(s.to_string()));
        }
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| ObjectIdError(s.to_string()))?;
        Ok(Self(bytes))
    }

    /// Seconds since the unix epoch at generation time.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

/// Pure user model for inter-layer communication (no serde/utoipa)
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: ObjectId,
    pub name: String,
    pub age: f64,
}

/// Data for creating a new user
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub age: f64,
}

/// Partial update data for a user
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub age: Option<f64>,
}

/// A user record after projection; omitted attributes are `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectedUser {
    pub id: Option<ObjectId>,
    pub name: Option<String>,
    pub age: Option<f64>,
}

impl From<User> for ProjectedUser {
    fn from(u: User) -> Self {
        Self {
            id: Some(u.id),
            name: Some(u.name),
            age: Some(u.age),
        }
    }
}

/// List request after transport decoding; `None` means "use the default".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListUsersQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// JSON filter document; `None` matches everything.
    pub filter: Option<serde_json::Value>,
    /// Space-separated projection; empty returns full records.
    pub projection: String,
}

/// One page of users with the effective paging values.
#[derive(Debug, Clone, PartialEq)]
pub struct UsersPage {
    pub page: u64,
    pub per_page: u64,
    pub items: Vec<ProjectedUser>,
}
