use chrono::{DateTime, Duration, Utc};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// A 6-digit code mailed to the account owner.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordResetCode {
    pub id: String,
    pub email: String,
    pub code: String,
    pub created_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub used: bool,
}

impl PasswordResetCode {
    /// Explicit expiry, or `created_at + ttl` for documents written without one.
    pub fn effective_expiry(&self, ttl: Duration) -> Option<DateTime<Utc>> {
        self.expires_at
            .or_else(|| self.created_at.map(|created| created + ttl))
    }

    /// A code with no usable timestamp is treated as expired.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match self.effective_expiry(ttl) {
            Some(expires_at) => now > expires_at,
            None => true,
        }
    }

    /// Ordering key for picking the newest duplicate.
    pub fn recency_millis(&self) -> i64 {
        self.expires_at
            .or(self.created_at)
            .map(|t| t.timestamp_millis())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct NewResetCode {
    pub email: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Single-use grant to change the password, minted by a verified code.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordResetSession {
    pub token: String,
    pub email: String,
    pub code_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

impl PasswordResetSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

// Stored shapes. Field names match the documents the mobile app already reads.

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResetCodeDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub code: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,
    #[serde(rename = "expiresAt", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<BsonDateTime>,
    #[serde(default)]
    pub used: bool,
}

impl From<&NewResetCode> for ResetCodeDocument {
    fn from(code: &NewResetCode) -> Self {
        Self {
            id: None,
            email: code.email.clone(),
            code: code.code.clone(),
            created_at: Some(to_bson_datetime(code.created_at)),
            expires_at: Some(to_bson_datetime(code.expires_at)),
            used: false,
        }
    }
}

impl From<ResetCodeDocument> for PasswordResetCode {
    fn from(doc: ResetCodeDocument) -> Self {
        Self {
            id: doc.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: doc.email,
            code: doc.code,
            created_at: doc.created_at.map(from_bson_datetime),
            expires_at: doc.expires_at.map(from_bson_datetime),
            used: doc.used,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResetSessionDocument {
    #[serde(rename = "_id")]
    pub token: String,
    pub email: String,
    #[serde(rename = "codeId")]
    pub code_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: BsonDateTime,
    #[serde(rename = "expiresAt")]
    pub expires_at: BsonDateTime,
    #[serde(default)]
    pub used: bool,
}

impl From<&PasswordResetSession> for ResetSessionDocument {
    fn from(session: &PasswordResetSession) -> Self {
        Self {
            token: session.token.clone(),
            email: session.email.clone(),
            code_id: session.code_id.clone(),
            created_at: to_bson_datetime(session.created_at),
            expires_at: to_bson_datetime(session.expires_at),
            used: session.used,
        }
    }
}

impl From<ResetSessionDocument> for PasswordResetSession {
    fn from(doc: ResetSessionDocument) -> Self {
        Self {
            token: doc.token,
            email: doc.email,
            code_id: doc.code_id,
            created_at: from_bson_datetime(doc.created_at),
            expires_at: from_bson_datetime(doc.expires_at),
            used: doc.used,
        }
    }
}

pub fn to_bson_datetime(value: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(value.timestamp_millis())
}

pub fn from_bson_datetime(value: BsonDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_with(created: Option<DateTime<Utc>>, expires: Option<DateTime<Utc>>) -> PasswordResetCode {
        PasswordResetCode {
            id: "c1".to_string(),
            email: "ana@example.com".to_string(),
            code: "123456".to_string(),
            created_at: created,
            expires_at: expires,
            used: false,
        }
    }

    #[test]
    fn explicit_expiry_wins_over_created_at() {
        let now = Utc::now();
        let code = code_with(Some(now - Duration::hours(2)), Some(now + Duration::minutes(5)));
        assert!(!code.is_expired(now, Duration::minutes(15)));
    }

    #[test]
    fn missing_expiry_is_derived_from_created_at() {
        let now = Utc::now();
        let fresh = code_with(Some(now - Duration::minutes(10)), None);
        let stale = code_with(Some(now - Duration::minutes(16)), None);
        assert!(!fresh.is_expired(now, Duration::minutes(15)));
        assert!(stale.is_expired(now, Duration::minutes(15)));
    }

    #[test]
    fn code_without_timestamps_is_expired() {
        let code = code_with(None, None);
        assert!(code.is_expired(Utc::now(), Duration::minutes(15)));
        assert_eq!(code.recency_millis(), 0);
    }

    #[test]
    fn session_expires_strictly_after_deadline() {
        let now = Utc::now();
        let session = PasswordResetSession {
            token: "t".to_string(),
            email: "ana@example.com".to_string(),
            code_id: "c1".to_string(),
            created_at: now - Duration::minutes(30),
            expires_at: now,
            used: false,
        };
        assert!(!session.is_expired(now));
        assert!(session.is_expired(now + Duration::seconds(1)));
    }

    #[test]
    fn bson_conversion_keeps_millisecond_precision() {
        let now = Utc::now();
        let back = from_bson_datetime(to_bson_datetime(now));
        assert_eq!(back.timestamp_millis(), now.timestamp_millis());
    }
}
