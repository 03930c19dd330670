//! Score record model and submission validation
//!
//! A [`ScoreRecord`] is the only entity the service persists. Records are
//! built exclusively through [`ScoreRecord::from_submission`], which performs
//! the single validation the service does: `points` has to be a JSON number.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use uuid::Uuid;

/// Label stored when a submission carries no usable `user_id`
pub const ANONYMOUS_USER: &str = "anonymous";

/// A persisted score entry
///
/// Records are immutable once created. `points` keeps the exact JSON number
/// that was submitted, so integers stay integers and floats stay floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Server-generated UUID (v4)
    pub id: String,

    /// Submitter label, `"anonymous"` if none was given
    pub user_id: String,

    /// Submitted score value
    pub points: Number,

    /// Submission time (always UTC, millisecond precision)
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Raw submission body as it arrives over HTTP
///
/// Both fields stay untyped so that a wrong type for `points` turns into a
/// validation error instead of a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreSubmission {
    #[serde(default)]
    pub user_id: Option<Value>,

    #[serde(default)]
    pub points: Option<Value>,
}

/// Submission validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    /// `points` is missing or not a number
    InvalidPoints,

    /// The body is not a JSON object
    MalformedBody(String),
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreError::InvalidPoints => write!(f, "points must be a number"),
            ScoreError::MalformedBody(msg) => write!(f, "malformed request body: {}", msg),
        }
    }
}

impl std::error::Error for ScoreError {}

impl ScoreSubmission {
    /// Parse a request body
    ///
    /// An empty body counts as `{}`.
    pub fn from_body(body: &[u8]) -> Result<Self, ScoreError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let value: Value =
            serde_json::from_slice(body).map_err(|e| ScoreError::MalformedBody(e.to_string()))?;
        if !value.is_object() {
            return Err(ScoreError::MalformedBody(
                "expected a JSON object".to_string(),
            ));
        }

        serde_json::from_value(value).map_err(|e| ScoreError::MalformedBody(e.to_string()))
    }
}

impl ScoreRecord {
    /// Build a record from a submission, stamping it with a new id and the current time
    pub fn from_submission(submission: ScoreSubmission) -> Result<Self, ScoreError> {
        Self::from_parts(submission, Utc::now())
    }

    /// Same as [`ScoreRecord::from_submission`] with an explicit timestamp
    pub fn from_parts(
        submission: ScoreSubmission,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ScoreError> {
        let points = match submission.points {
            Some(Value::Number(points)) => points,
            _ => return Err(ScoreError::InvalidPoints),
        };

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_label(submission.user_id),
            points,
            created_at: truncate_to_millis(created_at),
        })
    }

    /// `created_at` in its persisted textual form
    pub fn created_at_string(&self) -> String {
        timestamp::render(&self.created_at)
    }
}

fn user_label(user_id: Option<Value>) -> String {
    match user_id {
        None | Some(Value::Null) | Some(Value::Bool(false)) => ANONYMOUS_USER.to_string(),
        Some(Value::String(s)) if s.is_empty() => ANONYMOUS_USER.to_string(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => ANONYMOUS_USER.to_string(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

/// Drop sub-millisecond precision so the in-memory value equals what is persisted
fn truncate_to_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or(dt)
}

/// Convert a stored double back into a JSON number
///
/// Whole values inside the `i64` range come back as integers.
pub fn number_from_f64(value: f64) -> Option<Number> {
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        return Some(Number::from(value as i64));
    }
    Number::from_f64(value)
}

/// Serde helpers for the `created_at` wire format (`2024-05-01T12:00:00.123Z`)
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn render(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
    }

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&render(dt))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for ScoreRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}: {} at {})",
            self.id,
            self.user_id,
            self.points,
            self.created_at_string()
        )
    }
}
