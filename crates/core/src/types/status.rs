//! Lifecycle status enums.
//!
//! Both enums are persisted as lowercase text columns, so `Display` and
//! `FromStr` are the storage contract: whatever `Display` writes,
//! `FromStr` must accept.

use serde::{Deserialize, Serialize};

/// Error returned when a stored status string is not recognized.
#[derive(thiserror::Error, Debug, Clone)]
#[error("invalid {kind} status: {value}")]
pub struct StatusParseError {
    /// Which enum rejected the value.
    pub kind: &'static str,
    /// The offending string.
    pub value: String,
}

/// Outcome of a single email send attempt.
///
/// Recorded once per attempt in the email log; there is no retry state
/// because sends are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// The SMTP relay accepted the message.
    Sent,
    /// Building or handing off the message failed.
    Failed,
}

impl DeliveryStatus {
    /// Stable string form used in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            _ => Err(StatusParseError {
                kind: "delivery",
                value: s.to_owned(),
            }),
        }
    }
}

/// Workflow state of a profile audit request.
///
/// New requests start as `Pending`; admins move them through the rest of
/// the workflow by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    #[default]
    Pending,
    InReview,
    Completed,
    Dismissed,
}

impl AuditStatus {
    /// All states, in workflow order. Used to render admin status selects.
    pub const ALL: [Self; 4] = [Self::Pending, Self::InReview, Self::Completed, Self::Dismissed];

    /// Stable string form used in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InReview => "in_review",
            Self::Completed => "completed",
            Self::Dismissed => "dismissed",
        }
    }

    /// Human-readable label for templates.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InReview => "In review",
            Self::Completed => "Completed",
            Self::Dismissed => "Dismissed",
        }
    }
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuditStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_review" => Ok(Self::InReview),
            "completed" => Ok(Self::Completed),
            "dismissed" => Ok(Self::Dismissed),
            _ => Err(StatusParseError {
                kind: "audit",
                value: s.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_status_roundtrip() {
        for status in [DeliveryStatus::Sent, DeliveryStatus::Failed] {
            let parsed: DeliveryStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_delivery_status_rejects_unknown() {
        let err = "queued".parse::<DeliveryStatus>().unwrap_err();
        assert_eq!(err.kind, "delivery");
        assert_eq!(err.value, "queued");
    }

    #[test]
    fn test_audit_status_roundtrip() {
        for status in AuditStatus::ALL {
            let parsed: AuditStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_audit_status_default_is_pending() {
        assert_eq!(AuditStatus::default(), AuditStatus::Pending);
    }

    #[test]
    fn test_audit_status_rejects_unknown() {
        assert!("archived".parse::<AuditStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&AuditStatus::InReview).unwrap();
        assert_eq!(json, "\"in_review\"");
        let back: AuditStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AuditStatus::InReview);
    }
}
