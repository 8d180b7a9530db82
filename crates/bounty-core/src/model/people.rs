//! Workers, directory entries and the inputs that create them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which side of the marketplace the current user is acting as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Owner,
    Worker,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Worker => "worker",
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Owner => Self::Worker,
            Self::Worker => Self::Owner,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "worker" => Ok(Self::Worker),
            other => Err(Error::Validation(format!("unknown role: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: String,
    pub name: String,
    pub initials: String,
    pub email: String,
    pub reputation: i64,
    #[serde(skip)]
    pub order_index: i64,
}

/// Normalised identity used by the trusted-worker directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonBasicInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub initials: String,
}

/// A worker pre-approved across every property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalTrustedWorker {
    pub id: String,
    pub name: String,
    pub email: String,
    pub initials: String,
    pub order_index: i64,
}

/// Someone who has signed in through the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInUser {
    pub email: String,
    pub name: String,
    pub updated_at: i64,
}

/// One entry of a trusted-worker add request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTrustedWorkerInput {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub initials: String,
}

/// A reusable title/description/price bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub id: String,
    pub label: String,
    pub title: String,
    pub description: String,
    pub price: i64,
    #[serde(skip)]
    pub order_index: i64,
}

/// Body of `POST /api/task-templates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskTemplateInput {
    pub label: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
}
