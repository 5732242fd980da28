//! Lifecycle status codes shared by the ledger records and the view builder.

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub enum CourseStatus {
    Open,
    Closed,
}

impl Default for CourseStatus {
    fn default() -> Self {
        CourseStatus::Open
    }
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CourseStatus::Open => write!(f, "Open"),
            CourseStatus::Closed => write!(f, "Closed"),
        }
    }
}

/// Class status only ever moves forward: `Open -> InProgress -> Completed`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize, ToSchema)]
pub enum ClassStatus {
    Open,
    InProgress,
    Completed,
}

impl Default for ClassStatus {
    fn default() -> Self {
        ClassStatus::Open
    }
}

impl ClassStatus {
    pub fn next(self) -> Option<ClassStatus> {
        match self {
            ClassStatus::Open => Some(ClassStatus::InProgress),
            ClassStatus::InProgress => Some(ClassStatus::Completed),
            ClassStatus::Completed => None,
        }
    }
}

impl std::fmt::Display for ClassStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassStatus::Open => write!(f, "Open"),
            ClassStatus::InProgress => write!(f, "InProgress"),
            ClassStatus::Completed => write!(f, "Completed"),
        }
    }
}

macro_rules! numeric_status {
    ($name:ident { $($variant:ident = $code:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
        #[serde(try_from = "u8", into = "u8")]
        pub enum $name {
            $($variant),+
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                match value {
                    $($name::$variant => $code),+
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = String;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($code => Ok($name::$variant),)+
                    other => Err(format!(concat!("unknown ", stringify!($name), " code {}"), other)),
                }
            }
        }
    };
}

numeric_status!(RegistrationStatus {
    Unregistered = 0,
    Registered = 1,
    Certificated = 2,
});

numeric_status!(CertificateStatus {
    NoScore = 0,
    NoCert = 1,
    Certificated = 2,
});

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub enum Progress {
    Learning,
    Completed,
}
