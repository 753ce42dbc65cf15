use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, ErrorKind};

/// License identifiers accepted by the registry.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum License {
    /// Liberation License v1: free for people, not for unpaid corporate use.
    #[default]
    #[display("liberation_v1")]
    LiberationV1,
    #[display("cc_by")]
    CcBy,
    #[display("cc_by_sa")]
    CcBySa,
    #[display("cc_by_nc")]
    CcByNc,
    #[display("cc_by_nc_sa")]
    CcByNcSa,
    #[display("all_rights_reserved")]
    AllRightsReserved,
    #[display("public_domain")]
    PublicDomain,
}

impl License {
    pub const ALL: [Self; 7] = [
        Self::LiberationV1,
        Self::CcBy,
        Self::CcBySa,
        Self::CcByNc,
        Self::CcByNcSa,
        Self::AllRightsReserved,
        Self::PublicDomain,
    ];

    /// Identifier on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LiberationV1 => "liberation_v1",
            Self::CcBy => "cc_by",
            Self::CcBySa => "cc_by_sa",
            Self::CcByNc => "cc_by_nc",
            Self::CcByNcSa => "cc_by_nc_sa",
            Self::AllRightsReserved => "all_rights_reserved",
            Self::PublicDomain => "public_domain",
        }
    }

    pub fn is_liberation(&self) -> bool {
        matches!(self, Self::LiberationV1)
    }

    pub fn is_creative_commons(&self) -> bool {
        self.as_str().starts_with("cc_")
    }
}

impl FromStr for License {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        match Self::ALL.into_iter().find(|license| license.as_str().eq_ignore_ascii_case(wanted)) {
            Some(license) => Ok(license),
            None => exn::bail!(ErrorKind::UnknownLicense(wanted.to_string())),
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    #[display("individual")]
    Individual,
    #[display("corporation")]
    Corporation,
    #[display("nonprofit")]
    Nonprofit,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseType {
    #[display("personal")]
    Personal,
    #[display("commercial")]
    Commercial,
    #[display("ai_training")]
    AiTraining,
    #[display("education")]
    Education,
    #[display("research")]
    Research,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsePurpose {
    #[display("profit")]
    Profit,
    #[display("education")]
    Education,
    #[display("humanitarian")]
    Humanitarian,
    #[display("research")]
    Research,
}

/// A proposed use of a Liberation-licensed work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiberationUseCase {
    pub entity_type: EntityType,
    pub use_type: UseType,
    pub purpose: UsePurpose,
    /// Whether creators are compensated for the use.
    pub compensation: bool,
}

/// Verdict of [`LiberationUseCase::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiberationCheck {
    pub compliant: bool,
    pub reason: &'static str,
}

impl LiberationUseCase {
    /// Local compliance check against the Liberation License terms.
    pub fn evaluate(&self) -> LiberationCheck {
        let corporate_unpaid = self.entity_type == EntityType::Corporation && !self.compensation;
        if corporate_unpaid && self.purpose == UsePurpose::Profit {
            return LiberationCheck {
                compliant: false,
                reason: "Corporate profit extraction without creator compensation violates Liberation License",
            };
        }
        if corporate_unpaid && self.use_type == UseType::AiTraining {
            return LiberationCheck {
                compliant: false,
                reason: "Commercial AI training without compensation violates Liberation License",
            };
        }
        LiberationCheck {
            compliant: true,
            reason: "Use case compliant with Liberation License terms",
        }
    }
}
