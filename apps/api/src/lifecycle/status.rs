//! Application status state machine.
//!
//! The allowed moves live in `TRANSITIONS` as plain data. Everything else
//! (`allowed_next`, `can_transition_to`, `is_terminal`) is derived from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Applied,
    Screening,
    Interview,
    Technical,
    #[serde(rename = "HR")]
    Hr,
    Offer,
    Hired,
    Rejected,
    Withdrawn,
}

/// Source state → allowed destinations.
pub const TRANSITIONS: &[(ApplicationStatus, &[ApplicationStatus])] = {
    use ApplicationStatus::*;
    &[
        (Applied, &[Screening, Rejected]),
        (Screening, &[Interview, Rejected]),
        (Interview, &[Technical, Rejected]),
        (Technical, &[Hr, Rejected]),
        (Hr, &[Offer, Rejected]),
        (Offer, &[Hired, Rejected]),
        (Hired, &[]),
        (Rejected, &[]),
        (Withdrawn, &[]),
    ]
};

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 9] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Screening,
        ApplicationStatus::Interview,
        ApplicationStatus::Technical,
        ApplicationStatus::Hr,
        ApplicationStatus::Offer,
        ApplicationStatus::Hired,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Screening => "Screening",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Technical => "Technical",
            ApplicationStatus::Hr => "HR",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Hired => "Hired",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Withdrawn => "Withdrawn",
        }
    }

    pub fn allowed_next(self) -> &'static [ApplicationStatus] {
        TRANSITIONS
            .iter()
            .find(|(from, _)| *from == self)
            .map(|(_, to)| *to)
            .unwrap_or(&[])
    }

    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    /// Terminal states have no outgoing edges in the transition table.
    pub fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.label() == s.trim())
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
