use serde::{Deserialize, Serialize};

/// Organizational roles recognized by the licensing workflow.
///
/// The core never authenticates anyone; an external session provider hands a
/// [`StaffIdentity`] to each call and transition guards compare the role by
/// equality only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Applicant,
    SectionalManager,
    SafetyManager,
    Trainer,
    Nurse,
    Doctor,
}

impl StaffRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Applicant => "Applicant",
            Self::SectionalManager => "Sectional Manager",
            Self::SafetyManager => "Safety Manager",
            Self::Trainer => "Trainer",
            Self::Nurse => "Nurse",
            Self::Doctor => "Doctor",
        }
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Caller identity supplied by the session provider for guard checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffIdentity {
    pub staff_number: String,
    pub name: String,
    pub role: StaffRole,
}

impl StaffIdentity {
    pub fn new(staff_number: impl Into<String>, name: impl Into<String>, role: StaffRole) -> Self {
        Self {
            staff_number: staff_number.into(),
            name: name.into(),
            role,
        }
    }
}
