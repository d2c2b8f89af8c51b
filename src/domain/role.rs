use std::fmt::Display;

/// The closed set of roles a visitor can pick on the contact form. The wire
/// representation is the human-readable label, e.g. "Project Manager".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Developer,
    Designer,
    ProjectManager,
    ProductManager,
    Student,
    Other,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Developer,
        Role::Designer,
        Role::ProjectManager,
        Role::ProductManager,
        Role::Student,
        Role::Other,
    ];

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "Developer" => Ok(Self::Developer),
            "Designer" => Ok(Self::Designer),
            "Project Manager" => Ok(Self::ProjectManager),
            "Product Manager" => Ok(Self::ProductManager),
            "Student" => Ok(Self::Student),
            "Other" => Ok(Self::Other),
            other => Err(format!("{other} is not a recognized role.")),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Developer => "Developer",
            Self::Designer => "Designer",
            Self::ProjectManager => "Project Manager",
            Self::ProductManager => "Product Manager",
            Self::Student => "Student",
            Self::Other => "Other",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
