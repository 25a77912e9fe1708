//! Caller identity
//!
//! An [`Identity`] is built once per request from validated token claims and is
//! never mutated afterwards. Role and department names are parsed into enums
//! here so that no other module compares raw strings.
//!
//! Parsing is exact and case-sensitive: `"admin"` is not the Admin role.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::jwt::Claims;

/// Name of the role that administers the system
pub const ADMIN_ROLE: &str = "Admin";

/// Name of the role assigned to task assignees
pub const STAFF_ROLE: &str = "Staff";

/// Name of the QA role
pub const QA_ROLE: &str = "QA";

/// Name of the department whose members review work
pub const QA_DEPARTMENT: &str = "QA";

/// Role held by a user
///
/// Admins may create arbitrary additional roles; those carry no privileges and
/// are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Staff,
    Qa,
    Other(String),
}

impl Role {
    pub fn parse(name: &str) -> Self {
        match name {
            ADMIN_ROLE => Role::Admin,
            STAFF_ROLE => Role::Staff,
            QA_ROLE => Role::Qa,
            other => Role::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => ADMIN_ROLE,
            Role::Staff => STAFF_ROLE,
            Role::Qa => QA_ROLE,
            Role::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        Role::parse(&name)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Department a user belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Department {
    Qa,
    Other(String),
}

impl Department {
    pub fn parse(name: &str) -> Self {
        match name {
            QA_DEPARTMENT => Department::Qa,
            other => Department::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Department::Qa => QA_DEPARTMENT,
            Department::Other(name) => name,
        }
    }
}

impl From<String> for Department {
    fn from(name: String) -> Self {
        Department::parse(&name)
    }
}

impl From<Department> for String {
    fn from(department: Department) -> Self {
        department.as_str().to_string()
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller of the current request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Authenticated user ID
    pub user_id: i64,

    /// Role at login time
    pub role: Role,

    /// Department at login time (users may have none)
    pub department: Option<Department>,
}

impl Identity {
    pub fn new(user_id: i64, role: Role, department: Option<Department>) -> Self {
        Self {
            user_id,
            role,
            department,
        }
    }

    /// Builds the identity carried by a validated token
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: Role::parse(&claims.role),
            department: claims.department.as_deref().map(Department::parse),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }

    /// QA membership is decided by department, independent of role
    pub fn in_qa_department(&self) -> bool {
        self.department == Some(Department::Qa)
    }
}
