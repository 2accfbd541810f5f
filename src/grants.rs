//! Default grant table
//!
//! Maps each role to the permissions it holds inherently, independent of any
//! stored configuration. The top role's set is derived from the catalog.

use std::collections::{BTreeSet, HashMap};

use crate::catalog;
use crate::constants::*;
use crate::error::{RbacError, Result};
use crate::role::Role;

pub type PermissionSet = BTreeSet<String>;

const STUDENT_DEFAULTS: &[&str] = &[
    USERS_READ,
    STUDENTS_READ,
    ASSIGNMENTS_READ,
    SUBMISSIONS_READ,
    SUBMISSIONS_WRITE,
    ATTENDANCE_READ,
    NOTICES_READ,
    COMPLAINTS_READ,
    COMPLAINTS_CREATE,
    FEES_READ,
    FEES_PAY,
    SUBJECTS_READ,
    ANALYTICS_READ,
    INSTITUTION_READ,
];

const FACULTY_DEFAULTS: &[&str] = &[
    USERS_READ,
    STUDENTS_READ,
    FACULTY_READ,
    ASSIGNMENTS_CREATE,
    ASSIGNMENTS_READ,
    ASSIGNMENTS_WRITE,
    ASSIGNMENTS_GRADE,
    SUBMISSIONS_READ,
    SUBMISSIONS_GRADE,
    ATTENDANCE_READ,
    ATTENDANCE_WRITE,
    NOTICES_READ,
    NOTICES_CREATE,
    NOTICES_WRITE,
    COMPLAINTS_READ,
    SUBJECTS_READ,
    SUBJECTS_WRITE,
    ANALYTICS_READ,
    ANALYTICS_EXPORT,
    INSTITUTION_READ,
];

const ADMIN_DEFAULTS: &[&str] = &[
    USERS_READ,
    USERS_WRITE,
    USERS_IMPORT,
    STUDENTS_READ,
    STUDENTS_WRITE,
    STUDENTS_IMPORT,
    FACULTY_READ,
    FACULTY_WRITE,
    ASSIGNMENTS_CREATE,
    ASSIGNMENTS_READ,
    ASSIGNMENTS_WRITE,
    ASSIGNMENTS_GRADE,
    ASSIGNMENTS_DELETE,
    SUBMISSIONS_READ,
    SUBMISSIONS_GRADE,
    ATTENDANCE_READ,
    ATTENDANCE_WRITE,
    ATTENDANCE_EXPORT,
    NOTICES_READ,
    NOTICES_CREATE,
    NOTICES_WRITE,
    NOTICES_DELETE,
    COMPLAINTS_READ,
    COMPLAINTS_RESOLVE,
    COMPLAINTS_ASSIGN,
    FEES_READ,
    FEES_WRITE,
    SUBJECTS_READ,
    SUBJECTS_WRITE,
    SUBJECTS_DELETE,
    ANALYTICS_READ,
    ANALYTICS_EXPORT,
    SETTINGS_READ,
    INSTITUTION_READ,
    INSTITUTION_WRITE,
];

fn to_set(ids: &[&str]) -> PermissionSet {
    ids.iter().map(|s| s.to_string()).collect()
}

fn full_catalog() -> PermissionSet {
    catalog::identifiers().map(str::to_string).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultGrants {
    table: HashMap<Role, PermissionSet>,
}

impl DefaultGrants {
    pub fn builtin() -> Self {
        let table = HashMap::from([
            (Role::Student, to_set(STUDENT_DEFAULTS)),
            (Role::Faculty, to_set(FACULTY_DEFAULTS)),
            (Role::Admin, to_set(ADMIN_DEFAULTS)),
            (Role::TOP, full_catalog()),
        ]);
        DefaultGrants { table }
    }

    /// Build a table from explicit sets for the non-top roles.
    ///
    /// Any entry for the top role is ignored; it always receives the whole
    /// catalog. Fails if a role is missing or an identifier is not in the
    /// catalog.
    pub fn new(mut table: HashMap<Role, PermissionSet>) -> Result<Self> {
        table.insert(Role::TOP, full_catalog());
        let g = DefaultGrants { table };
        g.validate()?;
        Ok(g)
    }

    /// Permissions `role` holds by default.
    pub fn default_permissions_for(&self, role: Role) -> Result<&PermissionSet> {
        self.table
            .get(&role)
            .ok_or_else(|| RbacError::Configuration(format!("no default grants for role {}", role)))
    }

    /// Every role has an entry and every entry is a subset of the catalog.
    pub fn validate(&self) -> Result<()> {
        for role in Role::ALL {
            for id in self.default_permissions_for(role)? {
                if !catalog::contains(id) {
                    return Err(RbacError::Configuration(format!(
                        "default grant {} for role {} is not in the catalog",
                        id, role
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for DefaultGrants {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_valid() {
        DefaultGrants::builtin().validate().unwrap();
    }

    #[test]
    fn top_role_equals_catalog() {
        let g = DefaultGrants::builtin();
        assert_eq!(g.default_permissions_for(Role::TOP).unwrap(), &full_catalog());
    }

    #[test]
    fn student_and_faculty_defaults() {
        let g = DefaultGrants::builtin();
        let student = g.default_permissions_for(Role::Student).unwrap();
        assert!(student.contains(ASSIGNMENTS_READ));
        assert!(!student.contains(ASSIGNMENTS_GRADE));
        let faculty = g.default_permissions_for(Role::Faculty).unwrap();
        assert!(faculty.contains(ASSIGNMENTS_GRADE));
        // fees:pay is a student-only default
        assert!(!faculty.contains(FEES_PAY));
    }

    #[test]
    fn unknown_identifier_fails_validation() {
        let err = DefaultGrants::new(HashMap::from([
            (Role::Student, to_set(&["library:borrow"])),
            (Role::Faculty, PermissionSet::new()),
            (Role::Admin, PermissionSet::new()),
        ]))
        .unwrap_err();
        assert!(matches!(err, RbacError::Configuration(ref m) if m.contains("library:borrow")));
    }

    #[test]
    fn missing_role_fails_validation() {
        let err = DefaultGrants::new(HashMap::from([(Role::Student, PermissionSet::new())])).unwrap_err();
        assert!(matches!(err, RbacError::Configuration(_)));
    }

    #[test]
    fn top_role_cannot_be_narrowed() {
        let g = DefaultGrants::new(HashMap::from([
            (Role::Student, PermissionSet::new()),
            (Role::Faculty, PermissionSet::new()),
            (Role::Admin, PermissionSet::new()),
            (Role::SuperAdmin, to_set(&[USERS_READ])),
        ]))
        .unwrap();
        assert_eq!(g.default_permissions_for(Role::SuperAdmin).unwrap(), &full_catalog());
    }
}
