//! Permission catalog
//!
//! The closed set of permission identifiers the system can check. Declaration
//! order is preserved by every listing function.

use serde::Serialize;

use crate::constants::*;
use crate::error::{RbacError, Result};

/// A single named capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Permission {
    /// `<category>:<action>`
    pub identifier: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
}

const fn perm(
    identifier: &'static str,
    display_name: &'static str,
    description: &'static str,
    category: &'static str,
) -> Permission {
    Permission { identifier, display_name, description, category }
}

static PERMISSIONS: &[Permission] = &[
    perm(USERS_READ, "View Users", "View user profiles and information", "users"),
    perm(USERS_WRITE, "Manage Users", "Create, update, and delete users", "users"),
    perm(USERS_ROLES, "Assign Roles", "Change user roles and permissions", "users"),
    perm(USERS_IMPORT, "Import Users", "Bulk import user data", "users"),
    perm(STUDENTS_READ, "View Students", "View student profiles and records", "students"),
    perm(STUDENTS_WRITE, "Manage Students", "Create and update student records", "students"),
    perm(STUDENTS_IMPORT, "Import Students", "Bulk import student data", "students"),
    perm(FACULTY_READ, "View Faculty", "View faculty profiles", "faculty"),
    perm(FACULTY_WRITE, "Manage Faculty", "Create and update faculty records", "faculty"),
    perm(ASSIGNMENTS_CREATE, "Create Assignments", "Create new assignments", "assignments"),
    perm(ASSIGNMENTS_READ, "View Assignments", "View assignments", "assignments"),
    perm(ASSIGNMENTS_WRITE, "Edit Assignments", "Update and delete assignments", "assignments"),
    perm(ASSIGNMENTS_GRADE, "Grade Assignments", "Grade student submissions", "assignments"),
    perm(ASSIGNMENTS_DELETE, "Delete Assignments", "Delete assignments", "assignments"),
    perm(SUBMISSIONS_READ, "View Submissions", "View student submissions", "submissions"),
    perm(SUBMISSIONS_WRITE, "Submit Work", "Submit assignments", "submissions"),
    perm(SUBMISSIONS_GRADE, "Grade Submissions", "Grade student submissions", "submissions"),
    perm(ATTENDANCE_READ, "View Attendance", "View attendance records", "attendance"),
    perm(ATTENDANCE_WRITE, "Mark Attendance", "Mark and update attendance", "attendance"),
    perm(ATTENDANCE_EXPORT, "Export Attendance", "Export attendance data", "attendance"),
    perm(NOTICES_READ, "View Notices", "View published notices", "notices"),
    perm(NOTICES_CREATE, "Create Notices", "Create and publish notices", "notices"),
    perm(NOTICES_WRITE, "Manage Notices", "Update and delete notices", "notices"),
    perm(NOTICES_DELETE, "Delete Notices", "Delete notices", "notices"),
    perm(COMPLAINTS_READ, "View Complaints", "View complaints", "complaints"),
    perm(COMPLAINTS_CREATE, "Submit Complaints", "Submit new complaints", "complaints"),
    perm(COMPLAINTS_RESOLVE, "Resolve Complaints", "Resolve and close complaints", "complaints"),
    perm(COMPLAINTS_ASSIGN, "Assign Complaints", "Assign complaints to staff", "complaints"),
    perm(FEES_READ, "View Fees", "View fee structures and payments", "fees"),
    perm(FEES_WRITE, "Manage Fees", "Create and update fee structures", "fees"),
    perm(FEES_PAY, "Pay Fees", "Process fee payments", "fees"),
    perm(SUBJECTS_READ, "View Subjects", "View subject catalog", "subjects"),
    perm(SUBJECTS_WRITE, "Manage Subjects", "Create and update subjects", "subjects"),
    perm(SUBJECTS_DELETE, "Delete Subjects", "Delete subjects", "subjects"),
    perm(ANALYTICS_READ, "View Analytics", "View analytics and reports", "analytics"),
    perm(ANALYTICS_EXPORT, "Export Reports", "Export analytics and reports", "analytics"),
    perm(SETTINGS_READ, "View Settings", "View system settings", "settings"),
    perm(SETTINGS_WRITE, "Manage Settings", "Modify system settings", "settings"),
    perm(INSTITUTION_READ, "View Institution", "View institution details", "institution"),
    perm(INSTITUTION_WRITE, "Manage Institution", "Update institution settings", "institution"),
    perm(AUDIT_READ, "View Audit Logs", "View audit logs", "audit"),
];

/// Every permission, in declaration order.
pub fn list_permissions() -> &'static [Permission] {
    PERMISSIONS
}

/// Look up a permission by identifier.
pub fn get_permission(identifier: &str) -> Result<&'static Permission> {
    PERMISSIONS
        .iter()
        .find(|p| p.identifier == identifier)
        .ok_or_else(|| RbacError::NotFound(identifier.to_string()))
}

pub fn contains(identifier: &str) -> bool {
    PERMISSIONS.iter().any(|p| p.identifier == identifier)
}

/// All identifiers, in declaration order.
pub fn identifiers() -> impl Iterator<Item = &'static str> {
    PERMISSIONS.iter().map(|p| p.identifier)
}

/// Distinct categories in the order they first appear.
pub fn categories() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for p in PERMISSIONS {
        if !out.contains(&p.category) {
            out.push(p.category);
        }
    }
    out
}

pub fn permissions_in(category: &str) -> Vec<&'static Permission> {
    PERMISSIONS.iter().filter(|p| p.category == category).collect()
}
