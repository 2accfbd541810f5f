//! Permission identifiers and system constants

// Users
pub const USERS_READ: &str = "users:read";
pub const USERS_WRITE: &str = "users:write";
pub const USERS_ROLES: &str = "users:roles";
pub const USERS_IMPORT: &str = "users:import";

// Students
pub const STUDENTS_READ: &str = "students:read";
pub const STUDENTS_WRITE: &str = "students:write";
pub const STUDENTS_IMPORT: &str = "students:import";

// Faculty
pub const FACULTY_READ: &str = "faculty:read";
pub const FACULTY_WRITE: &str = "faculty:write";

// Assignments
pub const ASSIGNMENTS_CREATE: &str = "assignments:create";
pub const ASSIGNMENTS_READ: &str = "assignments:read";
pub const ASSIGNMENTS_WRITE: &str = "assignments:write";
pub const ASSIGNMENTS_GRADE: &str = "assignments:grade";
pub const ASSIGNMENTS_DELETE: &str = "assignments:delete";

// Submissions
pub const SUBMISSIONS_READ: &str = "submissions:read";
pub const SUBMISSIONS_WRITE: &str = "submissions:write";
pub const SUBMISSIONS_GRADE: &str = "submissions:grade";

// Attendance
pub const ATTENDANCE_READ: &str = "attendance:read";
pub const ATTENDANCE_WRITE: &str = "attendance:write";
pub const ATTENDANCE_EXPORT: &str = "attendance:export";

// Notices
pub const NOTICES_READ: &str = "notices:read";
pub const NOTICES_CREATE: &str = "notices:create";
pub const NOTICES_WRITE: &str = "notices:write";
pub const NOTICES_DELETE: &str = "notices:delete";

// Complaints
pub const COMPLAINTS_READ: &str = "complaints:read";
pub const COMPLAINTS_CREATE: &str = "complaints:create";
pub const COMPLAINTS_RESOLVE: &str = "complaints:resolve";
pub const COMPLAINTS_ASSIGN: &str = "complaints:assign";

// Fees
pub const FEES_READ: &str = "fees:read";
pub const FEES_WRITE: &str = "fees:write";
pub const FEES_PAY: &str = "fees:pay";

// Subjects
pub const SUBJECTS_READ: &str = "subjects:read";
pub const SUBJECTS_WRITE: &str = "subjects:write";
pub const SUBJECTS_DELETE: &str = "subjects:delete";

// Analytics
pub const ANALYTICS_READ: &str = "analytics:read";
pub const ANALYTICS_EXPORT: &str = "analytics:export";

// Settings
pub const SETTINGS_READ: &str = "settings:read";
pub const SETTINGS_WRITE: &str = "settings:write";

// Institution
pub const INSTITUTION_READ: &str = "institution:read";
pub const INSTITUTION_WRITE: &str = "institution:write";

// Audit
pub const AUDIT_READ: &str = "audit:read";

/// Upper bound on hierarchy traversal; the role set is closed so any walk
/// longer than this has revisited a role.
pub const MAX_HIERARCHY_DEPTH: usize = 16;

// Environment variables read by the server
pub const ENV_DB_PATH: &str = "COLLEGE_RBAC_DB";
pub const ENV_POLICY_PATH: &str = "COLLEGE_RBAC_POLICY";
pub const ENV_PORT: &str = "PORT";

/// Header carrying the authenticated principal id
pub const PRINCIPAL_HEADER: &str = "x-user-id";
