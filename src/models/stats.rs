use serde::{Deserialize, Serialize};

/// Account counts by role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCounts {
    pub student: i64,
    pub teacher: i64,
    pub admin: i64,
    pub total: i64,
}

/// Admin dashboard totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStats {
    pub users: RoleCounts,
    pub materials: i64,
    pub assignments: i64,
    pub feedback: i64,
}
