use uuid::Uuid;

use crate::{
    authz::Predicate,
    db::error::{DbError, DbResult},
};

/// Parse a UUID string from the database, returning a DbError on failure
pub fn parse_uuid(s: &str) -> DbResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DbError::Internal(format!("Invalid UUID in database: {}", e)))
}

pub fn parse_optional_uuid(s: Option<String>) -> DbResult<Option<Uuid>> {
    s.as_deref().map(parse_uuid).transpose()
}

/// Parse a stored enum value via its `FromStr` impl.
pub fn parse_enum<T>(s: &str) -> DbResult<T>
where
    T: std::str::FromStr<Err = String>,
{
    s.parse().map_err(|e: String| DbError::Internal(format!("Invalid value in database: {}", e)))
}

/// Columns a predicate's conditions map onto for one table.
///
/// `None` means the table has no such column; a predicate that needs it is
/// rejected rather than silently ignored.
pub struct ScopeColumns {
    pub owner: &'static str,
    pub grader: Option<&'static str>,
    pub status: Option<&'static str>,
}

/// SQL fragment (` AND ...` conditions) plus the values to bind, in order.
#[derive(Debug, Default)]
pub struct ScopeClause {
    pub sql: String,
    pub binds: Vec<String>,
}

impl ScopeClause {
    /// Translate `scope` into conditions on `columns`, optionally qualified by
    /// a table alias.
    pub fn build(scope: &Predicate, columns: &ScopeColumns, alias: Option<&str>) -> DbResult<Self> {
        let col = |name: &str| match alias {
            Some(alias) => format!("{}.{}", alias, name),
            None => name.to_string(),
        };
        let missing = |what: &str| {
            DbError::Internal(format!(
                "Predicate requires a {} column the table does not have",
                what
            ))
        };

        let mut clause = ScopeClause::default();

        if let Some(owner) = scope.owner {
            clause.sql.push_str(&format!(" AND {} = ?", col(columns.owner)));
            clause.binds.push(owner.to_string());
        }
        if let Some(actor) = scope.claimable_by {
            let grader = col(columns.grader.ok_or_else(|| missing("grader"))?);
            clause
                .sql
                .push_str(&format!(" AND ({} IS NULL OR {} = ?)", grader, grader));
            clause.binds.push(actor.to_string());
        }
        if let Some(actor) = scope.graded_by {
            let grader = col(columns.grader.ok_or_else(|| missing("grader"))?);
            clause.sql.push_str(&format!(" AND {} = ?", grader));
            clause.binds.push(actor.to_string());
        }
        if let Some(state) = scope.state {
            let status = col(columns.status.ok_or_else(|| missing("status"))?);
            clause.sql.push_str(&format!(" AND {} = ?", status));
            clause.binds.push(state.as_str().to_string());
        }

        Ok(clause)
    }
}

/// Map a write error, turning unique violations into `Conflict`.
pub fn map_unique_violation(e: sqlx::Error, conflict: impl FnOnce(&str) -> String) -> DbError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            DbError::Conflict(conflict(db_err.message()))
        }
        _ => DbError::from(e),
    }
}
