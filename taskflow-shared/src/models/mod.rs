/// Domain models for TaskFlow
///
/// Entities reference each other by UUID foreign keys only; there are no
/// in-memory object graphs. Each model carries the SQL for its own table as
/// associated functions over a `PgConnection`, which the PostgreSQL store
/// calls inside a transaction.
///
/// # Models
///
/// - `user`: identities and global roles
/// - `board`: boards (projects)
/// - `membership`: board members and their roles
/// - `column`: column types and board columns
/// - `card`: cards and priorities
/// - `comment`: card comments
/// - `activity`: append-only activity log

pub mod activity;
pub mod board;
pub mod card;
pub mod column;
pub mod comment;
pub mod membership;
pub mod user;
