/// API route handlers
///
/// Handlers are thin: they extract the caller's `AuthContext`, validate the
/// request body, call one `Services` operation and shape the response.
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and the current identity
/// - `users`: Identity directory and profile management
/// - `boards`: Boards (exposed as projects)
/// - `members`: Board membership
/// - `columns`: Board columns
/// - `column_types`: Shared column type catalogue
/// - `cards`: Cards, moves, completion and self-assignment
/// - `comments`: Card comments
/// - `activity`: Board and card activity logs

pub mod activity;
pub mod auth;
pub mod boards;
pub mod cards;
pub mod column_types;
pub mod columns;
pub mod comments;
pub mod health;
pub mod members;
pub mod users;
