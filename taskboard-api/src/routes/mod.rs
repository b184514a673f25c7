/// API route handlers
///
/// - `health`: Health check endpoint
/// - `documents`: Generic list/get/create/update/delete handlers shared by
///   users, projects, tasks and comments

pub mod documents;
pub mod health;
