/// Business logic layer
///
/// - `posts`: post CRUD behind the ownership guard
/// - `accounts`: registration and login
pub mod accounts;
pub mod posts;

pub use accounts::AccountService;
pub use posts::PostService;
