pub mod issue;
pub mod user;

pub use issue::*;
pub use user::*;
