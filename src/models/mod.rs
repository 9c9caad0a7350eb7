mod movie;
mod page;
mod user;

pub use movie::{Movie, MovieId};
pub use page::{PageRequest, SuggestionPage};
pub use user::{Rating, User, UserId};
