use serde::{Deserialize, Serialize};

use super::MovieId;

pub type UserId = i64;

/// An account known to the user directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub login: String,
}

/// One entry of a user's watch history, scored 1 to 5
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub score: f64,
}
