use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the logged-in user.
    pub sub: String,
    /// Row id of the user in the Users table.
    pub uid: i64,
    pub exp: usize,
}
