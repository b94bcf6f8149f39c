pub mod leagues;
pub mod players;
pub mod points;
pub mod users;
