pub mod claims_dto;
pub mod draft_dto;
pub mod league_dto;
pub mod player_dto;
pub mod points_dto;
pub mod user_dto;
