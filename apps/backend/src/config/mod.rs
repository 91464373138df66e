pub mod game;

pub use game::GameSettings;
