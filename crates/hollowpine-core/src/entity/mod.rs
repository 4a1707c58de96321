pub mod input;
pub mod player;
pub mod pursuer;

pub use input::InputState;
pub use player::Player;
pub use pursuer::{Pursuer, PursuerState, PursuerUpdate};
