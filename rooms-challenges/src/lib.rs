pub mod breakout_rooms;
pub use breakout_rooms as c001;
