pub mod level;
pub mod save;
pub mod step;
