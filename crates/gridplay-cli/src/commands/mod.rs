pub mod balance;
pub mod islands;
pub mod presets;
pub mod solve;
