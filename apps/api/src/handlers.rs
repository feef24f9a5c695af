pub mod health;
pub mod steps;
