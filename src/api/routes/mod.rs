pub mod health;
pub mod stages;
