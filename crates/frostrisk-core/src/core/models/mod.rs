pub mod assessment;
pub mod dam;
pub mod weather;
