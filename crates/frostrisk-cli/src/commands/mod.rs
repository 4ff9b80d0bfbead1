pub mod assess;
pub mod locate;
