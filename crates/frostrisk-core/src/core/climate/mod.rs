pub mod projection;
