pub mod industry;
pub mod persona;
pub mod profile;
pub mod signal;
