pub mod clock;
pub mod formatter;
pub mod ticker;
