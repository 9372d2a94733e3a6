pub mod control;
pub mod events;
pub mod schedule;
pub mod status;
