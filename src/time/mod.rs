//! Time handling: the injectable clock used by the scheduler.

pub mod source;
