//! Small helpers shared by the view layer

pub mod format;
