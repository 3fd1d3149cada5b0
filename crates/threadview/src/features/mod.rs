//! Feature slices of the thread view (state per slice, wired by the reducer).

pub mod derived;
pub mod hints;
pub mod loading;
pub mod scroll;
pub mod seen;
