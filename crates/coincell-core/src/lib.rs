//! Cell-based coincidence clustering of candidate events in
//! (frequency, declination, right ascension, spin-down) space.

pub mod common;
pub mod domain;
pub mod modules;
