#![warn(clippy::pedantic)]
// Don't care enough to fix
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::wildcard_imports)]

pub mod lookup;
pub mod transport;
