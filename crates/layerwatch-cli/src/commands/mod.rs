pub mod detect;
pub mod snapshot;
