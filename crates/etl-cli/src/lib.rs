//! Library side of the `etl` runner: logging setup, flag parsing and the
//! grouped-metric view used by `etl summary`.

pub mod insights;
pub mod logging;
pub mod plan;
