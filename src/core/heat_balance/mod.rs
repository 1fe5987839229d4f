pub(crate) mod assembler;
pub(crate) mod attribution;
pub mod channels;
pub mod error_metrics;
pub mod rts;
pub mod surface;
pub(crate) mod validation;
