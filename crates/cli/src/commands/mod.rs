pub(crate) mod analyze;
pub(crate) mod import;
pub(crate) mod serve;
