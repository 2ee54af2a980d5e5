mod streaming;
pub(crate) mod utils;
