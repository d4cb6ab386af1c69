#[cfg(feature = "blocking")]
pub(crate) mod blocking;

pub(crate) mod core;

#[cfg(feature = "async")]
pub(crate) mod tokio;
