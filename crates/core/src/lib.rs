pub mod command;
pub mod convert;
pub mod dispatch;
pub mod factory;
pub mod summary;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;

pub use command::Command;
pub use dispatch::Dispatcher;
pub use summary::SummaryBuilder;
pub use workspace::Credentials;
