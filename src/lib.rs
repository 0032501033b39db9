pub mod bio;
pub mod error;
pub mod pool;
pub mod proc;
pub mod sim;
pub mod trace;

pub use error::{KernelError, KernelResult};

#[cfg(test)]
mod test;
