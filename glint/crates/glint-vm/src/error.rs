use thiserror::Error;

use glint_value::OpError;

#[derive(Debug, Error)]
pub enum VmError {
    #[error("stack underflow")]
    StackUnderflow,
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error(transparent)]
    Op(#[from] OpError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
