use std::fmt;
use std::io;

use devchan_buffer::TransferError;
use devchan_module::ModuleError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const INIT_FAILED: i32 = 3;
pub const OUT_OF_SPACE: i32 = 28;
pub const PERMISSION_DENIED: i32 = 50;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn module_error(context: &str, err: ModuleError) -> CliError {
    CliError::new(INIT_FAILED, format!("{context}: {err}"))
}

pub fn transfer_code(err: &TransferError) -> i32 {
    match err {
        TransferError::OutOfSpace { .. } => OUT_OF_SPACE,
    }
}
