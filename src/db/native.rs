//! Native driver seam.
//!
//! The pool never talks to a driver library directly. A [`DriverManager`] loads a driver
//! (by path or manifest name) and hands back a [`NativeConnection`]. Clones of one native
//! connection share the same database handle through the driver's reference counting,
//! which is what lets a single source connection feed a whole pool.

use crate::models::{DriverIdentifier, ParamMap};
use arrow_array::RecordBatch;
use std::fmt;
use thiserror::Error;

/// Text marker some driver managers put in messages instead of a NOT_FOUND status.
pub const NOT_FOUND_MARKER: &str = "NOT_FOUND";

/// ADBC status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AdbcStatus {
    Ok = 0,
    Unknown = 1,
    NotImplemented = 2,
    NotFound = 3,
    AlreadyExists = 4,
    InvalidArgument = 5,
    InvalidState = 6,
    InvalidData = 7,
    Integrity = 8,
    Internal = 9,
    Io = 10,
    Cancelled = 11,
    Timeout = 12,
    Unauthenticated = 13,
    Unauthorized = 14,
}

impl AdbcStatus {
    /// Map a raw status code to a status, if it is one ADBC defines.
    pub fn from_code(code: u8) -> Option<Self> {
        let status = match code {
            0 => Self::Ok,
            1 => Self::Unknown,
            2 => Self::NotImplemented,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidArgument,
            6 => Self::InvalidState,
            7 => Self::InvalidData,
            8 => Self::Integrity,
            9 => Self::Internal,
            10 => Self::Io,
            11 => Self::Cancelled,
            12 => Self::Timeout,
            13 => Self::Unauthenticated,
            14 => Self::Unauthorized,
            _ => return None,
        };
        Some(status)
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Unknown => "UNKNOWN",
            Self::NotImplemented => "NOT_IMPLEMENTED",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::InvalidState => "INVALID_STATE",
            Self::InvalidData => "INVALID_DATA",
            Self::Integrity => "INTEGRITY",
            Self::Internal => "INTERNAL",
            Self::Io => "IO",
            Self::Cancelled => "CANCELLED",
            Self::Timeout => "TIMEOUT",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Unauthorized => "UNAUTHORIZED",
        }
    }
}

impl fmt::Display for AdbcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error raised by the native driver layer, kept exactly as the driver reported it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct NativeError {
    pub message: String,
    /// Absent when the driver manager did not attach a structured status.
    pub status: Option<AdbcStatus>,
    pub vendor_code: Option<i32>,
    /// e.g. "08001" for a refused connection
    pub sqlstate: Option<String>,
}

impl NativeError {
    pub fn new(status: AdbcStatus, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
            vendor_code: None,
            sqlstate: None,
        }
    }

    /// An error without a structured status code.
    pub fn unstructured(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            vendor_code: None,
            sqlstate: None,
        }
    }

    pub fn with_vendor_code(mut self, vendor_code: i32) -> Self {
        self.vendor_code = Some(vendor_code);
        self
    }

    pub fn with_sqlstate(mut self, sqlstate: impl Into<String>) -> Self {
        self.sqlstate = Some(sqlstate.into());
        self
    }

    /// Check whether the driver (or its manifest) could not be found.
    ///
    /// The status code decides whenever the driver manager supplied a meaningful one.
    /// The message marker is only consulted when the status is missing or `Unknown`.
    pub fn is_not_found(&self) -> bool {
        match self.status {
            Some(AdbcStatus::NotFound) => true,
            None | Some(AdbcStatus::Unknown) => self.message.contains(NOT_FOUND_MARKER),
            Some(_) => false,
        }
    }
}

/// Loads native drivers and opens connections against them.
pub trait DriverManager: Send + Sync {
    /// Open a connection with `driver`, passing `params` verbatim.
    ///
    /// `entrypoint` names the driver's init symbol when it is not the ADBC default.
    fn connect(
        &self,
        driver: &DriverIdentifier,
        params: &ParamMap,
        entrypoint: Option<&str>,
    ) -> Result<Box<dyn NativeConnection>, NativeError>;
}

/// One open native connection.
pub trait NativeConnection: Send {
    /// Open another connection sharing this one's database handle.
    fn clone_connection(&self) -> Result<Box<dyn NativeConnection>, NativeError>;

    /// Execute `sql` and return its result stream.
    fn execute(&mut self, sql: &str) -> Result<Box<dyn NativeStream>, NativeError>;

    /// Release this connection. The shared database handle stays alive while clones exist.
    fn close(&mut self) -> Result<(), NativeError>;
}

/// Arrow result stream of one executed statement.
pub trait NativeStream: Send {
    fn next_batch(&mut self) -> Result<Option<RecordBatch>, NativeError>;

    fn close(&mut self) -> Result<(), NativeError>;
}
