// Copyright (c) 2024 The Liquid Sign Core Developers

use num_enum::TryFromPrimitive;

/// [Engine][super::Engine] errors.
///
/// Any error is terminal for the session: the engine moves to
/// [Cancelled][super::State::Cancelled] or [Failed][super::State::Failed]
/// and scrubs session memory before the error is returned.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
pub enum Error {
    /// Malformed, missing or inconsistent host-supplied data
    #[cfg_attr(feature = "thiserror", error("bad parameters: {0}"))]
    BadParameters(&'static str),

    /// Message received outside the expected sequence
    #[cfg_attr(feature = "thiserror", error("protocol error: {0}"))]
    Protocol(&'static str),

    /// Failure of a primitive expected to always succeed
    #[cfg_attr(feature = "thiserror", error("internal error: {0}"))]
    Internal(&'static str),

    /// User declined (a timeout stands in for a decline)
    #[cfg_attr(feature = "thiserror", error("user declined to sign transaction"))]
    UserCancelled,
}

/// Wire error codes reported to the host alongside the message text
#[derive(Copy, Clone, PartialEq, Eq, Debug, TryFromPrimitive)]
#[repr(i32)]
pub enum ErrorCode {
    UserCancelled = -32000,
    Protocol = -32001,
    BadParameters = -32602,
    Internal = -32603,
}

impl Error {
    /// Wire code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::BadParameters(_) => ErrorCode::BadParameters,
            Error::Protocol(_) => ErrorCode::Protocol,
            Error::Internal(_) => ErrorCode::Internal,
            Error::UserCancelled => ErrorCode::UserCancelled,
        }
    }

    /// Human-readable message for this error
    pub fn message(&self) -> &'static str {
        match self {
            Error::BadParameters(m) | Error::Protocol(m) | Error::Internal(m) => m,
            Error::UserCancelled => "User declined to sign transaction",
        }
    }
}
