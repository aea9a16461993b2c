// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The subset of the TPM 2.0 wire protocol needed to issue TPM2_Clear and
//! interpret the response code: command/response headers, reserved handles,
//! and the response-code constants from part 2 of the TPM 2.0 spec.

use thiserror::Error;
use zerocopy::FromBytes;
use zerocopy::Immutable;
use zerocopy::IntoBytes;
use zerocopy::KnownLayout;
use zerocopy::byteorder::big_endian::U16;
use zerocopy::byteorder::big_endian::U32;

/// TPM_ST_NO_SESSIONS: the command carries no authorization sessions.
pub const TPM_ST_NO_SESSIONS: u16 = 0x8001;

/// TPM_CC_Clear command code.
pub const TPM_CC_CLEAR: u32 = 0x0000_0126;

/// TPM_RH_PLATFORM reserved handle.
pub const TPM20_RH_PLATFORM: u32 = 0x4000_000C;

/// TPM_RC_SUCCESS.
pub const TPM_RC_SUCCESS: u32 = 0x0000;

/// TPM_RC_HIERARCHY: the hierarchy is disabled or not enabled for use.
pub const TPM_RC_HIERARCHY: u32 = 0x0085;

/// TPM_RC_AUTH_FAIL: authorization failure.
pub const TPM_RC_AUTH_FAIL: u32 = 0x008E;

/// TPM_RC_COMMAND_CODE: the command is not allowed.
pub const TPM_RC_COMMAND_CODE: u32 = 0x0143;

/// Format-one response codes have this bit set.
pub const TPM_RC_FMT1: u32 = 0x0080;

/// Parameter error bit.
pub const TPM_RC_P: u32 = 0x0100;

/// Parameter number 1.
pub const TPM_RC_1: u32 = 0x0001;

/// Handle error (bits 8-10 clear).
pub const TPM_RC_H: u32 = 0x0000;

/// Session error (bits 8-10 = 100).
pub const TPM_RC_S: u32 = 0x0800;

/// Hierarchy error reported against parameter 1, the authorization handle of
/// TPM2_Clear.
pub const TPM_RC_HIERARCHY_P1: u32 = TPM_RC_HIERARCHY | TPM_RC_FMT1 | TPM_RC_P | TPM_RC_1;

/// Common header of a TPM command.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct CmdHeader {
    /// Session tag (TPM_ST).
    pub tag: U16,
    /// Total command size in bytes, header included.
    pub size: U32,
    /// Command code (TPM_CC).
    pub command_code: U32,
}

/// Size of [`CmdHeader`] on the wire.
pub const CMD_HEADER_SIZE: usize = size_of::<CmdHeader>();

/// TPM2_Clear authorized by a single reserved handle, sent without sessions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct ClearRequest {
    /// Command header.
    pub header: CmdHeader,
    /// Hierarchy that authorizes the clear.
    pub auth_handle: U32,
}

impl ClearRequest {
    /// Build the 14-byte command buffer for clearing the TPM under the given
    /// authorization hierarchy.
    pub fn new(auth_handle: u32) -> Self {
        Self {
            header: CmdHeader {
                tag: U16::new(TPM_ST_NO_SESSIONS),
                size: U32::new(size_of::<Self>() as u32),
                command_code: U32::new(TPM_CC_CLEAR),
            },
            auth_handle: U32::new(auth_handle),
        }
    }
}

/// Common header of a TPM response. The response code occupies bytes 6..10
/// of the response buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct ReplyHeader {
    /// Session tag (TPM_ST).
    pub tag: U16,
    /// Total response size in bytes, header included.
    pub size: U32,
    /// Response code (TPM_RC).
    pub response_code: U32,
}

/// Size of [`ReplyHeader`] on the wire.
pub const REPLY_HEADER_SIZE: usize = size_of::<ReplyHeader>();

/// Response buffer too short to contain a TPM response header.
#[derive(Debug, Error)]
#[error("response length {len} is shorter than the TPM response header")]
pub struct TruncatedResponse {
    /// Actual length of the response buffer.
    pub len: usize,
}

impl ReplyHeader {
    /// Read the response header off the front of a response buffer.
    pub fn parse(response: &[u8]) -> Result<Self, TruncatedResponse> {
        Self::read_from_prefix(response)
            .map(|(header, _)| header)
            .map_err(|_| TruncatedResponse {
                len: response.len(),
            })
    }

    /// The 32-bit response code.
    pub fn response_code(&self) -> u32 {
        self.response_code.get()
    }
}
