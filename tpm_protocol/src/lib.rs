// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared TPM 2.0 protocol constants and helpers used by the platform
//! hierarchy probe.

pub mod tpm20proto;

pub use tpm20proto::ClearRequest;
pub use tpm20proto::ReplyHeader;
pub use tpm20proto::TPM20_RH_PLATFORM;
pub use tpm20proto::TPM_CC_CLEAR;
pub use tpm20proto::TPM_RC_AUTH_FAIL;
pub use tpm20proto::TPM_RC_COMMAND_CODE;
pub use tpm20proto::TPM_RC_HIERARCHY;
pub use tpm20proto::TPM_RC_HIERARCHY_P1;
pub use tpm20proto::TPM_RC_SUCCESS;
pub use tpm20proto::TPM_ST_NO_SESSIONS;
pub use tpm20proto::TruncatedResponse;
