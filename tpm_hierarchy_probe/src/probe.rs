// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Issues TPM2_Clear under the platform hierarchy and classifies the
//! response code.

use std::fmt;
use std::io;

use tpm_protocol::ClearRequest;
use tpm_protocol::ReplyHeader;
use tpm_protocol::TPM20_RH_PLATFORM;
use tpm_protocol::TPM_RC_AUTH_FAIL;
use tpm_protocol::TPM_RC_COMMAND_CODE;
use tpm_protocol::TPM_RC_HIERARCHY;
use tpm_protocol::TPM_RC_HIERARCHY_P1;
use zerocopy::IntoBytes;

use crate::tpm::TpmTransport;

/// Response codes that show the platform hierarchy is not usable from the
/// guest. TPM_RC_AUTH_FAIL and TPM_RC_COMMAND_CODE are weaker evidence than
/// the hierarchy-specific codes but count as passing.
pub const EXPECTED_CLEAR_ERRORS: [u32; 4] = [
    TPM_RC_HIERARCHY,
    TPM_RC_HIERARCHY_P1,
    TPM_RC_AUTH_FAIL,
    TPM_RC_COMMAND_CODE,
];

/// Result of one clear attempt against the platform hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The TPM refused the command with one of the expected error codes.
    HierarchyDisabled,
    /// The TPM returned some other code. TPM_RC_SUCCESS lands here: a clear
    /// that goes through means the guest can reach the platform hierarchy.
    UnexpectedResponse(u32),
    /// The response was shorter than the TPM response header.
    InvalidResponseLength,
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::HierarchyDisabled => write!(f, "succeeded"),
            ProbeOutcome::UnexpectedResponse(code) => {
                write!(f, "failed - unexpected response: 0x{code:08X}")
            }
            ProbeOutcome::InvalidResponseLength => write!(f, "failed - invalid response length"),
        }
    }
}

/// Classify a raw response buffer.
pub fn classify_response(response: &[u8]) -> ProbeOutcome {
    let Ok(header) = ReplyHeader::parse(response) else {
        return ProbeOutcome::InvalidResponseLength;
    };

    let code = header.response_code();
    if EXPECTED_CLEAR_ERRORS.contains(&code) {
        ProbeOutcome::HierarchyDisabled
    } else {
        ProbeOutcome::UnexpectedResponse(code)
    }
}

/// Send one TPM2_Clear authorized by TPM_RH_PLATFORM and classify the result.
/// A single exchange, no retries.
pub fn run(tpm: &impl TpmTransport) -> io::Result<ProbeOutcome> {
    let request = ClearRequest::new(TPM20_RH_PLATFORM);
    let response = tpm.transmit(request.as_bytes())?;
    Ok(classify_response(&response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tpm_protocol::TPM_RC_SUCCESS;

    /// Transport that records the transmitted command and replays a canned
    /// response.
    struct MockTpm {
        command: Mutex<Vec<u8>>,
        response: Vec<u8>,
    }

    impl MockTpm {
        fn new(response: &[u8]) -> Self {
            MockTpm {
                command: Mutex::new(Vec::new()),
                response: response.to_vec(),
            }
        }
    }

    impl TpmTransport for MockTpm {
        fn transmit(&self, command: &[u8]) -> io::Result<Vec<u8>> {
            *self.command.lock() = command.to_vec();
            Ok(self.response.clone())
        }
    }

    fn response_with_code(code: u32) -> Vec<u8> {
        let mut response = vec![0x80, 0x01, 0x00, 0x00, 0x00, 0x0A];
        response.extend_from_slice(&code.to_be_bytes());
        response
    }

    #[test]
    fn transmits_clear_with_platform_auth() {
        let tpm = MockTpm::new(&response_with_code(TPM_RC_HIERARCHY_P1));
        run(&tpm).unwrap();
        assert_eq!(
            *tpm.command.lock(),
            [0x80, 0x01, 0x00, 0x00, 0x00, 0x0E, 0x00, 0x00, 0x01, 0x26, 0x40, 0x00, 0x00, 0x0C]
        );
    }

    #[test]
    fn hierarchy_error_on_param1_passes() {
        let tpm = MockTpm::new(&response_with_code(TPM_RC_HIERARCHY_P1));
        let outcome = run(&tpm).unwrap();
        assert_eq!(outcome, ProbeOutcome::HierarchyDisabled);
        assert_eq!(outcome.to_string(), "succeeded");
    }

    #[test]
    fn auth_fail_passes() {
        let tpm = MockTpm::new(&response_with_code(TPM_RC_AUTH_FAIL));
        assert_eq!(run(&tpm).unwrap(), ProbeOutcome::HierarchyDisabled);
    }

    #[test]
    fn every_expected_error_passes() {
        for code in EXPECTED_CLEAR_ERRORS {
            let tpm = MockTpm::new(&response_with_code(code));
            assert_eq!(
                run(&tpm).unwrap(),
                ProbeOutcome::HierarchyDisabled,
                "code {code:#x}"
            );
        }
    }

    #[test]
    fn clear_success_fails_the_probe() {
        let tpm = MockTpm::new(&response_with_code(TPM_RC_SUCCESS));
        let outcome = run(&tpm).unwrap();
        assert_eq!(outcome, ProbeOutcome::UnexpectedResponse(TPM_RC_SUCCESS));
        assert_eq!(
            outcome.to_string(),
            "failed - unexpected response: 0x00000000"
        );
    }

    #[test]
    fn truncated_response_fails_the_probe() {
        let tpm = MockTpm::new(&[0x80, 0x01, 0x00, 0x00, 0x00, 0x0A]);
        let outcome = run(&tpm).unwrap();
        assert_eq!(outcome, ProbeOutcome::InvalidResponseLength);
        assert_eq!(outcome.to_string(), "failed - invalid response length");
    }

    #[test]
    fn empty_response_fails_the_probe() {
        let tpm = MockTpm::new(&[]);
        assert_eq!(run(&tpm).unwrap(), ProbeOutcome::InvalidResponseLength);
    }

    #[test]
    fn unexpected_code_renders_eight_hex_digits() {
        assert_eq!(
            ProbeOutcome::UnexpectedResponse(0x9A2).to_string(),
            "failed - unexpected response: 0x000009A2"
        );
    }

    #[test]
    fn transport_error_propagates() {
        struct BrokenTpm;

        impl TpmTransport for BrokenTpm {
            fn transmit(&self, _command: &[u8]) -> io::Result<Vec<u8>> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "device gone"))
            }
        }

        assert_eq!(
            run(&BrokenTpm).unwrap_err().kind(),
            io::ErrorKind::BrokenPipe
        );
    }
}
