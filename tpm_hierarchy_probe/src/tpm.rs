// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Blocking access to the in-guest TPM character device.
//!
//! Prefers the kernel resource manager node (/dev/tpmrm0) and falls back to
//! the raw device (/dev/tpm0). A transmit is one full command write followed
//! by one read; interpreting the response is left to the caller.

use parking_lot::Mutex;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Read;
use std::io::Write;
use std::path::Path;

/// Device nodes to try, in preference order.
const DEVICE_CANDIDATES: [&str; 2] = ["/dev/tpmrm0", "/dev/tpm0"];

/// Largest response the device is expected to produce in one read.
const MAX_RESPONSE_SIZE: usize = 4096;

/// Low-level TPM transport abstraction.
pub trait TpmTransport {
    /// Transmit a TPM command buffer and return the raw response bytes.
    fn transmit(&self, command: &[u8]) -> io::Result<Vec<u8>>;
}

/// Handle to an open TPM character device.
pub struct TpmDevice {
    file: Mutex<File>,
}

impl TpmDevice {
    /// Open the default TPM device node.
    pub fn open() -> io::Result<Self> {
        let mut last_err = None;
        for path in DEVICE_CANDIDATES {
            match Self::open_path(Path::new(path)) {
                Ok(device) => return Ok(device),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no TPM device")))
    }

    /// Open a specific TPM device node.
    pub fn open_path(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(TpmDevice {
            file: Mutex::new(file),
        })
    }
}

impl TpmTransport for TpmDevice {
    fn transmit(&self, command: &[u8]) -> io::Result<Vec<u8>> {
        let mut file = self.file.lock();

        file.write_all(command)?;

        // Single read; a truncated response must reach the caller as a
        // short buffer rather than block waiting for a full header.
        let mut response = vec![0u8; MAX_RESPONSE_SIZE];
        let len = file.read(&mut response)?;
        response.truncate(len);

        Ok(response)
    }
}
