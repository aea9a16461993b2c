// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Probes whether the TPM platform hierarchy is accessible from inside the
//! guest. Issues a single TPM2_Clear authorized by TPM_RH_PLATFORM and
//! prints one line to stdout: `succeeded` when the TPM rejects the command
//! with an expected error, or a `failed - ...` diagnostic otherwise.
//!
//! Device-access and transport errors are fatal and reported on stderr; they
//! indicate environment misconfiguration rather than a probe verdict.

mod probe;
mod tpm;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use tpm::TpmDevice;

#[derive(Parser, Debug)]
#[command(
    name = "tpm_hierarchy_probe",
    about = "Verify the TPM platform hierarchy is disabled for guest access",
    version,
    long_about = None
)]
struct Cli {
    /// TPM device node to probe (default: /dev/tpmrm0, then /dev/tpm0)
    #[arg(long, value_name = "PATH")]
    device: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        eprintln!("error: {}", err);
        let mut source = err.source();
        while let Some(inner) = source {
            eprintln!("caused by: {}", inner);
            source = inner.source();
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let device = match &cli.device {
        Some(path) => TpmDevice::open_path(path)?,
        None => TpmDevice::open()?,
    };

    let outcome = probe::run(&device)?;
    println!("{outcome}");

    Ok(())
}
