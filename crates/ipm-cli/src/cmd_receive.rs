//! Implementation of `ipm receive`.

use std::fs::File;

use anyhow::{Context, Result};
use ipm_protocol::{receive_file, ProtocolConfig, ProtocolError, SystemJulianDayClock, TransmissionId};
use ipm_wire::frame::FrameTransport;

use crate::{resolve_addr, ReceiveArgs};

pub fn run(args: &ReceiveArgs) -> Result<()> {
    let addr = resolve_addr(&args.ip, args.port)?;
    let base_txid = TransmissionId::parse(&args.ipmname, &SystemJulianDayClock)
        .with_context(|| format!("parsing transmission id {:?}", args.ipmname))?;

    let config = ProtocolConfig::default();
    let connect = move || -> Result<FrameTransport, ProtocolError> {
        FrameTransport::connect(addr, config.connect_timeout, config.read_timeout)
            .map_err(ProtocolError::from)
    };

    let mut out = File::create(&args.file)
        .with_context(|| format!("creating {}", args.file.display()))?;

    let report = receive_file(connect, &base_txid, args.start_sequence, &mut out)?;
    println!(
        "received {} block(s) using sequence {} into {}",
        report.blocks_received,
        report.sequence_used,
        args.file.display()
    );
    Ok(())
}
