//! Implementation of `ipm send`.

use std::fs::File;

use anyhow::{Context, Result};
use ipm_protocol::{send_file, ProtocolConfig, SystemJulianDayClock, TransmissionId};
use ipm_wire::frame::FrameTransport;

use crate::{resolve_addr, SendArgs};

pub fn run(args: &SendArgs) -> Result<()> {
    let addr = resolve_addr(&args.ip, args.port)?;
    let txid = TransmissionId::parse(&args.ipmname, &SystemJulianDayClock)
        .with_context(|| format!("parsing transmission id {:?}", args.ipmname))?;

    let config = ProtocolConfig::default();
    let mut transport = FrameTransport::connect(addr, config.connect_timeout, config.read_timeout)
        .with_context(|| format!("connecting to {addr}"))?;

    let mut file = File::open(&args.file)
        .with_context(|| format!("opening {}", args.file.display()))?;

    let report = send_file(&mut transport, &txid, &mut file)?;
    println!(
        "sent {} data frame(s) as transmission {}",
        report.data_frames_sent,
        txid.render()
    );
    Ok(())
}
