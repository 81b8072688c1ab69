//! Implementation of `ipm manage`: composes the text↔IPM converter and
//! the send/receive dialogues in one process, owning the lifetime of any
//! private temporary IPM container it creates along the way.

use std::fs::File;

use anyhow::{Context, Result};
use ipm_protocol::{
    receive_file, send_file, ProtocolConfig, ProtocolError, SystemJulianDayClock, TransmissionId,
};
use ipm_wire::frame::FrameTransport;
use tempfile::NamedTempFile;

use crate::{resolve_addr, EncodeMode, ManageArgs, TransferMode};

pub fn run(args: &ManageArgs) -> Result<()> {
    match args.mode {
        TransferMode::Send => send(args),
        TransferMode::Receive => receive(args),
    }
}

fn send(args: &ManageArgs) -> Result<()> {
    let addr = resolve_addr(&args.ip, args.port)?;
    let txid = TransmissionId::parse(&args.ipmname, &SystemJulianDayClock)
        .with_context(|| format!("parsing transmission id {:?}", args.ipmname))?;

    // Holding the NamedTempFile for the rest of this function guarantees
    // its backing file is removed whether the send below succeeds or not.
    let temp = match args.encode {
        EncodeMode::Ascii => {
            let temp = NamedTempFile::new().context("creating temporary IPM file")?;
            ipm_codec::encode_text_to_ipm(&args.file, temp.path())
                .with_context(|| format!("encoding {} before send", args.file.display()))?;
            Some(temp)
        }
        EncodeMode::Ebcdic => None,
    };
    let ipm_path = temp.as_ref().map_or(args.file.as_path(), NamedTempFile::path);

    let config = ProtocolConfig::default();
    let mut transport = FrameTransport::connect(addr, config.connect_timeout, config.read_timeout)
        .with_context(|| format!("connecting to {addr}"))?;
    let mut file =
        File::open(ipm_path).with_context(|| format!("opening {}", ipm_path.display()))?;

    let report = send_file(&mut transport, &txid, &mut file)?;
    println!(
        "sent {} data frame(s) as transmission {}",
        report.data_frames_sent,
        txid.render()
    );
    Ok(())
}

fn receive(args: &ManageArgs) -> Result<()> {
    let addr = resolve_addr(&args.ip, args.port)?;
    let base_txid = TransmissionId::parse(&args.ipmname, &SystemJulianDayClock)
        .with_context(|| format!("parsing transmission id {:?}", args.ipmname))?;

    let config = ProtocolConfig::default();
    let connect = move || -> Result<FrameTransport, ProtocolError> {
        FrameTransport::connect(addr, config.connect_timeout, config.read_timeout)
            .map_err(ProtocolError::from)
    };

    let report = match args.encode {
        EncodeMode::Ascii => {
            let mut temp = NamedTempFile::new().context("creating temporary IPM file")?;
            let report = receive_file(connect, &base_txid, 1, temp.as_file_mut())?;
            ipm_codec::decode_ipm_to_text(temp.path(), &args.file).with_context(|| {
                format!("decoding temporary IPM file to {}", args.file.display())
            })?;
            report
        }
        EncodeMode::Ebcdic => {
            let mut out = File::create(&args.file)
                .with_context(|| format!("creating {}", args.file.display()))?;
            receive_file(connect, &base_txid, 1, &mut out)?
        }
    };

    println!(
        "received {} block(s) using sequence {} into {}",
        report.blocks_received,
        report.sequence_used,
        args.file.display()
    );
    Ok(())
}
