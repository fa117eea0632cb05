// framing.rs — Length-prefixed JSON frames on a byte stream.
//
// Every message is a 32-bit little-endian payload length followed by one
// JSON document. The host and its driving process both speak this framing,
// so the raw value readers/writers are public for test harnesses too.

use std::io::{Read, Write};

use anyhow::{bail, Context};
use serde_json::Value;

use crate::{config, protocol::Request};

/// Read one framed JSON value. `Ok(None)` means the stream ended cleanly
/// before a new frame started.
pub fn read_value(stream: &mut dyn Read) -> anyhow::Result<Option<Value>> {
    let mut len_buf = [0u8; 4];
    let n = stream.read(&mut len_buf).context("failed reading frame length")?;
    if n == 0 {
        return Ok(None);
    }
    if n < 4 {
        bail!("incomplete length prefix (expected 4 bytes, got {n})");
    }

    let msg_len = u32::from_le_bytes(len_buf);
    if msg_len > config::host::MAX_MESSAGE_SIZE_BYTES {
        bail!("message too large: {msg_len} bytes");
    }

    let mut payload = vec![0u8; msg_len as usize];
    stream
        .read_exact(&mut payload)
        .with_context(|| format!("failed reading frame payload ({msg_len} bytes)"))?;

    let value = serde_json::from_slice(&payload).context("invalid JSON frame")?;
    Ok(Some(value))
}

/// Read one framed request, the host's inbound message shape.
pub fn read_request(stream: &mut dyn Read) -> anyhow::Result<Option<Request>> {
    match read_value(stream)? {
        None => Ok(None),
        Some(value) => {
            let req: Request = serde_json::from_value(value).context("invalid request object")?;
            Ok(Some(req))
        }
    }
}

pub fn write_value(stream: &mut dyn Write, v: &Value) -> anyhow::Result<()> {
    let bytes = serde_json::to_vec(v).context("failed serializing JSON frame")?;
    let len = bytes
        .len()
        .try_into()
        .context("frame too large for u32 length")?;
    stream.write_all(&u32::to_le_bytes(len))?;
    stream.write_all(&bytes)?;
    stream.flush().context("failed flushing stream")?;
    Ok(())
}
