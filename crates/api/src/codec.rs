//! Framed binary codec.
//!
//! A message travels as two frames written back to back: a fixed-size
//! package header naming the message type, then the fixed-size payload. The
//! receiver reads exactly `HEADER_LEN` bytes, checks the package type, then
//! reads exactly the payload size of the message it expects.

use crate::messages::{decode_header, encode_header, PackageType, HEADER_LEN};
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Errors that can occur while encoding, decoding or moving frames.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("unknown package type {0}")]
    UnknownPackageType(i32),

    #[error("expected {expected:?} package, got {got:?}")]
    UnexpectedPackage {
        expected: PackageType,
        got: PackageType,
    },

    #[error("unknown request kind {0}")]
    UnknownRequestKind(i32),

    #[error("invalid {field} value {value}")]
    InvalidField { field: &'static str, value: i32 },
}

pub type Result<T> = std::result::Result<T, CodecError>;

/// A message with a fixed-size wire record.
pub trait Message: Sized {
    /// Package type announced in the header.
    const PACKAGE: PackageType;
    /// Exact size of the encoded payload.
    const ENCODED_LEN: usize;

    fn encode(&self) -> Result<Vec<u8>>;
    fn decode(bytes: &[u8]) -> Result<Self>;
}

fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_big_endian()
        .with_fixint_encoding()
}

pub(crate) fn wire_encode<T: Serialize>(record: &T) -> Result<Vec<u8>> {
    Ok(wire_options().serialize(record)?)
}

pub(crate) fn wire_decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(wire_options().deserialize(bytes)?)
}

/// Write a header frame followed by the message payload.
pub async fn send_package<W, M>(writer: &mut W, message: &M) -> Result<()>
where
    W: AsyncWrite + Unpin,
    M: Message,
{
    let header = encode_header(M::PACKAGE)?;
    let payload = message.encode()?;

    writer.write_all(&header).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a header frame and then exactly one payload of type `M`.
pub async fn recv_package<R, M>(reader: &mut R) -> Result<M>
where
    R: AsyncRead + Unpin,
    M: Message,
{
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header).await?;

    let package = decode_header(&header)?;
    if package != M::PACKAGE {
        return Err(CodecError::UnexpectedPackage {
            expected: M::PACKAGE,
            got: package,
        });
    }

    let mut payload = vec![0u8; M::ENCODED_LEN];
    reader.read_exact(&mut payload).await?;
    M::decode(&payload)
}
