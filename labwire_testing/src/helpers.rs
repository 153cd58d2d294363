//! Drive a [`Responder`] with raw bytes over an in-memory stream.

use std::io;

use labwire::{
    config::LinkConfig,
    session::{self, Responder, SessionError},
};
use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

const DEFAULT_CAPACITY: usize = 4096;

/// What a responder produced for a scripted input.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DriveOutcome {
    /// Every byte the responder wrote back.
    pub replies: Vec<u8>,
    /// Texts delivered by completed cycles, in order.
    pub delivered: Vec<String>,
    /// The error that ended the session, if any.
    pub error: Option<String>,
}

/// Feed `chunks` to a responder with the default [`LinkConfig`].
///
/// # Errors
///
/// Returns any I/O error raised on the scripted side of the stream.
pub async fn drive_responder(chunks: Vec<Vec<u8>>) -> io::Result<DriveOutcome> {
    drive_responder_with(LinkConfig::default(), chunks).await
}

/// Feed `chunks` to a responder configured by `config`.
///
/// The scripted side writes every chunk, closes its half and then collects
/// the replies until the responder drops the stream.
///
/// # Errors
///
/// Returns any I/O error raised on the scripted side of the stream.
pub async fn drive_responder_with(config: LinkConfig, chunks: Vec<Vec<u8>>) -> io::Result<DriveOutcome> {
    let (mut client, server) = duplex(DEFAULT_CAPACITY);

    let server_fut = async move {
        let mut link = session::link(server, &config);
        let mut responder = Responder::new(config);
        let mut delivered = Vec::new();
        let error = loop {
            match responder.receive(&mut link).await {
                Ok(Some(text)) => delivered.push(text),
                Ok(None) | Err(SessionError::Closed) => break None,
                Err(err) => break Some(err.to_string()),
            }
        };
        io::Result::Ok((delivered, error))
    };

    let client_fut = async {
        for chunk in &chunks {
            client.write_all(chunk).await?;
        }
        client.shutdown().await?;

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).await?;
        io::Result::Ok(buf)
    };

    let ((delivered, error), replies) = tokio::try_join!(server_fut, client_fut)?;
    Ok(DriveOutcome {
        replies,
        delivered,
        error,
    })
}
