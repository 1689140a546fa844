use anyhow::Result;
use http::{HeaderMap, StatusCode};
use reqwest::Response;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Unbuffered response of a map file download.
///
/// The handle owns the connection until its body is read. Callers must either
/// consume it with [`MapDownload::bytes`] / [`MapDownload::write_to`] or drop it
/// once they are done; holding on to an unread handle keeps the connection busy.
/// A non-success status does not prevent reading the body, so check
/// [`MapDownload::status`] first when it matters.
#[derive(Debug)]
pub struct MapDownload {
    response: Response,
}

impl MapDownload {
    pub(crate) fn new(response: Response) -> Self {
        Self { response }
    }

    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn is_success(&self) -> bool {
        self.response.status().is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    pub fn url(&self) -> &str {
        self.response.url().as_str()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    /// Reads the whole body and releases the connection.
    pub async fn bytes(self) -> Result<Vec<u8>> {
        Ok(self.response.bytes().await?.to_vec())
    }

    /// Streams the body into `writer` chunk by chunk, returning the number of bytes written.
    pub async fn write_to<W>(mut self, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let mut written = 0u64;
        while let Some(chunk) = self.response.chunk().await? {
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;
        Ok(written)
    }

    pub fn into_response(self) -> Response {
        self.response
    }
}
