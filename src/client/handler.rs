use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::TcpStream;
use tokio::task;

use crate::error::ErrorKind;
use crate::protocol::{Response, dispatch, parse_request};
use crate::service::LockerService;

/// Handles one client connection using the Tokio async runtime.
///
/// - Reads newline-delimited requests, each at most `max_request_bytes`.
/// - Runs every dispatch on the blocking pool, since operations block on
///   the filesystem, the record store, and disk-usage queries.
/// - Writes exactly one response line per request.
///
/// Malformed, non UTF-8, or over-long requests get a `bad_request` response and the
/// connection stays open.
pub async fn handle_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    service: Arc<LockerService>,
    max_request_bytes: usize,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut raw = Vec::new();
    let read_limit = max_request_bytes as u64 + 1;

    loop {
        raw.clear();
        match (&mut reader).take(read_limit).read_until(b'\n', &mut raw).await {
            Ok(0) => {
                info!("Connection closed by client {}", client_addr);
                break;
            }
            Ok(n) => {
                if n > max_request_bytes && raw.last() != Some(&b'\n') {
                    warn!("Request from {} exceeds {} bytes", client_addr, max_request_bytes);
                    if let Err(e) = discard_line(&mut reader).await {
                        error!("Failed to read from {}: {}", client_addr, e);
                        break;
                    }
                    let response = Response::failure(ErrorKind::BadRequest, "request too long");
                    if let Err(e) = write_response(&mut write_half, &response).await {
                        error!("Failed to write to {}: {}", client_addr, e);
                        break;
                    }
                    continue;
                }

                let response = match std::str::from_utf8(&raw) {
                    Ok(line) if line.trim().is_empty() => continue,
                    Ok(line) => match parse_request(line) {
                        Ok(request) => {
                            info!("Received {} from {}", request.method(), client_addr);
                            let service = Arc::clone(&service);
                            match task::spawn_blocking(move || dispatch(&service, request)).await {
                                Ok(response) => response,
                                Err(e) => {
                                    error!("Request task for {} failed: {}", client_addr, e);
                                    Response::failure(ErrorKind::Storage, "internal server error")
                                }
                            }
                        }
                        Err(e) => {
                            warn!("Malformed request from {}: {}", client_addr, e);
                            Response::failure(
                                ErrorKind::BadRequest,
                                format!("malformed request: {e}"),
                            )
                        }
                    },
                    Err(e) => {
                        warn!("Non UTF-8 request from {}: {}", client_addr, e);
                        Response::failure(ErrorKind::BadRequest, "request is not valid UTF-8")
                    }
                };

                if let Err(e) = write_response(&mut write_half, &response).await {
                    error!("Failed to write to {}: {}", client_addr, e);
                    break;
                }
            }
            Err(e) => {
                error!("Failed to read from {}: {}", client_addr, e);
                break;
            }
        }
    }

    info!("Client {} disconnected", client_addr);
}

/// Skip the rest of the current line without buffering it
async fn discard_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(());
        }
        if let Some(pos) = buf.iter().position(|b| *b == b'\n') {
            reader.consume(pos + 1);
            return Ok(());
        }
        let len = buf.len();
        reader.consume(len);
    }
}

/// Serialize a response as one JSON line and flush it
pub async fn write_response<W>(writer: &mut W, response: &Response) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut payload = serde_json::to_vec(response).map_err(io::Error::other)?;
    payload.push(b'\n');
    writer.write_all(&payload).await?;
    writer.flush().await
}
