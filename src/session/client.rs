use color_eyre::{eyre::WrapErr, Report};
use std::path::Path;
use tokio::{
    fs::File,
    io::{self, AsyncBufRead, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpStream,
};
use tracing::{info, warn};

use crate::courier::{Command, Courier, CourierError, TextReader};

pub async fn run(host: &str, port: u16, file: Option<&Path>) -> Result<(), Report> {
    let stream = TcpStream::connect((host, port))
        .await
        .wrap_err_with(|| format!("could not connect to {}:{}", host, port))?;
    info!(%host, port, "connected");

    let mut courier = Courier::new(stream);
    let mut stdout = io::stdout();

    match file {
        Some(path) => {
            let file = File::open(path)
                .await
                .wrap_err_with(|| format!("could not open '{}'", path.display()))?;
            let mut input = TextReader::new(BufReader::new(file));
            drive(&mut input, &mut courier, &mut stdout).await?;
        }
        None => {
            let mut input = TextReader::new(BufReader::new(io::stdin()));
            drive(&mut input, &mut courier, &mut stdout).await?;
        }
    }

    // lets the server see a clean end of stream
    courier.into_inner().shutdown().await?;
    info!("input exhausted");
    Ok(())
}

/// Forwards text commands to the server in wire form and copies every print
/// response to `out`.
pub async fn drive<R, S, W>(
    input: &mut TextReader<R>,
    courier: &mut Courier<S>,
    out: &mut W,
) -> Result<(), CourierError>
where
    R: AsyncBufRead + Unpin,
    S: AsyncRead + AsyncWrite + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let command = match input.read_command().await {
            Ok(Some(command)) => command,
            Ok(None) => break,
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "skipping input");
                continue;
            }
            Err(e) => return Err(e),
        };

        courier.send_command(&command).await?;

        if command == Command::Print {
            let response = courier.recv_response().await?;
            out.write_all(&response.text).await?;
            out.flush().await?;
        }
    }

    Ok(())
}
