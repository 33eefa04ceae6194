//! Interactive terminal client: introduce ourselves, forward typed lines as
//! chat, print every reply.

use tokio::net::TcpStream;
use tokio::sync::mpsc;

use crate::protocol::Message;
use crate::wire;

/// Connect to `addr`, send a [`Message::Connect`], then relay stdin lines
/// until the server closes or stdin runs out.
pub async fn run(addr: &str, username: &str) -> anyhow::Result<()> {
    let stream = TcpStream::connect(addr).await?;
    log::info!("connected to {}", addr);
    let (mut rd, mut wr) = stream.into_split();

    wire::write_frame(
        &mut wr,
        &Message::Connect {
            username: username.to_owned(),
        },
    )
    .await?;

    // stdin is read on a plain blocking thread; lines arrive over a channel
    let (tx, mut lines) = mpsc::channel::<String>(16);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if tx.blocking_send(line.trim_end().to_owned()).is_err() {
                        break;
                    }
                }
            }
        }
    });

    let mut printer = tokio::spawn(async move {
        while let Some(msg) = wire::read_frame(&mut rd).await? {
            println!("{:?}", msg);
        }
        Ok::<_, wire::WireError>(())
    });

    loop {
        tokio::select! {
            res = &mut printer => {
                res??;
                println!("Connection closed. Bye bye.");
                return Ok(());
            }
            line = lines.recv() => match line {
                Some(text) => {
                    wire::write_frame(&mut wr, &Message::ChatMessage { msg: text }).await?;
                }
                None => return Ok(()),
            },
        }
    }
}
