use std::process::ExitCode;

use tracing::{error, info, warn};

use sockit::{DatagramEndpoint, EndpointConfig, SocketAddress};

const GREETING: &[u8] = b"Greetings earthling";
const PORT_PREFIX: &str = "--port=";
const IP_PREFIX: &str = "--ip=";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Server,
    Client,
    Usage,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let mut mode = Mode::Usage;
    let mut config = EndpointConfig::default();

    for arg in std::env::args().skip(1) {
        if arg == "server" {
            mode = Mode::Server;
        } else if arg == "client" {
            mode = Mode::Client;
        } else if let Some(value) = arg.strip_prefix(PORT_PREFIX) {
            match value.parse::<u16>() {
                Ok(port) => {
                    config.port = port;
                    info!("port defined as {}", port);
                }
                Err(_) => warn!("ignoring invalid port value: {:?}", value),
            }
        } else if let Some(value) = arg.strip_prefix(IP_PREFIX) {
            config.host = value.to_string();
            info!("ip address defined as {}", value);
        } else {
            warn!("unknown argument: {:?}", arg);
        }
    }

    let result = match mode {
        Mode::Server => run_server(&config).await,
        Mode::Client => run_client(&config).await,
        Mode::Usage => {
            let path = std::env::args().next().unwrap_or_else(|| "sockit".into());
            let name = path.rsplit('/').next().unwrap_or("sockit").to_string();
            println!(
                "Usage: {} (server|client) [--port=<portnumber>] [--ip=<address>]",
                name
            );
            return ExitCode::SUCCESS;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_server(config: &EndpointConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("server starting");

    let address = config.socket_address()?;
    let mut endpoint = DatagramEndpoint::open()?.with_recv_buffer_size(config.recv_buffer_size);
    endpoint.bind(address)?;

    if let Some(local) = endpoint.local_address() {
        info!("listening on {}", local);
    }

    let mut subscription = endpoint.on_datagram(|datagram| {
        info!(
            "read {} bytes from {}",
            datagram.payload.len(),
            datagram.source
        );
        match datagram.payload_utf8() {
            Some(text) => info!("the message was: {}", text),
            None => info!("the message was not valid UTF-8"),
        }
    })?;

    // Blocks for the lifetime of the server; receive failures surface here
    // while the subscription keeps listening.
    while let Some(err) = subscription.next_error().await {
        warn!("receive error: {}", err);
    }

    Ok(())
}

async fn run_client(config: &EndpointConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("client starting");

    let destination = SocketAddress::encode(&config.host, config.port)?;
    let mut endpoint = DatagramEndpoint::open()?;
    let sent = endpoint.send_to(GREETING, destination).await?;
    info!("just sent {} bytes to {}", sent, destination);
    endpoint.close();

    Ok(())
}
