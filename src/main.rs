//! Terminal presenter for the showtime chat widget

use showtime_chat::agent::{HttpAgentClient, LoggingClient};
use showtime_chat::config::WidgetConfig;
use showtime_chat::presenter::{render_snapshot, Command, TerminalView};
use showtime_chat::WidgetHandle;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they don't interleave with the chat on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "showtime_chat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = WidgetConfig::from_env();
    tracing::info!(
        endpoint = %config.agent.endpoint,
        timeout = ?config.agent.timeout,
        "Agent endpoint configured"
    );

    let client = LoggingClient::new(Arc::new(HttpAgentClient::new(&config.agent)?));
    let widget = WidgetHandle::spawn(client, &config);

    // Attach before the first intent so the greeting is not missed
    let mut view = TerminalView::attach(widget.clone());
    println!("{}", render_snapshot(&widget.snapshot()));

    let printer = tokio::spawn(async move {
        while let Some(lines) = view.next_lines().await {
            for line in lines {
                println!("{line}");
            }
        }
    });

    widget.open_widget().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Quit => break,
            command => command.apply(&widget).await?,
        }
    }

    widget.teardown();
    printer.abort();
    Ok(())
}
