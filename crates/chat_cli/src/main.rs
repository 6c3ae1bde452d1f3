use std::io::{self, BufRead, Write};

use agent_chat::chat_api::{ChatApiClient, ChatApiConfig};
use agent_chat::thread_store::{FileStorage, SharedThreadStore, ThreadStore};
use agent_chat::{init_logging, ChatSession, EnvConfig};
use chat_cli::app::ChatCli;
use tracing::info;

#[tokio::main]
async fn main() -> io::Result<()> {
    let config = EnvConfig::from_env();
    init_logging(config.log_filter.as_deref());

    let client =
        ChatApiClient::new(ChatApiConfig::new(&config.api_base_url)).map_err(io::Error::other)?;
    let store = ThreadStore::open(FileStorage::new(&config.storage_dir));
    info!(
        base_url = %config.api_base_url,
        storage = %config.storage_dir.display(),
        threads = store.threads().len(),
        "agent-chat starting"
    );

    let mut cli = ChatCli::new(ChatSession::new(SharedThreadStore::new(store), client));
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    writeln!(stdout, "agent-chat: type a message, or /help")?;
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        cli.handle_input(&line, &mut stdout).await?;
        if cli.should_exit() {
            break;
        }
    }

    Ok(())
}
