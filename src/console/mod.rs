use log::{ info, warn };
use rust_decimal::Decimal;
use std::path::{ Path, PathBuf };
use std::sync::Arc;
use tokio::io::{ AsyncBufReadExt, BufReader };
use tokio::sync::Mutex;
use crate::catalog::MODELS;
use crate::session::export::ExportError;
use crate::session::SessionClient;

const HELP: &str = "\
Commands:
  /address <wallet>   set the wallet address
  /model <id>         select a model from the catalog
  /models             list the built-in model catalog
  /remote-models      show the models reported by the server
  /health             check API health
  /credits            show credits for the wallet
  /eligibility        check whether the wallet can chat with the selected model
  /history            refresh the conversation from the server
  /show               print the conversation
  /stats              show session stats
  /export             write the conversation to a text file
  /clear              delete the session on the server and start over
  /quit               exit
Anything else is sent as a chat message.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Address(String),
    Model(Option<u32>),
    Models,
    RemoteModels,
    Health,
    Credits,
    Eligibility,
    History,
    Show,
    Stats,
    Export,
    Clear,
    Quit,
    Chat(String),
    Empty,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    if !line.starts_with('/') {
        return Command::Chat(line.to_string());
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    match name.to_lowercase().as_str() {
        "/help" | "/?" => Command::Help,
        "/address" => Command::Address(rest.to_string()),
        "/model" => Command::Model(rest.parse().ok()),
        "/models" => Command::Models,
        "/remote-models" => Command::RemoteModels,
        "/health" => Command::Health,
        "/credits" => Command::Credits,
        "/eligibility" => Command::Eligibility,
        "/history" => Command::History,
        "/show" => Command::Show,
        "/stats" => Command::Stats,
        "/export" => Command::Export,
        "/clear" => Command::Clear,
        "/quit" | "/exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue(String),
    Quit,
}

fn require_address(client: &SessionClient) -> Result<String, String> {
    let address = client.session().user_address.trim();
    if address.is_empty() {
        Err("Please enter your wallet address first! (/address <wallet>)".to_string())
    } else {
        Ok(address.to_string())
    }
}

fn stats(client: &SessionClient) -> String {
    let session = client.session();
    match &session.session_id {
        Some(id) =>
            format!(
                "Session {}\nMessages: {}\nTotal Cost: {:.6} ETH\nLast activity: {}",
                id,
                session.message_count(),
                session.total_cost,
                session.last_activity_at.format("%H:%M:%S")
            ),
        None => "No active session".to_string(),
    }
}

fn conversation(client: &SessionClient) -> String {
    let messages = &client.session().messages;
    if messages.is_empty() {
        return "Start a conversation by typing a message below!".to_string();
    }
    messages
        .iter()
        .map(|m| {
            if m.timestamp.is_empty() {
                format!("{}: {}", m.role.title(), m.content)
            } else {
                format!("[{}] {}: {}", m.timestamp, m.role.title(), m.content)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Executes one console command against the session.
pub async fn handle(client: &mut SessionClient, command: Command, export_dir: &Path) -> Outcome {
    let text = match command {
        Command::Empty => String::new(),
        Command::Help => HELP.to_string(),
        Command::Quit => {
            return Outcome::Quit;
        }
        Command::Unknown(name) => format!("Unknown command '{}'. Type /help.", name),
        Command::Address(address) if address.is_empty() => "Usage: /address <wallet>".to_string(),
        Command::Address(address) => {
            client.set_user_address(address);
            format!("Wallet address set to {}", client.session().user_address)
        }
        Command::Model(None) => "Usage: /model <id>".to_string(),
        Command::Model(Some(id)) =>
            match client.select_model(id) {
                Ok(model) => format!("{}: {}", model.label(), model.description),
                Err(e) => e.to_string(),
            }
        Command::Models => {
            let selected = client.session().selected_model_id;
            MODELS.iter()
                .map(|m| {
                    let marker = if m.id == selected { "*" } else { " " };
                    format!("{} {} {} - {}", marker, m.id, m.label(), m.description)
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        Command::RemoteModels =>
            match client.list_remote_models().await {
                Ok(models) =>
                    serde_json::to_string_pretty(&models).unwrap_or_else(|_| models.to_string()),
                Err(e) => format!("Error: {}", e),
            }
        Command::Health => {
            let report = client.check_health().await;
            if report.healthy {
                format!("API is healthy! Status: {}", report.status().unwrap_or("OK"))
            } else {
                "API is not responding".to_string()
            }
        }
        Command::Credits =>
            match require_address(client) {
                Err(msg) => msg,
                Ok(address) =>
                    match client.get_credits(&address).await {
                        Ok(c) => format!("Credits: {} ETH", c.credits),
                        Err(e) => format!("Error: {}", e),
                    }
            }
        Command::Eligibility =>
            match require_address(client) {
                Err(msg) => msg,
                Ok(address) => {
                    let model_id = client.session().selected_model_id;
                    match client.check_eligibility(&address, model_id).await {
                        Ok(e) if e.can_chat => format!("Eligible! Cost: {} ETH", e.cost),
                        Ok(e) => format!("Not enough credits. Cost: {} ETH", e.cost),
                        Err(e) => format!("Error: {}", e),
                    }
                }
            }
        Command::History =>
            match client.refresh_history().await {
                Ok(true) => conversation(client),
                Ok(false) => "History is up to date".to_string(),
                Err(e) => format!("Error: {}", e),
            }
        Command::Show => conversation(client),
        Command::Stats => stats(client),
        Command::Export =>
            match client.export_to(export_dir) {
                Ok(path) => format!("Chat history written to {}", path.display()),
                Err(ExportError::Empty) => "No chat history to export".to_string(),
                Err(e) => format!("Error: {}", e),
            }
        Command::Clear => {
            if !client.session().is_active() {
                "No active session".to_string()
            } else if client.clear_session().await {
                "Chat history cleared!".to_string()
            } else {
                "Failed to clear session".to_string()
            }
        }
        Command::Chat(content) => {
            if let Err(msg) = require_address(client) {
                msg
            } else {
                match client.send_message(&content).await {
                    Ok(reply) =>
                        match reply.cost {
                            Some(cost) if cost >= Decimal::ZERO =>
                                format!("Assistant: {}\nQuery cost: {:.6} ETH", reply.response, cost),
                            _ => format!("Assistant: {}", reply.response),
                        }
                    Err(e) => format!("Error: {}", e),
                }
            }
        }
    };
    Outcome::Continue(text)
}

/// Runs one command, then reconciles with the server's history while the
/// session is active, the way each redraw of the dashboard does.
pub async fn handle_and_reconcile(
    client: &mut SessionClient,
    command: Command,
    export_dir: &Path
) -> Outcome {
    let refreshes_itself = matches!(command, Command::History);
    let outcome = handle(client, command, export_dir).await;
    if outcome != Outcome::Quit && !refreshes_itself && client.session().is_active() {
        if let Err(e) = client.refresh_history().await {
            warn!("History reconciliation failed: {}", e);
        }
    }
    outcome
}

/// Reads commands from stdin until `/quit` or end of input.
pub async fn run(client: Arc<Mutex<SessionClient>>, export_dir: PathBuf) -> std::io::Result<()> {
    {
        let guard = client.lock().await;
        let report = guard.check_health().await;
        if report.healthy {
            println!("Connected");
        } else {
            println!("Disconnected");
        }
    }
    println!("Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = parse_command(&line);
        let outcome = {
            let mut guard = client.lock().await;
            handle_and_reconcile(&mut *guard, command, &export_dir).await
        };
        match outcome {
            Outcome::Continue(text) => {
                if !text.is_empty() {
                    println!("{}", text);
                }
            }
            Outcome::Quit => {
                info!("Console closed by user");
                break;
            }
        }
    }

    if let Some(id) = &client.lock().await.session().session_id {
        info!("Leaving session {} open on the server", id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_chat() {
        assert_eq!(parse_command("  hello there "), Command::Chat("hello there".into()));
        assert_eq!(parse_command("   "), Command::Empty);
    }

    #[test]
    fn slash_commands() {
        assert_eq!(parse_command("/address 0xABC"), Command::Address("0xABC".into()));
        assert_eq!(parse_command("/address"), Command::Address(String::new()));
        assert_eq!(parse_command("/model 2"), Command::Model(Some(2)));
        assert_eq!(parse_command("/model two"), Command::Model(None));
        assert_eq!(parse_command("/CLEAR"), Command::Clear);
        assert_eq!(parse_command("/exit"), Command::Quit);
        assert_eq!(parse_command("/nope"), Command::Unknown("/nope".into()));
    }
}
