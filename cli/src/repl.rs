use scribe_core::{ChatEngine, ChatId, Message};
use std::io::{self, BufRead, Write};

pub fn print_history(history: &[Message]) {
    if history.is_empty() {
        println!("(no messages yet)");
        return;
    }
    for message in history {
        println!("{}:", message.role.marker());
        println!("{}", message.content);
        println!();
    }
}

enum Command {
    Quit,
    Help,
    History,
    New,
    List,
}

enum CommandResult {
    Continue,
    Exit,
}

impl Command {
    fn parse(input: &str) -> Result<Self, String> {
        let Some(name) = input.strip_prefix('/').and_then(|s| s.split_whitespace().next()) else {
            return Err("Empty command".to_string());
        };

        match name {
            "quit" | "exit" => Ok(Command::Quit),
            "help" => Ok(Command::Help),
            "history" => Ok(Command::History),
            "new" => Ok(Command::New),
            "list" => Ok(Command::List),
            _ => Err(format!(
                "Unknown command: /{}. Type /help for available commands.",
                name
            )),
        }
    }

    async fn execute(self, engine: &ChatEngine, id: &mut ChatId) -> anyhow::Result<CommandResult> {
        match self {
            Command::Quit => {
                println!("Goodbye!");
                return Ok(CommandResult::Exit);
            }
            Command::Help => print_help(),
            Command::History => print_history(&engine.history(id).await),
            Command::New => {
                *id = engine.new_chat().await?;
                println!("Started chat {}", id);
            }
            Command::List => {
                for chat in engine.list().await {
                    let marker = if &chat.id == id { "*" } else { " " };
                    println!("{} {}  {}", marker, chat.id, chat.preview);
                }
            }
        }
        println!();
        Ok(CommandResult::Continue)
    }
}

fn print_help() {
    println!("Available commands:");
    println!("  /quit, /exit           - Exit the chat");
    println!("  /history               - Show this chat's transcript");
    println!("  /new                   - Start a new chat");
    println!("  /list                  - List recent chats");
    println!("  /help                  - Show this help message");
    println!("  Ctrl+D                 - Exit the chat");
}

/// Read lines from stdin and send each one to chat `id` until EOF or `/quit`.
pub async fn run(engine: &ChatEngine, mut id: ChatId) -> anyhow::Result<()> {
    println!();
    println!("Chat {} • {}", id, engine.gateway().model_name());
    println!("Type /help for commands, Ctrl+D or /quit to exit.");
    println!();

    let history = engine.history(&id).await;
    if !history.is_empty() {
        print_history(&history);
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
            None => {
                println!();
                println!("Goodbye!");
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if input.starts_with('/') {
            match Command::parse(input) {
                Ok(cmd) => match cmd.execute(engine, &mut id).await {
                    Ok(CommandResult::Exit) => break,
                    Ok(CommandResult::Continue) => {}
                    Err(e) => eprintln!("Error: {:#}", e),
                },
                Err(err) => {
                    println!("{}", err);
                    println!();
                }
            }
            continue;
        }

        match engine.send(&id, input).await {
            Ok(reply) => {
                println!("{}", reply.text());
                if reply.is_degraded() {
                    eprintln!("(the model could not answer; a fallback reply was stored)");
                }
            }
            Err(e) => eprintln!("Error: {:#}", e),
        }
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert!(matches!(Command::parse("/quit"), Ok(Command::Quit)));
        assert!(matches!(Command::parse("/exit"), Ok(Command::Quit)));
        assert!(matches!(Command::parse("/history now"), Ok(Command::History)));
        assert!(matches!(Command::parse("/new"), Ok(Command::New)));
    }

    #[test]
    fn test_parse_rejects_unknown_and_empty() {
        let err = Command::parse("/model gemini").err().unwrap();
        assert!(err.contains("Unknown command: /model"));
        assert!(Command::parse("/").is_err());
    }
}
