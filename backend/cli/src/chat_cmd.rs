//! CLI Chat Command
//!
//! Interactive loop over a [`ChatSession`]. Plain lines are sent to the active
//! agent; slash commands switch agents and reprint history.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use finnext_config::ClientConfig;
use finnext_core::{AgentRegistry, Message, Sender};
use finnext_session::{ChatSession, HttpTransport};

use crate::terminal_output::{
    note_error, note_info, note_warn, paint, prompt, truncate_title, BOLD, CYAN, DIM, GREEN,
};

#[derive(Debug, PartialEq, Eq)]
enum ChatCommand<'a> {
    Send(&'a str),
    Switch(&'a str),
    Agents,
    History,
    Quit,
    Help,
    Unknown(&'a str),
}

fn parse_command(line: &str) -> ChatCommand<'_> {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.trim_start().strip_prefix('/') else {
        return ChatCommand::Send(line);
    };
    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("");
    let arg = parts.next().map(str::trim).unwrap_or("");
    match name {
        "agent" if !arg.is_empty() => ChatCommand::Switch(arg),
        "agents" => ChatCommand::Agents,
        "history" => ChatCommand::History,
        "quit" | "exit" => ChatCommand::Quit,
        "help" => ChatCommand::Help,
        _ => ChatCommand::Unknown(line.trim()),
    }
}

pub async fn run(
    registry: Arc<AgentRegistry>,
    client: &ClientConfig,
    agent: Option<&str>,
    gateway: &str,
) -> Result<()> {
    let mut session = match agent {
        Some(id) => ChatSession::with_active_agent(registry, id)?,
        None => ChatSession::new(registry),
    };
    let mut transport = HttpTransport::new(gateway);
    if let Some(secs) = client.timeout_secs {
        transport = transport.with_timeout(Duration::from_secs(secs));
    }

    note_info(&format!("Connected to {}. Type /help for commands.", transport.base_url()));
    print_banner(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    loop {
        let agent = session.active_agent();
        prompt(&mut stdout, &format!("{} {}> ", agent.icon, agent.name))?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            ChatCommand::Send(text) => {
                if text.trim().is_empty() {
                    continue;
                }
                println!("{}", paint(DIM, "Thinking..."));
                if let Some(reply) = session.submit(text, &transport).await {
                    println!("{}", render_message(reply));
                }
            }
            ChatCommand::Switch(id) => match session.switch_agent(id) {
                Ok(()) => print_banner(&session),
                Err(e) => note_error(&e.to_string()),
            },
            ChatCommand::Agents => {
                let active = session.active_agent().id.clone();
                for agent in session.registry().list() {
                    let marker = if agent.id == active { "*" } else { " " };
                    println!("{marker} {} {:<16} {}", agent.icon, agent.id, agent.name);
                }
            }
            ChatCommand::History => {
                let history = session.active_history();
                if history.is_empty() {
                    note_info("No messages yet");
                }
                for message in history {
                    println!("{}", render_message(message));
                }
            }
            ChatCommand::Quit => break,
            ChatCommand::Help => print_help(),
            ChatCommand::Unknown(cmd) => note_warn(&format!("Unknown command: {cmd}")),
        }
    }

    Ok(())
}

fn print_banner(session: &ChatSession) {
    let agent = session.active_agent();
    println!("\n{}", paint(BOLD, &format!("{} {}", agent.icon, agent.name)));
    if !agent.description.is_empty() {
        println!("{}", paint(DIM, &agent.description));
    }
    for message in session.active_history() {
        println!("{}", render_message(message));
    }
}

fn print_help() {
    println!("  /agent <id>   switch to another agent");
    println!("  /agents       list agents");
    println!("  /history      reprint this agent's conversation");
    println!("  /quit         leave the chat");
}

fn render_message(message: &Message) -> String {
    let who = match message.sender {
        Sender::User => paint(CYAN, "you"),
        Sender::Agent => paint(GREEN, &message.agent_id),
    };
    let mut out = format!(
        "[{}] {who}: {}",
        message.created_at.format("%H:%M"),
        message.content
    );
    for (i, source) in message.sources.iter().flatten().enumerate() {
        out.push_str(&format!(
            "\n    [{}] {} <{}>",
            i + 1,
            truncate_title(&source.title),
            source.link
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use finnext_core::Source;

    #[test]
    fn plain_lines_are_sent() {
        assert_eq!(parse_command("What is my beta?\n"), ChatCommand::Send("What is my beta?"));
        assert_eq!(parse_command("  indented"), ChatCommand::Send("  indented"));
    }

    #[test]
    fn slash_commands() {
        assert_eq!(parse_command("/agent risk"), ChatCommand::Switch("risk"));
        assert_eq!(parse_command("/agents"), ChatCommand::Agents);
        assert_eq!(parse_command("/history"), ChatCommand::History);
        assert_eq!(parse_command("/quit"), ChatCommand::Quit);
        assert_eq!(parse_command("/agent"), ChatCommand::Unknown("/agent"));
        assert_eq!(parse_command("/dance"), ChatCommand::Unknown("/dance"));
    }

    #[test]
    fn renders_sources_with_truncated_titles() {
        let long_title = "t".repeat(80);
        let message = Message::agent(7, "risk", "Beta is 1.2").with_sources(vec![Source {
            title: long_title,
            link: "https://example.com".into(),
        }]);
        let out = crate::terminal_output::strip_ansi(&render_message(&message));
        assert!(out.contains("risk: Beta is 1.2"));
        assert!(out.contains(&format!("[1] {}... <https://example.com>", "t".repeat(70))));
    }
}
