//! CLI Agents Command
//!
//! Prints the agent personas available for chat.

use finnext_core::AgentRegistry;

use crate::terminal_output::{render_table, Column};

pub fn run(registry: &AgentRegistry) {
    println!("Available Agents:\n");
    print!("{}", render_agents(registry));
}

fn render_agents(registry: &AgentRegistry) -> String {
    let columns = vec![
        Column::left("ID"),
        Column::left("Name"),
        Column::left("Endpoint"),
        Column::left("Icon"),
    ];
    let rows: Vec<Vec<String>> = registry
        .list()
        .iter()
        .map(|agent| {
            vec![
                agent.id.clone(),
                agent.name.clone(),
                agent.api_url.clone(),
                agent.icon.clone(),
            ]
        })
        .collect();
    render_table(&columns, &rows)
}
