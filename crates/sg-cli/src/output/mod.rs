//! Output formatting utilities for the CLI
//!
//! Resource listings are rendered as tables; status messages are colored
//! and prefixed with a symbol.

use tabled::{settings::Style, Table, Tabled};

use sg_api::{Container, Network, Node, Service, Task};

/// Width of shortened IDs in tables
const SHORT_ID: usize = 12;

/// Format services as a table
pub fn format_services(services: &[Service]) -> String {
    if services.is_empty() {
        return "No services found".to_string();
    }

    #[derive(Tabled)]
    struct ServiceRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "MODE")]
        mode: String,
        #[tabled(rename = "VERSION")]
        version: u64,
        #[tabled(rename = "UPDATED")]
        updated: String,
    }

    let rows: Vec<ServiceRow> = services
        .iter()
        .map(|s| ServiceRow {
            id: short_id(&s.id),
            name: s.name().to_string(),
            mode: service_mode(s),
            version: s.version.index,
            updated: s
                .updated_at
                .clone()
                .or_else(|| s.created_at.clone())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// `replicated (N)` or `global`, from the raw mode object
fn service_mode(service: &Service) -> String {
    let Some(mode) = &service.spec.mode else {
        return "-".to_string();
    };

    if let Some(replicated) = mode.get("Replicated") {
        match replicated.get("Replicas").and_then(|r| r.as_u64()) {
            Some(n) => format!("replicated ({})", n),
            None => "replicated".to_string(),
        }
    } else if mode.get("Global").is_some() {
        "global".to_string()
    } else {
        "-".to_string()
    }
}

/// Format tasks as a table
pub fn format_tasks(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks found".to_string();
    }

    #[derive(Tabled)]
    struct TaskRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "SERVICE")]
        service: String,
        #[tabled(rename = "SLOT")]
        slot: String,
        #[tabled(rename = "NODE")]
        node: String,
        #[tabled(rename = "DESIRED")]
        desired: String,
        #[tabled(rename = "STATE")]
        state: String,
    }

    let rows: Vec<TaskRow> = tasks
        .iter()
        .map(|t| TaskRow {
            id: short_id(&t.id),
            service: short_id(&t.service_id),
            slot: t
                .slot
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
            node: or_dash(&short_id(&t.node_id)),
            desired: or_dash(&t.desired_state),
            state: or_dash(&t.status.state),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Format nodes as a table
pub fn format_nodes(nodes: &[Node]) -> String {
    if nodes.is_empty() {
        return "No nodes found".to_string();
    }

    #[derive(Tabled)]
    struct NodeRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "HOSTNAME")]
        hostname: String,
        #[tabled(rename = "ROLE")]
        role: String,
        #[tabled(rename = "AVAILABILITY")]
        availability: String,
        #[tabled(rename = "STATE")]
        state: String,
        #[tabled(rename = "ADDRESS")]
        addr: String,
    }

    let rows: Vec<NodeRow> = nodes
        .iter()
        .map(|n| NodeRow {
            id: short_id(&n.id),
            hostname: or_dash(&n.description.hostname),
            role: or_dash(&n.spec.role),
            availability: or_dash(&n.spec.availability),
            state: or_dash(&n.status.state),
            addr: or_dash(&n.status.addr),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Format networks as a table
pub fn format_networks(networks: &[Network]) -> String {
    if networks.is_empty() {
        return "No networks found".to_string();
    }

    #[derive(Tabled)]
    struct NetworkRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "DRIVER")]
        driver: String,
        #[tabled(rename = "SCOPE")]
        scope: String,
    }

    let rows: Vec<NetworkRow> = networks
        .iter()
        .map(|n| NetworkRow {
            id: short_id(&n.id),
            name: n.name.clone(),
            driver: or_dash(&n.driver),
            scope: or_dash(&n.scope),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Format containers as a table
pub fn format_containers(containers: &[Container]) -> String {
    if containers.is_empty() {
        return "No containers found".to_string();
    }

    #[derive(Tabled)]
    struct ContainerRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "NAMES")]
        names: String,
        #[tabled(rename = "IMAGE")]
        image: String,
        #[tabled(rename = "STATE")]
        state: String,
        #[tabled(rename = "STATUS")]
        status: String,
    }

    let rows: Vec<ContainerRow> = containers
        .iter()
        .map(|c| ContainerRow {
            id: short_id(&c.id),
            names: c
                .names
                .iter()
                .map(|n| n.trim_start_matches('/'))
                .collect::<Vec<_>>()
                .join(","),
            image: c.image.clone(),
            state: or_dash(&c.state),
            status: or_dash(&c.status),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Shorten an ID the way the daemon's own tooling does
fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID).collect()
}

fn or_dash(s: &str) -> String {
    if s.is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message to stderr in red with an X prefix
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning to stderr in yellow
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}
