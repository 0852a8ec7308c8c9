//! Listing command implementations

use anyhow::Result;

use sg_client::{
    find_by_id, find_services_by_name, find_tasks_by_service_id, ClientHandle, DockerApi,
};

use crate::output::{
    format_containers, format_networks, format_nodes, format_services, format_tasks, print_success,
};

/// Check the daemon answers
pub async fn ping_command<A: DockerApi>(handle: &ClientHandle<A>) -> Result<()> {
    let reply = handle.ping().await?;
    print_success(&format!("Daemon replied: {}", reply.trim()));
    Ok(())
}

/// List services, optionally narrowed by a name pattern
pub async fn services_command<A: DockerApi>(
    handle: &ClientHandle<A>,
    filters: &[(String, String)],
    name: Option<&str>,
) -> Result<()> {
    let services = handle.list_services(filters.iter().cloned()).await?;

    let services = match name {
        Some(pattern) => find_services_by_name(pattern, &services)?,
        None => services,
    };

    println!("{}", format_services(&services));
    Ok(())
}

/// List tasks, optionally only those of one service
///
/// With `--service`, the service must exist; its tasks are selected from
/// the listing.
pub async fn tasks_command<A: DockerApi>(
    handle: &ClientHandle<A>,
    service: Option<&str>,
    filters: &[(String, String)],
) -> Result<()> {
    let tasks = handle.list_tasks(filters.iter().cloned()).await?;

    let tasks = match service {
        Some(service_id) => {
            let services = handle.list_services(Vec::<(String, String)>::new()).await?;
            let service = find_by_id(service_id, &services)?;
            println!("Tasks of service {}:", service.name());
            find_tasks_by_service_id(&service.id, &tasks)
        }
        None => tasks,
    };

    println!("{}", format_tasks(&tasks));
    Ok(())
}

pub async fn nodes_command<A: DockerApi>(
    handle: &ClientHandle<A>,
    filters: &[(String, String)],
) -> Result<()> {
    let nodes = handle.list_nodes(filters.iter().cloned()).await?;
    println!("{}", format_nodes(&nodes));
    Ok(())
}

pub async fn networks_command<A: DockerApi>(
    handle: &ClientHandle<A>,
    filters: &[(String, String)],
) -> Result<()> {
    let networks = handle.list_networks(filters.iter().cloned()).await?;
    println!("{}", format_networks(&networks));
    Ok(())
}

pub async fn containers_command<A: DockerApi>(
    handle: &ClientHandle<A>,
    filters: &[(String, String)],
) -> Result<()> {
    let containers = handle.list_containers(filters.iter().cloned()).await?;
    println!("{}", format_containers(&containers));
    Ok(())
}
