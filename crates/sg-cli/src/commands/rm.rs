//! Remove command implementation

use anyhow::Result;

use sg_api::Service;
use sg_client::{find_services_by_name, ClientError, ClientHandle, DockerApi};

use crate::output::{format_services, print_error, print_info, print_success, print_warning};

/// Remove every service whose name matches `pattern`
///
/// The removal lists services again, so what is actually removed is
/// reported from that second pass, not from the preview.
pub async fn rm_command<A: DockerApi>(
    handle: &ClientHandle<A>,
    pattern: &str,
    force: bool,
) -> Result<()> {
    let services = handle.list_services(Vec::<(String, String)>::new()).await?;
    let matched = find_services_by_name(pattern, &services)?;

    if matched.is_empty() {
        print_info(&format!("No services match '{}'", pattern));
        return Ok(());
    }

    if !force {
        println!("{}", format_services(&matched));
        print_warning(&format!(
            "About to remove {} service(s) matching '{}'. The match is re-evaluated when removing. Use --force to skip confirmation.",
            matched.len(),
            pattern
        ));

        print!("Continue? [y/N] ");
        std::io::Write::flush(&mut std::io::stdout())?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            print_warning("Aborted");
            return Ok(());
        }
    }

    match handle.delete_services_matching(pattern).await {
        Ok(removed) => {
            report_removed(&matched, &removed);
            if removed.is_empty() {
                print_info("Nothing left to remove");
            }
            Ok(())
        }
        Err(ClientError::PartialDelete {
            removed,
            failed_id,
            source,
        }) => {
            report_removed(&matched, &removed);
            print_error(&format!("Failed to remove service {}: {}", failed_id, source));
            anyhow::bail!(
                "Removed {} service(s) before stopping; re-run to remove the rest",
                removed.len()
            )
        }
        Err(e) => Err(e.into()),
    }
}

fn report_removed(shown: &[Service], removed: &[Service]) {
    for service in removed {
        print_success(&format!("Removed service: {} ({})", service.name(), service.id));
    }
    for service in not_shown(shown, removed) {
        print_warning(&format!(
            "Service {} ({}) started matching after the preview and was removed too",
            service.name(),
            service.id
        ));
    }
}

/// Removed services that were not in the preview
fn not_shown<'a>(shown: &[Service], removed: &'a [Service]) -> Vec<&'a Service> {
    removed
        .iter()
        .filter(|r| !shown.iter().any(|s| s.id == r.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_api::{Annotations, ServiceSpec};

    fn service(id: &str, name: &str) -> Service {
        Service {
            id: id.to_string(),
            spec: ServiceSpec {
                annotations: Annotations {
                    name: name.to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_not_shown_flags_services_missing_from_preview() {
        let shown = vec![service("a", "web-1"), service("b", "web-2")];
        let removed = vec![service("a", "web-1"), service("c", "web-3")];

        let extra = not_shown(&shown, &removed);
        let ids: Vec<&str> = extra.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[test]
    fn test_not_shown_empty_when_removal_matches_preview() {
        let shown = vec![service("a", "web-1"), service("b", "web-2")];
        let removed = vec![service("a", "web-1")];
        assert!(not_shown(&shown, &removed).is_empty());
    }
}
