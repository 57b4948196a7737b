//! 4. Container image checks.

use berth_core::CheckResult;
use berth_engine::Target;

pub fn root_containers(t: &Target) -> CheckResult {
    let name = "4.1 Create a user for the container";
    if !t.containers.running() {
        return CheckResult::skip(name, "No running containers");
    }

    let root: Vec<&str> = t
        .containers
        .iter()
        .filter(|c| c.detail.config.user.is_empty())
        .map(|c| c.id.as_str())
        .collect();

    if root.is_empty() {
        CheckResult::pass(name)
    } else {
        CheckResult::fail(name, format!("Containers running as root: {}", root.join(", ")))
    }
}

pub fn content_trust(_t: &Target) -> CheckResult {
    let name = "4.5 Enable Content trust for Docker";
    if std::env::var("DOCKER_CONTENT_TRUST").as_deref() == Ok("1") {
        CheckResult::pass(name)
    } else {
        CheckResult::fail(name, "DOCKER_CONTENT_TRUST is not set to 1")
    }
}
