//! 2. Daemon configuration checks.
//!
//! Settings of the engine daemon itself, read from the bridge network
//! options and the daemon process command line. These affect every
//! container on the host.

use berth_core::CheckResult;
use berth_engine::Target;

use crate::helpers::daemon_opt;

pub fn net_traffic(t: &Target) -> CheckResult {
    let name = "2.1 Restrict network traffic between containers";
    if t.networks.is_empty() {
        return CheckResult::skip(name, "Cannot retrieve network list");
    }
    for network in &t.networks {
        if network.name == "bridge"
            && network
                .options
                .get("com.docker.network.bridge.enable_icc")
                .is_some_and(|v| v == "true")
        {
            return CheckResult::fail(name, "Inter-container communication is enabled");
        }
    }
    CheckResult::pass(name)
}

pub fn logging_level(t: &Target) -> CheckResult {
    let name = "2.2 Set the logging level";
    if let Some(level) = daemon_opt(t, "--log-level") {
        if level != "info" {
            return CheckResult::fail(name, "Daemon log level should be set to \"info\"");
        }
    }
    CheckResult::pass(name)
}

pub fn allow_iptables(t: &Target) -> CheckResult {
    let name = "2.3 Allow Docker to make changes to iptables";
    if let Some(val) = daemon_opt(t, "--iptables") {
        if val != "false" {
            return CheckResult::fail(name, "iptables is explicitly configured");
        }
    }
    CheckResult::pass(name)
}

pub fn insecure_registry(t: &Target) -> CheckResult {
    let name = "2.4 Do not use insecure registries";
    if daemon_opt(t, "--insecure-registry").is_some() {
        return CheckResult::fail(name, "Insecure registry configured");
    }
    CheckResult::pass(name)
}

pub fn aufs_driver(t: &Target) -> CheckResult {
    let name = "2.5 Do not use the aufs storage driver";
    if t.info.driver == "aufs" {
        CheckResult::fail(name, "aufs storage driver in use")
    } else {
        CheckResult::pass(name)
    }
}

pub fn tls_auth(t: &Target) -> CheckResult {
    let name = "2.6 Configure TLS authentication for Docker daemon";
    let missing: Vec<&str> = ["--tlsverify", "--tlscacert", "--tlscert", "--tlskey"]
        .into_iter()
        .filter(|opt| daemon_opt(t, opt).is_none())
        .collect();

    if missing.is_empty() {
        CheckResult::pass(name)
    } else {
        CheckResult::fail(
            name,
            format!("TLS configuration is missing options: {}", missing.join(", ")),
        )
    }
}

pub fn default_ulimit(t: &Target) -> CheckResult {
    let name = "2.7 Set default ulimit as appropriate";
    if daemon_opt(t, "--default-ulimit").is_some() {
        CheckResult::pass(name)
    } else {
        CheckResult::fail(name, "Default ulimit doesn't appear to be set")
    }
}

pub fn user_namespace(t: &Target) -> CheckResult {
    let name = "2.8 Enable user namespace support";
    if daemon_opt(t, "--userns-remap").is_some() {
        CheckResult::pass(name)
    } else {
        CheckResult::fail(name, "User namespace support is not enabled")
    }
}

pub fn default_cgroup(t: &Target) -> CheckResult {
    let name = "2.9 Confirm default cgroup usage";
    if daemon_opt(t, "--cgroup-parent").is_some() {
        CheckResult::pass(name)
    } else {
        CheckResult::fail(name, "Default cgroup is not used")
    }
}

pub fn device_size(t: &Target) -> CheckResult {
    let name = "2.10 Do not change base device size until needed";
    if daemon_opt(t, "dm.basesize").is_some() {
        CheckResult::fail(name, "Base device size has been changed")
    } else {
        CheckResult::pass(name)
    }
}

pub fn auth_plugin(t: &Target) -> CheckResult {
    let name = "2.11 Use authorization plugin";
    if daemon_opt(t, "--authorization-plugin").is_some() {
        CheckResult::pass(name)
    } else {
        CheckResult::fail(name, "No authorization plugin configured")
    }
}

pub fn central_logging(t: &Target) -> CheckResult {
    let name = "2.12 Configure centralized and remote logging";
    if daemon_opt(t, "--log-driver").is_some() {
        CheckResult::pass(name)
    } else {
        CheckResult::fail(name, "No remote log driver configured")
    }
}

pub fn legacy_registry(t: &Target) -> CheckResult {
    let name = "2.13 Disable operations on legacy registry (v1)";
    if daemon_opt(t, "--disable-legacy-registry").is_some() {
        CheckResult::pass(name)
    } else {
        CheckResult::fail(name, "Legacy registry operations are not disabled")
    }
}
