//! 1. Host configuration checks.
//!
//! Recommendations for the machine running the engine: kernel and engine
//! versions, partitioning, daemon access, and auditd coverage of the
//! engine's files and binaries.

use berth_core::CheckResult;
use berth_engine::Target;

use crate::helpers::{
    check_audit_rule, group_members, listening_tcp_ports, version_at_least, AuditdRule,
};

/// Minimum kernel supported by the engine.
const MIN_KERNEL_VERSION: &str = "3.10";

/// Minimum engine release considered current.
const MIN_ENGINE_VERSION: &str = "17.06.0";

pub fn separate_partition(t: &Target) -> CheckResult {
    let name = "1.1 Create a separate partition for containers";
    let fstab = t.host_path("/etc/fstab");
    let Ok(content) = std::fs::read_to_string(&fstab) else {
        return CheckResult::skip(name, "Cannot read /etc/fstab");
    };

    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.get(1) == Some(&"/var/lib/docker") {
            return CheckResult::pass(name);
        }
    }
    CheckResult::fail(name, "Containers not in a separate partition")
}

pub fn kernel_version(t: &Target) -> CheckResult {
    let name = "1.2 Use the updated Linux Kernel";
    match version_at_least(&t.info.kernel_version, MIN_KERNEL_VERSION) {
        Some(true) => CheckResult::pass(name),
        Some(false) => CheckResult::fail(
            name,
            format!("Host is not using an updated kernel: {}", t.info.kernel_version),
        ),
        None => CheckResult::info(name, "Incompatible kernel version reported"),
    }
}

pub fn running_services(_t: &Target) -> CheckResult {
    let name = "1.5 Remove all non-essential services from the host";
    match listening_tcp_ports() {
        Ok(ports) => CheckResult::info(
            name,
            format!("Host listening on {} TCP ports: {ports:?}", ports.len()),
        ),
        Err(e) => CheckResult::skip(name, format!("Cannot read listening sockets: {e}")),
    }
}

pub fn server_version(t: &Target) -> CheckResult {
    let name = "1.6 Keep Docker up to date";
    match version_at_least(&t.info.server_version, MIN_ENGINE_VERSION) {
        Some(true) => CheckResult::pass(name),
        Some(false) => CheckResult::fail(
            name,
            format!(
                "Host is using an outdated engine server: {}",
                t.info.server_version
            ),
        ),
        None => CheckResult::skip(name, "Engine server version unavailable"),
    }
}

pub fn trusted_users(t: &Target) -> CheckResult {
    let name = "1.7 Only allow trusted users to control Docker daemon";
    match group_members(t, "docker") {
        Some(users) => CheckResult::info(
            name,
            format!("The following users control the Docker daemon: {users:?}"),
        ),
        None => CheckResult::skip(name, "Cannot read /etc/group"),
    }
}

/// Shared shape of the auditd coverage checks.
fn audit_rule(name: &str, path: &str) -> CheckResult {
    match check_audit_rule(path) {
        AuditdRule::Present => CheckResult::pass(name),
        AuditdRule::Absent => {
            CheckResult::fail(name, format!("No audit rule covers {path}"))
        }
        AuditdRule::Unavailable(reason) => CheckResult::skip(name, reason),
    }
}

pub fn audit_daemon(_t: &Target) -> CheckResult {
    audit_rule("1.8 Audit docker daemon", "/usr/bin/dockerd")
}

pub fn audit_lib(_t: &Target) -> CheckResult {
    audit_rule(
        "1.9 Audit Docker files and directories - /var/lib/docker",
        "/var/lib/docker",
    )
}

pub fn audit_etc(_t: &Target) -> CheckResult {
    audit_rule(
        "1.10 Audit Docker files and directories - /etc/docker",
        "/etc/docker",
    )
}

pub fn audit_service(_t: &Target) -> CheckResult {
    audit_rule(
        "1.11 Audit Docker files and directories - docker.service",
        "docker.service",
    )
}

pub fn audit_socket(_t: &Target) -> CheckResult {
    audit_rule(
        "1.12 Audit Docker files and directories - /var/run/docker.sock",
        "/var/run/docker.sock",
    )
}

pub fn audit_default(_t: &Target) -> CheckResult {
    audit_rule(
        "1.13 Audit Docker files and directories - /etc/default/docker",
        "/etc/default/docker",
    )
}

pub fn audit_daemonjson(_t: &Target) -> CheckResult {
    audit_rule(
        "1.14 Audit Docker files and directories - /etc/docker/daemon.json",
        "/etc/docker/daemon.json",
    )
}

pub fn audit_containerd(_t: &Target) -> CheckResult {
    audit_rule(
        "1.15 Audit Docker files and directories - containerd",
        "/usr/bin/containerd",
    )
}

pub fn audit_runc(_t: &Target) -> CheckResult {
    audit_rule(
        "1.16 Audit Docker files and directories - runc",
        "/usr/bin/runc",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use berth_core::CheckStatus;
    use berth_engine::DaemonInfo;
    use std::path::PathBuf;

    fn target_with_fstab(content: &str) -> (tempfile::TempDir, Target) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("etc")).unwrap();
        std::fs::write(dir.path().join("etc/fstab"), content).unwrap();
        let target = Target {
            base_dir: dir.path().to_path_buf(),
            ..Target::default()
        };
        (dir, target)
    }

    #[test]
    fn test_separate_partition_pass() {
        let (_dir, target) = target_with_fstab("/dev/sda2 /var/lib/docker ext4 defaults 0 0\n");
        assert_eq!(separate_partition(&target).status, CheckStatus::Pass);
    }

    #[test]
    fn test_separate_partition_fail() {
        let (_dir, target) = target_with_fstab("/dev/sda1 / ext4 defaults 0 0\n");
        assert_eq!(separate_partition(&target).status, CheckStatus::Warn);
    }

    #[test]
    fn test_separate_partition_missing_fstab_skips() {
        let target = Target {
            base_dir: PathBuf::from("/nonexistent-base"),
            ..Target::default()
        };
        assert_eq!(separate_partition(&target).status, CheckStatus::Skip);
    }

    #[test]
    fn test_kernel_version_outcomes() {
        let mut target = Target {
            info: DaemonInfo {
                kernel_version: "5.15.0-91-generic".to_string(),
                ..DaemonInfo::default()
            },
            ..Target::default()
        };
        assert_eq!(kernel_version(&target).status, CheckStatus::Pass);

        target.info.kernel_version = "2.6.32".to_string();
        assert_eq!(kernel_version(&target).status, CheckStatus::Warn);

        target.info.kernel_version = "weird".to_string();
        assert_eq!(kernel_version(&target).status, CheckStatus::Info);
    }

    #[test]
    fn test_server_version_outdated() {
        let target = Target {
            info: DaemonInfo {
                server_version: "1.12.6".to_string(),
                ..DaemonInfo::default()
            },
            ..Target::default()
        };
        let res = server_version(&target);
        assert_eq!(res.status, CheckStatus::Warn);
        assert!(res.output.contains("1.12.6"));
    }
}
