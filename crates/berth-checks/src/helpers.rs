//! Shared helpers for the check catalog: host-file lookups, permission
//! and ownership comparison, daemon command-line inspection, auditd rule
//! queries, and lenient version comparison.

use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;
use std::process::Command;

use berth_core::CheckResult;
use berth_engine::{ContainerDetail, Target};

/// Directories searched for systemd unit and engine config files,
/// in lookup order.
pub const SYSTEMD_PATHS: &[&str] = &[
    "/usr/lib/systemd/system",
    "/lib/systemd/system",
    "/etc/systemd/system",
    "/etc/sysconfig",
    "/etc/default",
    "/etc/docker",
];

/// Search the systemd paths (under the target's base dir) for a file.
pub fn lookup_file(target: &Target, filename: &str) -> Option<(PathBuf, fs::Metadata)> {
    for dir in SYSTEMD_PATHS {
        let path = target.host_path(dir).join(filename);
        if let Ok(meta) = fs::metadata(&path) {
            return Some((path, meta));
        }
    }
    None
}

/// Whether the file mode is at least as restrictive as `safe_perms`.
/// Returns the comparison outcome and the observed permission bits.
pub fn has_least_perms(meta: &fs::Metadata, safe_perms: u32) -> (bool, u32) {
    let mode = meta.mode() & 0o777;
    (mode <= safe_perms, mode)
}

/// Numeric owner of a file.
pub fn file_owner(meta: &fs::Metadata) -> (u32, u32) {
    (meta.uid(), meta.gid())
}

/// Resolve a username to `(uid, gid)` from the target's `/etc/passwd`.
pub fn user_ids(target: &Target, username: &str) -> Option<(u32, u32)> {
    let content = fs::read_to_string(target.host_path("/etc/passwd")).ok()?;
    for line in content.lines() {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.first() == Some(&username) && fields.len() > 3 {
            let uid = fields[2].parse().ok()?;
            let gid = fields[3].parse().ok()?;
            return Some((uid, gid));
        }
    }
    None
}

/// Members of a group from the target's `/etc/group`.
pub fn group_members(target: &Target, groupname: &str) -> Option<Vec<String>> {
    let content = fs::read_to_string(target.host_path("/etc/group")).ok()?;
    for line in content.lines() {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.first() == Some(&groupname) {
            let members = fields
                .last()
                .map(|m| {
                    m.split(',')
                        .map(str::trim)
                        .filter(|u| !u.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            return Some(members);
        }
    }
    Some(Vec::new())
}

/// Whether the daemon command line contains an option, and its `=` value
/// when present.
pub fn daemon_opt(target: &Target, opt: &str) -> Option<String> {
    for arg in &target.daemon_cmdline {
        if arg.contains(opt) {
            let val = arg
                .split_once('=')
                .map(|(_, v)| v.trim_matches('"').trim().to_string())
                .unwrap_or_default();
            return Some(val);
        }
    }
    None
}

/// Path configured by a daemon TLS option (e.g. `--tlscacert`).
pub fn cert_path(target: &Target, opt: &str) -> Option<PathBuf> {
    daemon_opt(target, opt).and_then(|val| {
        if val.is_empty() {
            None
        } else {
            Some(target.host_path(&val))
        }
    })
}

/// Outcome of querying the auditd rule list.
pub enum AuditdRule {
    /// The rule is loaded.
    Present,
    /// The rule list was readable but the rule is absent.
    Absent,
    /// auditctl missing or unqueryable; checks should skip.
    Unavailable(String),
}

/// Query `auditctl -l` for a rule mentioning `path`.
pub fn check_audit_rule(path: &str) -> AuditdRule {
    let Ok(auditctl) = which::which("auditctl") else {
        return AuditdRule::Unavailable("auditctl not found".to_string());
    };

    let output = match Command::new(auditctl).arg("-l").output() {
        Ok(out) if out.status.success() => out,
        Ok(out) => {
            return AuditdRule::Unavailable(format!(
                "auditctl -l failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            ));
        }
        Err(e) => return AuditdRule::Unavailable(format!("cannot run auditctl: {e}")),
    };

    let listing = String::from_utf8_lossy(&output.stdout);
    if listing.lines().any(|line| line.trim().contains(path)) {
        AuditdRule::Present
    } else {
        AuditdRule::Absent
    }
}

/// Lenient version comparison: `found >= minimum`.
///
/// Versions are normalized to three dotted numeric segments before
/// `semver` parsing, so kernel strings like `3.10` or `5.15.0-91-generic`
/// compare cleanly. `None` when either side is unparseable.
pub fn version_at_least(found: &str, minimum: &str) -> Option<bool> {
    let found = parse_lenient(found)?;
    let minimum = parse_lenient(minimum)?;
    Some(found >= minimum)
}

fn parse_lenient(version: &str) -> Option<semver::Version> {
    // Keep the leading dotted-numeric run, dropping suffixes such as
    // `-91-generic` or `+deb11`.
    let numeric: String = version
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let mut parts: Vec<&str> = numeric.split('.').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        return None;
    }
    while parts.len() < 3 {
        parts.push("0");
    }
    semver::Version::parse(&parts[..3].join(".")).ok()
}

/// TCP ports in LISTEN state on the host, from `/proc/net/tcp{,6}`.
pub fn listening_tcp_ports() -> Result<Vec<u16>, String> {
    let mut ports = Vec::new();
    let mut entries = procfs::net::tcp().map_err(|e| e.to_string())?;
    if let Ok(v6) = procfs::net::tcp6() {
        entries.extend(v6);
    }
    for entry in entries {
        if entry.state == procfs::net::TcpState::Listen {
            ports.push(entry.local_address.port());
        }
    }
    ports.sort_unstable();
    ports.dedup();
    Ok(ports)
}

/// Run a predicate over every running container and report the ones that
/// fail it. Skips when no containers are running.
pub fn run_container_check(
    name: &str,
    target: &Target,
    predicate: impl Fn(&ContainerDetail) -> bool,
    msg: &str,
) -> CheckResult {
    if !target.containers.running() {
        return CheckResult::skip(name, "No running containers");
    }

    let bad: Vec<&str> = target
        .containers
        .iter()
        .filter(|c| !predicate(&c.detail))
        .map(|c| c.id.as_str())
        .collect();

    if bad.is_empty() {
        CheckResult::pass(name)
    } else {
        CheckResult::fail(name, format!("{msg}: {}", bad.join(", ")))
    }
}
