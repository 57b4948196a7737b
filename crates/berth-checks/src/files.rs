//! 3. Daemon file checks.
//!
//! Ownership and permission checks over the engine's unit files, config
//! directory, TLS material and socket. Files that cannot be found skip:
//! not every host carries every artifact.

use std::fs;
use std::path::Path;

use berth_core::CheckResult;
use berth_engine::Target;

use crate::helpers::{cert_path, file_owner, has_least_perms, lookup_file, user_ids};

/// Owner comparison against a reference user looked up on the target.
fn owner_check(name: &str, t: &Target, meta: &fs::Metadata, username: &str) -> CheckResult {
    let Some((ref_uid, ref_gid)) = user_ids(t, username) else {
        return CheckResult::skip(name, format!("User {username} not found on host"));
    };
    let (uid, gid) = file_owner(meta);
    if uid == ref_uid && gid == ref_gid {
        CheckResult::pass(name)
    } else {
        CheckResult::fail(name, format!("User/group owner should be {username}"))
    }
}

/// Permission comparison against a reference mode.
fn perms_check(name: &str, meta: &fs::Metadata, safe_perms: u32) -> CheckResult {
    let (is_least, mode) = has_least_perms(meta, safe_perms);
    if is_least {
        CheckResult::pass(name)
    } else {
        CheckResult::fail(
            name,
            format!("File has less restrictive permissions than expected: {mode:o}"),
        )
    }
}

/// Owner check over a file found on the systemd search path.
fn systemd_file_owner(name: &str, t: &Target, filename: &str) -> CheckResult {
    match lookup_file(t, filename) {
        Some((_, meta)) => owner_check(name, t, &meta, "root"),
        None => CheckResult::skip(name, "File could not be accessed"),
    }
}

/// Permission check over a file found on the systemd search path.
fn systemd_file_perms(name: &str, t: &Target, filename: &str, safe: u32) -> CheckResult {
    match lookup_file(t, filename) {
        Some((_, meta)) => perms_check(name, &meta, safe),
        None => CheckResult::skip(name, "File could not be accessed"),
    }
}

/// Owner check over a fixed host path.
fn path_owner(name: &str, t: &Target, path: &str) -> CheckResult {
    match fs::metadata(t.host_path(path)) {
        Ok(meta) => owner_check(name, t, &meta, "root"),
        Err(_) => CheckResult::skip(name, "File could not be accessed"),
    }
}

/// Permission check over a fixed host path.
fn path_perms(name: &str, t: &Target, path: &str, safe: u32) -> CheckResult {
    match fs::metadata(t.host_path(path)) {
        Ok(meta) => perms_check(name, &meta, safe),
        Err(_) => CheckResult::skip(name, "File could not be accessed"),
    }
}

/// Owner check over a TLS file referenced on the daemon command line.
fn tls_file_owner(name: &str, t: &Target, opt: &str) -> CheckResult {
    let Some(path) = cert_path(t, opt) else {
        return CheckResult::skip(name, format!("{opt} is not configured"));
    };
    match fs::metadata(&path) {
        Ok(meta) => owner_check(name, t, &meta, "root"),
        Err(_) => CheckResult::skip(name, "File could not be accessed"),
    }
}

/// Permission check over a TLS file referenced on the daemon command line.
fn tls_file_perms(name: &str, t: &Target, opt: &str, safe: u32) -> CheckResult {
    let Some(path) = cert_path(t, opt) else {
        return CheckResult::skip(name, format!("{opt} is not configured"));
    };
    match fs::metadata(&path) {
        Ok(meta) => perms_check(name, &meta, safe),
        Err(_) => CheckResult::skip(name, "File could not be accessed"),
    }
}

/// Files one level below each registry directory under certs.d.
fn registry_cert_files(certs_dir: &Path) -> Option<Vec<(std::path::PathBuf, fs::Metadata)>> {
    let registries = fs::read_dir(certs_dir).ok()?;
    let mut certs = Vec::new();
    for registry in registries.flatten() {
        let Ok(file_type) = registry.file_type() else { continue };
        if !file_type.is_dir() {
            continue;
        }
        let Ok(entries) = fs::read_dir(registry.path()) else { continue };
        for entry in entries.flatten() {
            if let Ok(meta) = entry.metadata() {
                certs.push((entry.path(), meta));
            }
        }
    }
    Some(certs)
}

pub fn service_owner(t: &Target) -> CheckResult {
    systemd_file_owner(
        "3.1 Verify that docker.service file ownership is set to root:root",
        t,
        "docker.service",
    )
}

pub fn service_perms(t: &Target) -> CheckResult {
    systemd_file_perms(
        "3.2 Verify that docker.service file permissions are set to 644 or more restrictive",
        t,
        "docker.service",
        0o644,
    )
}

pub fn socket_unit_owner(t: &Target) -> CheckResult {
    systemd_file_owner(
        "3.3 Verify that docker.socket file ownership is set to root:root",
        t,
        "docker.socket",
    )
}

pub fn socket_unit_perms(t: &Target) -> CheckResult {
    systemd_file_perms(
        "3.4 Verify that docker.socket file permissions are set to 644 or more restrictive",
        t,
        "docker.socket",
        0o644,
    )
}

pub fn docker_dir_owner(t: &Target) -> CheckResult {
    path_owner(
        "3.5 Verify that /etc/docker directory ownership is set to root:root",
        t,
        "/etc/docker",
    )
}

pub fn docker_dir_perms(t: &Target) -> CheckResult {
    path_perms(
        "3.6 Verify that /etc/docker directory permissions are set to 755 or more restrictive",
        t,
        "/etc/docker",
        0o755,
    )
}

pub fn registry_certs_owner(t: &Target) -> CheckResult {
    let name = "3.7 Verify that registry certificate file ownership is set to root:root";
    let Some((ref_uid, ref_gid)) = user_ids(t, "root") else {
        return CheckResult::skip(name, "User root not found on host");
    };
    let Some(certs) = registry_cert_files(&t.host_path("/etc/docker/certs.d")) else {
        return CheckResult::info(name, "Directory is inaccessible");
    };

    let bad: Vec<String> = certs
        .iter()
        .filter(|(_, meta)| file_owner(meta) != (ref_uid, ref_gid))
        .map(|(path, _)| path.display().to_string())
        .collect();

    if bad.is_empty() {
        CheckResult::pass(name)
    } else {
        CheckResult::fail(
            name,
            format!("Certificate files do not have root as owner: {}", bad.join(", ")),
        )
    }
}

pub fn registry_certs_perms(t: &Target) -> CheckResult {
    let name = "3.8 Verify that registry certificate file permissions are set to 444 or more restrictive";
    let Some(certs) = registry_cert_files(&t.host_path("/etc/docker/certs.d")) else {
        return CheckResult::info(name, "Directory is inaccessible");
    };

    let bad: Vec<String> = certs
        .iter()
        .filter(|(_, meta)| !has_least_perms(meta, 0o444).0)
        .map(|(path, _)| path.display().to_string())
        .collect();

    if bad.is_empty() {
        CheckResult::pass(name)
    } else {
        CheckResult::fail(
            name,
            format!(
                "Certificate files do not have required permissions: {}",
                bad.join(", ")
            ),
        )
    }
}

pub fn ca_cert_owner(t: &Target) -> CheckResult {
    tls_file_owner(
        "3.9 Verify that TLS CA certificate file ownership is set to root:root",
        t,
        "--tlscacert",
    )
}

pub fn ca_cert_perms(t: &Target) -> CheckResult {
    tls_file_perms(
        "3.10 Verify that TLS CA certificate file permissions are set to 444 or more restrictive",
        t,
        "--tlscacert",
        0o444,
    )
}

pub fn server_cert_owner(t: &Target) -> CheckResult {
    tls_file_owner(
        "3.11 Verify that Docker server certificate file ownership is set to root:root",
        t,
        "--tlscert",
    )
}

pub fn server_cert_perms(t: &Target) -> CheckResult {
    tls_file_perms(
        "3.12 Verify that Docker server certificate file permissions are set to 444 or more restrictive",
        t,
        "--tlscert",
        0o444,
    )
}

pub fn cert_key_owner(t: &Target) -> CheckResult {
    tls_file_owner(
        "3.13 Verify that Docker server key file ownership is set to root:root",
        t,
        "--tlskey",
    )
}

pub fn cert_key_perms(t: &Target) -> CheckResult {
    tls_file_perms(
        "3.14 Verify that Docker server key file permissions are set to 400",
        t,
        "--tlskey",
        0o400,
    )
}

pub fn docker_sock_owner(t: &Target) -> CheckResult {
    path_owner(
        "3.15 Verify that Docker socket file ownership is set to root:docker",
        t,
        "/var/run/docker.sock",
    )
}

pub fn docker_sock_perms(t: &Target) -> CheckResult {
    path_perms(
        "3.16 Verify that Docker socket file permissions are set to 660 or more restrictive",
        t,
        "/var/run/docker.sock",
        0o660,
    )
}

pub fn daemon_json_owner(t: &Target) -> CheckResult {
    path_owner(
        "3.17 Verify that daemon.json file ownership is set to root:root",
        t,
        "/etc/docker/daemon.json",
    )
}

pub fn daemon_json_perms(t: &Target) -> CheckResult {
    path_perms(
        "3.18 Verify that daemon.json file permissions are set to 644 or more restrictive",
        t,
        "/etc/docker/daemon.json",
        0o644,
    )
}

pub fn docker_default_owner(t: &Target) -> CheckResult {
    path_owner(
        "3.19 Verify that /etc/default/docker file ownership is set to root:root",
        t,
        "/etc/default/docker",
    )
}

pub fn docker_default_perms(t: &Target) -> CheckResult {
    path_perms(
        "3.20 Verify that /etc/default/docker file permissions are set to 644 or more restrictive",
        t,
        "/etc/default/docker",
        0o644,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use berth_core::CheckStatus;
    use std::os::unix::fs::PermissionsExt;

    /// Fixture tree with /etc/passwd and a systemd unit dir.
    fn fixture() -> (tempfile::TempDir, Target) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("etc/systemd/system")).unwrap();
        // Reference the test runner's own uid/gid as "root" so owner
        // checks pass against files the test just created.
        let meta = std::fs::metadata(dir.path()).unwrap();
        std::fs::write(
            dir.path().join("etc/passwd"),
            format!(
                "root:x:{}:{}:root:/root:/bin/bash\n",
                std::os::unix::fs::MetadataExt::uid(&meta),
                std::os::unix::fs::MetadataExt::gid(&meta)
            ),
        )
        .unwrap();

        let target = Target {
            base_dir: dir.path().to_path_buf(),
            ..Target::default()
        };
        (dir, target)
    }

    fn write_unit(dir: &tempfile::TempDir, name: &str, mode: u32) {
        let path = dir.path().join("etc/systemd/system").join(name);
        std::fs::write(&path, "[Unit]\n").unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(mode);
        std::fs::set_permissions(&path, perms).unwrap();
    }

    #[test]
    fn test_service_perms_pass_and_fail() {
        let (dir, target) = fixture();
        write_unit(&dir, "docker.service", 0o644);
        assert_eq!(service_perms(&target).status, CheckStatus::Pass);

        write_unit(&dir, "docker.service", 0o666);
        let res = service_perms(&target);
        assert_eq!(res.status, CheckStatus::Warn);
        assert!(res.output.contains("666"));
    }

    #[test]
    fn test_service_owner_pass() {
        let (dir, target) = fixture();
        write_unit(&dir, "docker.service", 0o644);
        assert_eq!(service_owner(&target).status, CheckStatus::Pass);
    }

    #[test]
    fn test_missing_unit_skips() {
        let (_dir, target) = fixture();
        assert_eq!(service_owner(&target).status, CheckStatus::Skip);
        assert_eq!(socket_unit_perms(&target).status, CheckStatus::Skip);
    }

    #[test]
    fn test_tls_files_skip_when_unconfigured() {
        let (_dir, target) = fixture();
        let res = ca_cert_owner(&target);
        assert_eq!(res.status, CheckStatus::Skip);
        assert!(res.output.contains("--tlscacert"));
    }

    #[test]
    fn test_tls_key_perms_from_cmdline() {
        let (dir, mut target) = fixture();
        let key = dir.path().join("server-key.pem");
        std::fs::write(&key, "key").unwrap();
        let mut perms = std::fs::metadata(&key).unwrap().permissions();
        perms.set_mode(0o400);
        std::fs::set_permissions(&key, perms).unwrap();

        target.daemon_cmdline = vec![
            "dockerd".to_string(),
            "--tlskey=/server-key.pem".to_string(),
        ];
        assert_eq!(cert_key_perms(&target).status, CheckStatus::Pass);
    }

    #[test]
    fn test_registry_certs_inaccessible_is_info() {
        let (_dir, target) = fixture();
        assert_eq!(registry_certs_owner(&target).status, CheckStatus::Info);
        assert_eq!(registry_certs_perms(&target).status, CheckStatus::Info);
    }

    #[test]
    fn test_registry_certs_perms_flags_loose_files() {
        let (dir, target) = fixture();
        let reg = dir.path().join("etc/docker/certs.d/registry.local");
        std::fs::create_dir_all(&reg).unwrap();
        let cert = reg.join("ca.crt");
        std::fs::write(&cert, "cert").unwrap();
        let mut perms = std::fs::metadata(&cert).unwrap().permissions();
        perms.set_mode(0o666);
        std::fs::set_permissions(&cert, perms).unwrap();

        let res = registry_certs_perms(&target);
        assert_eq!(res.status, CheckStatus::Warn);
        assert!(res.output.contains("ca.crt"));
    }
}
