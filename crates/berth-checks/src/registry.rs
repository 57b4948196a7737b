//! The check registry: an immutable map from check name to callable.
//!
//! "The check name is the API": profiles reference checks by these keys
//! and nothing else. The registry is built once at startup and passed by
//! reference into the runner; there is no global registry.

use std::collections::HashMap;

use berth_core::CheckResult;
use berth_engine::Target;

use crate::{daemon, files, host, images, runtime, secops};

/// A compiled check: a pure function of the target snapshot.
pub type CheckFn = fn(&Target) -> CheckResult;

/// Immutable name → check mapping.
#[derive(Debug, Clone)]
pub struct Registry {
    checks: HashMap<&'static str, CheckFn>,
}

impl Registry {
    /// Build a registry from explicit entries (test seam).
    #[must_use]
    pub fn from_entries(entries: &[(&'static str, CheckFn)]) -> Self {
        Self {
            checks: entries.iter().copied().collect(),
        }
    }

    /// The full built-in catalog.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn builtin() -> Self {
        let entries: &[(&'static str, CheckFn)] = &[
            // Host configuration
            ("kernel_version", host::kernel_version),
            ("separate_partition", host::separate_partition),
            ("running_services", host::running_services),
            ("server_version", host::server_version),
            ("trusted_users", host::trusted_users),
            ("audit_daemon", host::audit_daemon),
            ("audit_lib", host::audit_lib),
            ("audit_etc", host::audit_etc),
            ("audit_service", host::audit_service),
            ("audit_socket", host::audit_socket),
            ("audit_default", host::audit_default),
            ("audit_daemonjson", host::audit_daemonjson),
            ("audit_containerd", host::audit_containerd),
            ("audit_runc", host::audit_runc),
            // Daemon files
            ("docker.service_perms", files::service_perms),
            ("docker.service_owner", files::service_owner),
            ("docker.socket_owner", files::socket_unit_owner),
            ("docker.socket_perms", files::socket_unit_perms),
            ("dockerdir_owner", files::docker_dir_owner),
            ("dockerdir_perms", files::docker_dir_perms),
            ("registrycerts_owner", files::registry_certs_owner),
            ("registrycerts_perms", files::registry_certs_perms),
            ("cacert_owner", files::ca_cert_owner),
            ("cacert_perms", files::ca_cert_perms),
            ("servercert_owner", files::server_cert_owner),
            ("servercert_perms", files::server_cert_perms),
            ("certkey_owner", files::cert_key_owner),
            ("certkey_perms", files::cert_key_perms),
            ("socket_owner", files::docker_sock_owner),
            ("socket_perms", files::docker_sock_perms),
            ("daemonjson_owner", files::daemon_json_owner),
            ("daemonjson_perms", files::daemon_json_perms),
            ("dockerdef_owner", files::docker_default_owner),
            ("dockerdef_perms", files::docker_default_perms),
            // Daemon configuration
            ("net_traffic", daemon::net_traffic),
            ("logging_level", daemon::logging_level),
            ("allow_iptables", daemon::allow_iptables),
            ("insecure_registry", daemon::insecure_registry),
            ("aufs_driver", daemon::aufs_driver),
            ("tls_auth", daemon::tls_auth),
            ("default_ulimit", daemon::default_ulimit),
            ("user_namespace", daemon::user_namespace),
            ("default_cgroup", daemon::default_cgroup),
            ("device_size", daemon::device_size),
            ("auth_plugin", daemon::auth_plugin),
            ("central_logging", daemon::central_logging),
            ("legacy_registry", daemon::legacy_registry),
            // Container images
            ("root_containers", images::root_containers),
            ("content_trust", images::content_trust),
            // Container runtime
            ("apparmor_profile", runtime::apparmor_profile),
            ("selinux_options", runtime::selinux_options),
            ("kernel_capabilities", runtime::kernel_capabilities),
            ("privileged_containers", runtime::privileged_containers),
            ("sensitive_dirs", runtime::sensitive_dirs),
            ("ssh_running", runtime::ssh_running),
            ("privileged_ports", runtime::privileged_ports),
            ("needed_ports", runtime::needed_ports),
            ("host_net_mode", runtime::host_net_mode),
            ("memory_usage", runtime::memory_usage),
            ("cpu_shares", runtime::cpu_shares),
            ("readonly_rootfs", runtime::readonly_rootfs),
            ("bind_specific_int", runtime::bind_specific_int),
            ("restart_policy", runtime::restart_policy),
            ("host_namespace", runtime::host_namespace),
            ("ipc_namespace", runtime::ipc_namespace),
            ("host_devices", runtime::host_devices),
            ("override_ulimit", runtime::override_ulimit),
            ("mount_propagation", runtime::mount_propagation),
            ("uts_namespace", runtime::uts_namespace),
            ("seccomp_profile", runtime::seccomp_profile),
            ("cgroup_usage", runtime::cgroup_usage),
            ("add_privs", runtime::add_privs),
            // Security operations
            ("image_sprawl", secops::image_sprawl),
            ("container_sprawl", secops::container_sprawl),
        ];
        Self::from_entries(entries)
    }

    /// Look up a check by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<CheckFn> {
        self.checks.get(name).copied()
    }

    /// Whether a name resolves.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    /// All registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.checks.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_size() {
        let registry = Registry::builtin();
        assert_eq!(registry.len(), 74);
    }

    #[test]
    fn test_known_names_resolve() {
        let registry = Registry::builtin();
        for name in [
            "kernel_version",
            "docker.service_perms",
            "net_traffic",
            "root_containers",
            "apparmor_profile",
            "container_sprawl",
        ] {
            assert!(registry.contains(name), "missing {name}");
        }
    }

    #[test]
    fn test_unknown_name_does_not_resolve() {
        let registry = Registry::builtin();
        assert!(!registry.contains("typo_check"));
        assert!(registry.get("typo_check").is_none());
    }

    #[test]
    fn test_names_are_sorted_and_unique() {
        let registry = Registry::builtin();
        let names = registry.names();
        let mut deduped = names.clone();
        deduped.dedup();
        assert_eq!(names, deduped);
        assert!(names.windows(2).all(|w| w[0] < w[1]));
    }
}
