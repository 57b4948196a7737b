//! 5. Container runtime checks.
//!
//! How each running container was started: namespaces, capabilities,
//! mounts, limits and confinement profiles. Every check here skips when
//! no containers are running.

use std::collections::HashMap;

use berth_core::CheckResult;
use berth_engine::Target;

use crate::helpers::run_container_check;

pub fn apparmor_profile(t: &Target) -> CheckResult {
    run_container_check(
        "5.1 Verify AppArmor Profile, if applicable",
        t,
        |c| !c.apparmor().is_empty(),
        "Containers with no AppArmor profile",
    )
}

pub fn selinux_options(t: &Target) -> CheckResult {
    run_container_check(
        "5.2 Verify SELinux security options, if applicable",
        t,
        |c| c.selinux().is_some(),
        "Containers with no SELinux options",
    )
}

pub fn kernel_capabilities(t: &Target) -> CheckResult {
    run_container_check(
        "5.3 Restrict Linux Kernel Capabilities within containers",
        t,
        |c| c.kernel_capabilities().map_or(true, <[String]>::is_empty),
        "Containers running with added capabilities",
    )
}

pub fn privileged_containers(t: &Target) -> CheckResult {
    run_container_check(
        "5.4 Do not use privileged containers",
        t,
        |c| !c.privileged(),
        "Privileged containers found",
    )
}

/// Host directories no container should mount read-write.
const SENSITIVE_DIRS: &[&str] = &["/dev", "/etc", "/lib", "/proc", "/sys", "/usr"];

pub fn sensitive_dirs(t: &Target) -> CheckResult {
    run_container_check(
        "5.5 Do not mount sensitive host system directories on containers",
        t,
        |c| {
            !c.mounts.iter().any(|m| {
                m.rw && SENSITIVE_DIRS.iter().any(|dir| m.source.starts_with(dir))
            })
        },
        "Sensitive directories mounted on containers",
    )
}

pub fn ssh_running(t: &Target) -> CheckResult {
    let name = "5.6 Do not run ssh within containers";
    if !t.containers.running() {
        return CheckResult::skip(name, "No running containers");
    }

    let bad: Vec<&str> = t
        .containers
        .iter()
        .filter(|c| {
            t.container_procs.get(&c.id).is_some_and(|procs| {
                procs
                    .iter()
                    .any(|row| row.last().is_some_and(|cmd| cmd.contains("ssh")))
            })
        })
        .map(|c| c.id.as_str())
        .collect();

    if bad.is_empty() {
        CheckResult::pass(name)
    } else {
        CheckResult::fail(
            name,
            format!("Containers running SSH service: {}", bad.join(", ")),
        )
    }
}

pub fn privileged_ports(t: &Target) -> CheckResult {
    run_container_check(
        "5.7 Do not map privileged ports within containers",
        t,
        |c| {
            !c.network_settings
                .ports
                .values()
                .flatten()
                .flatten()
                .any(|binding| {
                    binding
                        .host_port
                        .parse::<u16>()
                        .is_ok_and(|port| port < 1024)
                })
        },
        "Containers with mapped privileged ports",
    )
}

pub fn needed_ports(t: &Target) -> CheckResult {
    let name = "5.8 Open only needed ports on container";
    if !t.containers.running() {
        return CheckResult::skip(name, "No running containers");
    }

    let mut container_ports: HashMap<&str, Vec<&str>> = HashMap::new();
    for container in &t.containers {
        for port in container.detail.network_settings.ports.keys() {
            container_ports
                .entry(container.id.as_str())
                .or_default()
                .push(port);
        }
    }
    CheckResult::info(name, format!("Containers with open ports: {container_ports:?}"))
}

pub fn host_net_mode(t: &Target) -> CheckResult {
    run_container_check(
        "5.9 Do not use host network mode on container",
        t,
        |c| c.host_config.network_mode != "host",
        "Containers using host network mode",
    )
}

pub fn memory_usage(t: &Target) -> CheckResult {
    run_container_check(
        "5.10 Limit memory usage for container",
        t,
        |c| c.host_config.memory != 0,
        "Containers with no memory limits",
    )
}

pub fn cpu_shares(t: &Target) -> CheckResult {
    run_container_check(
        "5.11 Set container CPU priority appropriately",
        t,
        |c| {
            let shares = c.host_config.cpu_shares;
            shares != 0 && shares != 1024
        },
        "Containers with CPU sharing disabled",
    )
}

pub fn readonly_rootfs(t: &Target) -> CheckResult {
    run_container_check(
        "5.12 Mount container's root filesystem as read only",
        t,
        |c| c.host_config.readonly_rootfs,
        "Containers' root FS is not mounted as read-only",
    )
}

pub fn bind_specific_int(t: &Target) -> CheckResult {
    run_container_check(
        "5.13 Bind incoming container traffic to a specific host interface",
        t,
        |c| {
            !c.network_settings
                .ports
                .values()
                .flatten()
                .flatten()
                .any(|binding| binding.host_ip == "0.0.0.0")
        },
        "Containers traffic not bound to specific host interface",
    )
}

pub fn restart_policy(t: &Target) -> CheckResult {
    run_container_check(
        "5.14 Set the 'on-failure' container restart policy to 5",
        t,
        |c| {
            let policy = &c.host_config.restart_policy;
            policy.name == "on-failure" && policy.maximum_retry_count <= 5
        },
        "Containers without a bounded on-failure restart policy",
    )
}

pub fn host_namespace(t: &Target) -> CheckResult {
    run_container_check(
        "5.15 Do not share the host's process namespace",
        t,
        |c| c.host_config.pid_mode != "host",
        "Containers sharing host's process namespace",
    )
}

pub fn ipc_namespace(t: &Target) -> CheckResult {
    run_container_check(
        "5.16 Do not share the host's IPC namespace",
        t,
        |c| c.host_config.ipc_mode != "host",
        "Containers sharing host's IPC namespace",
    )
}

pub fn host_devices(t: &Target) -> CheckResult {
    run_container_check(
        "5.17 Do not directly expose host devices to containers",
        t,
        |c| c.host_config.devices.as_ref().map_or(true, |d| d.is_empty()),
        "Host devices exposed to containers",
    )
}

pub fn override_ulimit(t: &Target) -> CheckResult {
    run_container_check(
        "5.18 Override default ulimit at runtime only if needed",
        t,
        |c| c.host_config.ulimits.as_ref().map_or(true, |u| u.is_empty()),
        "Containers overriding default ulimit",
    )
}

pub fn mount_propagation(t: &Target) -> CheckResult {
    run_container_check(
        "5.19 Do not set mount propagation mode to shared",
        t,
        |c| !c.mounts.iter().any(|m| m.propagation == "shared"),
        "Containers with mount propagation set to shared",
    )
}

pub fn uts_namespace(t: &Target) -> CheckResult {
    run_container_check(
        "5.20 Do not share the host's UTS namespace",
        t,
        |c| c.host_config.uts_mode != "host",
        "Containers sharing host's UTS namespace",
    )
}

pub fn seccomp_profile(t: &Target) -> CheckResult {
    run_container_check(
        "5.21 Do not disable default seccomp profile",
        t,
        |c| {
            !c.selinux()
                .unwrap_or_default()
                .iter()
                .any(|opt| opt == "seccomp:unconfined" || opt == "seccomp=unconfined")
        },
        "Containers running with seccomp disabled",
    )
}

pub fn cgroup_usage(t: &Target) -> CheckResult {
    run_container_check(
        "5.24 Confirm cgroup usage",
        t,
        |c| c.host_config.cgroup_parent.is_empty(),
        "Containers not using the default cgroup",
    )
}

pub fn add_privs(t: &Target) -> CheckResult {
    run_container_check(
        "5.25 Restrict container from acquiring additional privileges",
        t,
        |c| {
            c.selinux()
                .unwrap_or_default()
                .iter()
                .any(|opt| opt == "no-new-privileges" || opt == "no-new-privileges:true")
        },
        "Containers unrestricted from acquiring additional privileges",
    )
}
