//! Typed views of engine CLI JSON output.
//!
//! Only the fields the check catalog reads are modeled; everything else
//! in the engine's output is ignored during deserialization.

use serde::Deserialize;
use std::collections::HashMap;

/// Daemon-level host information (`docker info`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DaemonInfo {
    /// Host kernel version string (e.g. `5.15.0-91-generic`).
    #[serde(rename = "KernelVersion", default)]
    pub kernel_version: String,

    /// Engine server version (e.g. `24.0.7`).
    #[serde(rename = "ServerVersion", default)]
    pub server_version: String,

    /// Storage driver in use (e.g. `overlay2`, `aufs`).
    #[serde(rename = "Driver", default)]
    pub driver: String,

    /// Daemon host name.
    #[serde(rename = "Name", default)]
    pub name: String,

    /// Host operating system description.
    #[serde(rename = "OperatingSystem", default)]
    pub operating_system: String,
}

/// One line of `container ls` output.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerSummary {
    /// Container id (may be truncated by the CLI).
    #[serde(rename = "ID", default)]
    pub id: String,

    /// Image reference the container was created from.
    #[serde(rename = "Image", default)]
    pub image: String,

    /// Container state (`running`, `exited`, ...).
    #[serde(rename = "State", default)]
    pub state: String,
}

/// One line of `image ls` output.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageSummary {
    /// Image id.
    #[serde(rename = "ID", default)]
    pub id: String,

    /// Repository name.
    #[serde(rename = "Repository", default)]
    pub repository: String,
}

/// Restart policy from a container's host configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestartPolicy {
    /// Policy name (`no`, `on-failure`, `always`, ...).
    #[serde(rename = "Name", default)]
    pub name: String,

    /// Retry bound for `on-failure`.
    #[serde(rename = "MaximumRetryCount", default)]
    pub maximum_retry_count: i64,
}

/// Host-side runtime configuration of a container (`inspect .HostConfig`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostConfig {
    /// Privileged mode flag.
    #[serde(rename = "Privileged", default)]
    pub privileged: bool,

    /// Kernel capabilities added over the default set.
    #[serde(rename = "CapAdd", default)]
    pub cap_add: Option<Vec<String>>,

    /// Security options (SELinux labels, seccomp, no-new-privileges).
    #[serde(rename = "SecurityOpt", default)]
    pub security_opt: Option<Vec<String>>,

    /// Network mode (`default`, `host`, ...).
    #[serde(rename = "NetworkMode", default)]
    pub network_mode: String,

    /// PID namespace mode.
    #[serde(rename = "PidMode", default)]
    pub pid_mode: String,

    /// IPC namespace mode.
    #[serde(rename = "IpcMode", default)]
    pub ipc_mode: String,

    /// UTS namespace mode.
    #[serde(rename = "UTSMode", default)]
    pub uts_mode: String,

    /// Memory limit in bytes (0 = unlimited).
    #[serde(rename = "Memory", default)]
    pub memory: i64,

    /// CPU shares (0 or 1024 = default weighting).
    #[serde(rename = "CpuShares", default)]
    pub cpu_shares: i64,

    /// Read-only root filesystem flag.
    #[serde(rename = "ReadonlyRootfs", default)]
    pub readonly_rootfs: bool,

    /// Restart policy.
    #[serde(rename = "RestartPolicy", default)]
    pub restart_policy: RestartPolicy,

    /// Host devices exposed to the container.
    #[serde(rename = "Devices", default)]
    pub devices: Option<Vec<serde_json::Value>>,

    /// Per-container ulimit overrides.
    #[serde(rename = "Ulimits", default)]
    pub ulimits: Option<Vec<serde_json::Value>>,

    /// Cgroup parent override.
    #[serde(rename = "CgroupParent", default)]
    pub cgroup_parent: String,
}

/// One mount point of a container.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Mount {
    /// Host-side source path.
    #[serde(rename = "Source", default)]
    pub source: String,

    /// Read-write flag.
    #[serde(rename = "RW", default)]
    pub rw: bool,

    /// Mount propagation mode (`rprivate`, `shared`, ...).
    #[serde(rename = "Propagation", default)]
    pub propagation: String,
}

/// A host port binding for an exposed container port.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortBinding {
    /// Host interface the port is bound to.
    #[serde(rename = "HostIp", default)]
    pub host_ip: String,

    /// Host port number as reported by the engine.
    #[serde(rename = "HostPort", default)]
    pub host_port: String,
}

/// Container configuration (`inspect .Config`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerConfig {
    /// User the container process runs as (empty = root).
    #[serde(rename = "User", default)]
    pub user: String,
}

/// Network settings (`inspect .NetworkSettings`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkSettings {
    /// Exposed port → host bindings (None when unpublished).
    #[serde(rename = "Ports", default)]
    pub ports: HashMap<String, Option<Vec<PortBinding>>>,
}

/// Full inspect output for one container.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerDetail {
    /// Full container id.
    #[serde(rename = "Id", default)]
    pub id: String,

    /// AppArmor profile applied to the container (empty = none).
    #[serde(rename = "AppArmorProfile", default)]
    pub app_armor_profile: String,

    /// Image id the container was created from.
    #[serde(rename = "Image", default)]
    pub image: String,

    /// Container configuration.
    #[serde(rename = "Config", default)]
    pub config: ContainerConfig,

    /// Host-side runtime configuration.
    #[serde(rename = "HostConfig", default)]
    pub host_config: HostConfig,

    /// Mount points.
    #[serde(rename = "Mounts", default)]
    pub mounts: Vec<Mount>,

    /// Network settings.
    #[serde(rename = "NetworkSettings", default)]
    pub network_settings: NetworkSettings,
}

impl ContainerDetail {
    /// AppArmor profile name, empty when unconfined.
    #[must_use]
    pub fn apparmor(&self) -> &str {
        &self.app_armor_profile
    }

    /// SELinux/security options, if any were set.
    #[must_use]
    pub fn selinux(&self) -> Option<&[String]> {
        self.host_config.security_opt.as_deref()
    }

    /// Kernel capabilities added over the default set.
    #[must_use]
    pub fn kernel_capabilities(&self) -> Option<&[String]> {
        self.host_config.cap_add.as_deref()
    }

    /// Whether the container runs privileged.
    #[must_use]
    pub const fn privileged(&self) -> bool {
        self.host_config.privileged
    }
}

/// Inspect output for one network.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkInfo {
    /// Network name (`bridge`, `host`, ...).
    #[serde(rename = "Name", default)]
    pub name: String,

    /// Driver-level options.
    #[serde(rename = "Options", default)]
    pub options: HashMap<String, String>,
}
