//! 6. Security operations checks.

use berth_core::CheckResult;
use berth_engine::Target;

/// Image count above which sprawl is reported regardless of usage.
const IMAGE_SPRAWL_LIMIT: usize = 100;

/// Stopped-container surplus above which sprawl is reported.
const CONTAINER_SPRAWL_LIMIT: usize = 25;

pub fn image_sprawl(t: &Target) -> CheckResult {
    let name = "6.4 Avoid image sprawl";
    if t.images.is_empty() {
        return CheckResult::skip(name, "Unable to retrieve image list");
    }

    let total = t.images.len();
    let in_use = t
        .all_containers
        .iter()
        .map(|c| c.image.as_str())
        .collect::<std::collections::HashSet<_>>()
        .len();

    if total > IMAGE_SPRAWL_LIMIT {
        CheckResult::fail(name, format!("There are currently {total} images"))
    } else if in_use < total / 2 {
        CheckResult::fail(name, format!("Only {in_use} out of {total} images are in use"))
    } else {
        CheckResult::pass(name)
    }
}

pub fn container_sprawl(t: &Target) -> CheckResult {
    let name = "6.5 Avoid container sprawl";
    if t.all_containers.is_empty() {
        return CheckResult::skip(name, "Unable to retrieve container list");
    }

    let total = t.all_containers.len();
    let running = t.containers.0.len();
    let stopped = total.saturating_sub(running);

    if stopped > CONTAINER_SPRAWL_LIMIT {
        CheckResult::fail(
            name,
            format!(
                "There are currently a total of {total} containers, with only {running} of them currently running"
            ),
        )
    } else {
        CheckResult::pass(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use berth_core::CheckStatus;
    use berth_engine::{Container, ContainerList, ContainerSummary, ImageSummary};

    #[test]
    fn test_image_sprawl_over_limit() {
        let target = Target {
            images: (0..150)
                .map(|i| ImageSummary {
                    id: format!("img{i}"),
                    repository: String::new(),
                })
                .collect(),
            all_containers: vec![ContainerSummary::default()],
            ..Target::default()
        };
        let res = image_sprawl(&target);
        assert_eq!(res.status, CheckStatus::Warn);
        assert!(res.output.contains("150"));
    }

    #[test]
    fn test_image_sprawl_mostly_unused() {
        let target = Target {
            images: (0..10)
                .map(|i| ImageSummary {
                    id: format!("img{i}"),
                    repository: String::new(),
                })
                .collect(),
            all_containers: vec![ContainerSummary {
                image: "img0".to_string(),
                ..ContainerSummary::default()
            }],
            ..Target::default()
        };
        assert_eq!(image_sprawl(&target).status, CheckStatus::Warn);
    }

    #[test]
    fn test_container_sprawl() {
        let stopped: Vec<ContainerSummary> = (0..30)
            .map(|i| ContainerSummary {
                id: format!("c{i}"),
                state: "exited".to_string(),
                ..ContainerSummary::default()
            })
            .collect();
        let target = Target {
            all_containers: stopped,
            containers: ContainerList(vec![Container::default()]),
            ..Target::default()
        };
        assert_eq!(container_sprawl(&target).status, CheckStatus::Warn);
    }

    #[test]
    fn test_sprawl_checks_skip_without_data() {
        let target = Target::default();
        assert_eq!(image_sprawl(&target).status, CheckStatus::Skip);
        assert_eq!(container_sprawl(&target).status, CheckStatus::Skip);
    }
}
