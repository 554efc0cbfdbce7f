use std::path::Path;

/// os-release locations, in lookup order
const OS_RELEASE_PATHS: [&str; 2] = ["/etc/os-release", "/usr/lib/os-release"];

/// Family reported when the distribution cannot be identified
const GENERIC_FAMILY: &str = "Linux";

/// Distribution IDs grouped by the family they belong to
const FAMILIES: &[(&str, &[&str])] = &[
    (
        "RedHat",
        &["rhel", "centos", "fedora", "rocky", "almalinux", "ol", "amzn", "scientific"],
    ),
    ("Debian", &["debian", "ubuntu", "linuxmint", "raspbian", "pop"]),
    (
        "Suse",
        &["suse", "sles", "opensuse", "opensuse-leap", "opensuse-tumbleweed"],
    ),
    ("Archlinux", &["arch", "manjaro", "endeavouros"]),
    ("Gentoo", &["gentoo"]),
    ("Alpine", &["alpine"]),
];

/// Detect the OS family from os-release
///
/// Falls back to "Linux" when no os-release file is readable.
pub fn os_family() -> String {
    for candidate in OS_RELEASE_PATHS {
        let path = Path::new(candidate);
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let family = family_from_os_release(&content);
                tracing::debug!("Detected OS family {} from {}", family, path.display());
                return family;
            }
            Err(e) => {
                tracing::debug!("Could not read {}: {}", path.display(), e);
            }
        }
    }

    GENERIC_FAMILY.to_string()
}

/// Map os-release content to an OS family
///
/// `ID` is checked first, then each `ID_LIKE` entry in order.
pub fn family_from_os_release(content: &str) -> String {
    let mut id = None;
    let mut id_like = None;

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            match key.trim() {
                "ID" => id = Some(value.to_lowercase()),
                "ID_LIKE" => id_like = Some(value.to_lowercase()),
                _ => {}
            }
        }
    }

    let candidates = id
        .iter()
        .map(String::as_str)
        .chain(id_like.iter().flat_map(|like| like.split_whitespace()));

    for candidate in candidates {
        if let Some(family) = family_for_id(candidate) {
            return family.to_string();
        }
    }

    GENERIC_FAMILY.to_string()
}

fn family_for_id(id: &str) -> Option<&'static str> {
    FAMILIES
        .iter()
        .find(|(_, ids)| ids.contains(&id))
        .map(|(family, _)| *family)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rhel_maps_to_redhat() {
        let content = "NAME=\"Red Hat Enterprise Linux\"\nID=\"rhel\"\nID_LIKE=\"fedora\"\n";
        assert_eq!(family_from_os_release(content), "RedHat");
    }

    #[test]
    fn ubuntu_maps_to_debian() {
        let content = "NAME=\"Ubuntu\"\nID=ubuntu\nID_LIKE=debian\nVERSION_ID=\"24.04\"\n";
        assert_eq!(family_from_os_release(content), "Debian");
    }

    #[test]
    fn unknown_id_falls_back_to_id_like() {
        let content = "ID=\"somederivative\"\nID_LIKE=\"rhel centos fedora\"\n";
        assert_eq!(family_from_os_release(content), "RedHat");
    }

    #[test]
    fn later_id_like_entries_are_considered() {
        let content = "ID=weird\nID_LIKE=\"unknown suse\"\n";
        assert_eq!(family_from_os_release(content), "Suse");
    }

    #[test]
    fn unrecognized_distribution_is_generic_linux() {
        assert_eq!(family_from_os_release("ID=nixos\n"), "Linux");
        assert_eq!(family_from_os_release(""), "Linux");
    }

    #[test]
    fn comments_are_ignored() {
        let content = "# ID=debian\nID=alpine\n";
        assert_eq!(family_from_os_release(content), "Alpine");
    }
}
