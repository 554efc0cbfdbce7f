pub mod common;

#[cfg(target_os = "linux")]
mod linux;

/// Source of the OS family fact used to pick the props.conf location
pub trait FactSource {
    fn os_family(&self) -> String;
}

/// Detects the OS family of the machine we are running on
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFacts;

impl FactSource for SystemFacts {
    fn os_family(&self) -> String {
        detect_os_family()
    }
}

/// Returns a fixed OS family, regardless of the running platform
#[derive(Debug, Clone)]
pub struct StaticFacts {
    os_family: String,
}

impl StaticFacts {
    pub fn new(os_family: impl Into<String>) -> Self {
        Self {
            os_family: os_family.into(),
        }
    }
}

impl FactSource for StaticFacts {
    fn os_family(&self) -> String {
        self.os_family.clone()
    }
}

/// Either live detection or an operator override
#[derive(Debug, Clone)]
pub enum Facts {
    System(SystemFacts),
    Static(StaticFacts),
}

impl Facts {
    pub fn from_override(os_family: Option<String>) -> Self {
        match os_family {
            Some(family) => Facts::Static(StaticFacts::new(family)),
            None => Facts::System(SystemFacts),
        }
    }
}

impl FactSource for Facts {
    fn os_family(&self) -> String {
        match self {
            Facts::System(facts) => facts.os_family(),
            Facts::Static(facts) => facts.os_family(),
        }
    }
}

/// Get the OS family of the current platform
pub fn detect_os_family() -> String {
    #[cfg(target_os = "windows")]
    {
        crate::paths::WINDOWS_FAMILY.to_string()
    }

    #[cfg(target_os = "macos")]
    {
        "Darwin".to_string()
    }

    #[cfg(target_os = "linux")]
    {
        linux::os_family()
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        // FreeBSD, OpenBSD, ... report their target name, capitalized
        let os = std::env::consts::OS;
        let mut chars = os.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_facts_return_value_verbatim() {
        assert_eq!(StaticFacts::new("WINDOWS").os_family(), "WINDOWS");
        assert_eq!(StaticFacts::new("").os_family(), "");
    }

    #[test]
    fn override_takes_precedence_over_detection() {
        let facts = Facts::from_override(Some("windows".to_string()));
        assert_eq!(facts.os_family(), "windows");
    }

    #[test]
    fn detected_family_is_not_empty() {
        assert!(!Facts::from_override(None).os_family().is_empty());
    }

    #[cfg(target_os = "windows")]
    #[test]
    fn detects_windows() {
        assert_eq!(detect_os_family(), "windows");
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn non_windows_hosts_never_report_windows() {
        assert_ne!(detect_os_family(), "windows");
    }
}
