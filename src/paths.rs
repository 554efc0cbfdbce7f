use serde::Serialize;
use std::path::PathBuf;

/// OS family reported for Windows hosts
pub const WINDOWS_FAMILY: &str = "windows";

/// props.conf location on Windows forwarders
pub const WINDOWS_PROPS_PATH: &str =
    r"C:\Program Files\SplunkUniversalForwarder\etc\system\local\props.conf";

/// props.conf location on every other platform
pub const UNIX_PROPS_PATH: &str = "/opt/splunkforwarder/etc/system/local/props.conf";

/// Which branch of the path table an OS family falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKey {
    Windows,
    Other,
}

impl PlatformKey {
    /// Classify an OS family. Only the exact string "windows" selects Windows.
    pub fn from_os_family(os_family: &str) -> Self {
        if os_family == WINDOWS_FAMILY {
            PlatformKey::Windows
        } else {
            PlatformKey::Other
        }
    }

    /// Get lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKey::Windows => "windows",
            PlatformKey::Other => "other",
        }
    }
}

/// A compiled-in mapping from platform branch to props.conf path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformPathRule {
    pub platform_key: PlatformKey,
    pub path: &'static str,
}

/// The two path rules. Exactly one matches any OS family.
pub static PATH_RULES: [PlatformPathRule; 2] = [
    PlatformPathRule {
        platform_key: PlatformKey::Windows,
        path: WINDOWS_PROPS_PATH,
    },
    PlatformPathRule {
        platform_key: PlatformKey::Other,
        path: UNIX_PROPS_PATH,
    },
];

impl PlatformPathRule {
    /// Look up the rule for a platform branch
    pub fn for_key(key: PlatformKey) -> &'static PlatformPathRule {
        match key {
            PlatformKey::Windows => &PATH_RULES[0],
            PlatformKey::Other => &PATH_RULES[1],
        }
    }
}

/// Resolve the props.conf path for an OS family.
///
/// Total over its input: unknown, empty or differently-cased families all
/// fall back to the Unix path.
pub fn resolve_config_path(os_family: &str) -> &'static str {
    PlatformPathRule::for_key(PlatformKey::from_os_family(os_family)).path
}

/// Strategy for turning an OS family into the file a provider manages
pub trait PathResolver {
    fn resolve(&self, os_family: &str) -> PathBuf;
}

/// Resolves to the standard forwarder install locations
#[derive(Debug, Clone, Copy, Default)]
pub struct PropsPathResolver;

impl PathResolver for PropsPathResolver {
    fn resolve(&self, os_family: &str) -> PathBuf {
        PathBuf::from(resolve_config_path(os_family))
    }
}

/// Ignores the OS family and always returns the same path
///
/// Used when the operator points the tool at a staging copy of props.conf.
#[derive(Debug, Clone)]
pub struct FixedPathResolver {
    path: PathBuf,
}

impl FixedPathResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PathResolver for FixedPathResolver {
    fn resolve(&self, _os_family: &str) -> PathBuf {
        self.path.clone()
    }
}

/// Either the standard locations or an operator override
#[derive(Debug, Clone)]
pub enum Resolver {
    Standard(PropsPathResolver),
    Fixed(FixedPathResolver),
}

impl Resolver {
    pub fn from_override(target: Option<PathBuf>) -> Self {
        match target {
            Some(path) => Resolver::Fixed(FixedPathResolver::new(path)),
            None => Resolver::Standard(PropsPathResolver),
        }
    }
}

impl PathResolver for Resolver {
    fn resolve(&self, os_family: &str) -> PathBuf {
        match self {
            Resolver::Standard(resolver) => resolver.resolve(os_family),
            Resolver::Fixed(resolver) => resolver.resolve(os_family),
        }
    }
}
