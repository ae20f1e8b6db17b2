// The repository format × type matrix.

use std::fmt;

use strum::{AsRefStr, EnumIter, IntoEnumIterator};

/// Hosted, proxy or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum RepositoryKind {
    Hosted,
    Proxy,
    Group,
}

impl fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Format {
    Apt,
    Cargo,
    Cocoapods,
    Conan,
    Docker,
    GitLfs,
    HuggingFace,
    Maven,
    Npm,
    Nuget,
    Pypi,
    R,
    Raw,
    Rubygems,
    Swift,
    Terraform,
    Yum,
}

/// Per-format attribute blocks carried next to the common envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatBlock {
    Maven,
    Docker,
    DockerProxy,
    Apt,
    AptSigning,
    Yum,
    YumSigning,
    NugetProxy,
    Npm,
    Pypi,
    Raw,
    ConanProxy,
}

use RepositoryKind::{Group, Hosted, Proxy};

impl Format {
    /// `{format}` segment of `v1/repositories/{format}/{type}`.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Apt => "apt",
            Self::Cargo => "cargo",
            Self::Cocoapods => "cocoapods",
            Self::Conan => "conan",
            Self::Docker => "docker",
            Self::GitLfs => "gitlfs",
            Self::HuggingFace => "huggingface",
            Self::Maven => "maven",
            Self::Npm => "npm",
            Self::Nuget => "nuget",
            Self::Pypi => "pypi",
            Self::R => "r",
            Self::Raw => "raw",
            Self::Rubygems => "rubygems",
            Self::Swift => "swift",
            Self::Terraform => "terraform",
            Self::Yum => "yum",
        }
    }

    /// Format name the server reports in listings.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Maven => "maven2",
            other => other.path_segment(),
        }
    }

    /// Fragment used in resource type names.
    pub fn slug(self) -> &'static str {
        match self {
            Self::GitLfs => "git_lfs",
            Self::HuggingFace => "hugging_face",
            Self::Rubygems => "ruby_gems",
            other => other.path_segment(),
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Self::iter().find(|f| f.wire_name() == name || f.path_segment() == name)
    }

    /// Repository types the server offers for this format.
    pub fn kinds(self) -> &'static [RepositoryKind] {
        match self {
            Self::Cocoapods | Self::HuggingFace | Self::Swift => &[Proxy],
            Self::GitLfs => &[Hosted],
            Self::Apt | Self::Terraform => &[Hosted, Proxy],
            _ => &[Hosted, Proxy, Group],
        }
    }

    pub fn supports(self, kind: RepositoryKind) -> bool {
        self.kinds().contains(&kind)
    }

    /// Format-specific blocks for one `{format, kind}` combination.
    pub fn blocks(self, kind: RepositoryKind) -> &'static [FormatBlock] {
        match (self, kind) {
            (Self::Apt, Hosted) => &[FormatBlock::Apt, FormatBlock::AptSigning],
            (Self::Apt, Proxy) => &[FormatBlock::Apt],
            (Self::Conan, Proxy) => &[FormatBlock::ConanProxy],
            (Self::Docker, Proxy) => &[FormatBlock::Docker, FormatBlock::DockerProxy],
            (Self::Docker, _) => &[FormatBlock::Docker],
            (Self::Maven, Hosted | Proxy) => &[FormatBlock::Maven],
            (Self::Npm, Proxy) => &[FormatBlock::Npm],
            (Self::Nuget, Proxy) => &[FormatBlock::NugetProxy],
            (Self::Pypi, Proxy) => &[FormatBlock::Pypi],
            (Self::Raw, _) => &[FormatBlock::Raw],
            (Self::Yum, Hosted) => &[FormatBlock::Yum],
            (Self::Yum, Proxy | Group) => &[FormatBlock::YumSigning],
            _ => &[],
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// Every supported `{format, kind}` pair in a stable order.
pub fn matrix() -> Vec<(Format, RepositoryKind)> {
    Format::iter()
        .flat_map(|format| format.kinds().iter().map(move |kind| (format, *kind)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_covers_known_combinations() {
        let m = matrix();
        assert!(m.contains(&(Format::Npm, Hosted)));
        assert!(m.contains(&(Format::Cocoapods, Proxy)));
        assert!(!m.contains(&(Format::Cocoapods, Hosted)));
        assert!(!m.contains(&(Format::Terraform, Group)));
        assert!(!m.contains(&(Format::GitLfs, Proxy)));
        assert_eq!(m.len(), 41);
    }

    #[test]
    fn maven_reports_maven2() {
        assert_eq!(Format::Maven.wire_name(), "maven2");
        assert_eq!(Format::from_wire("maven2"), Some(Format::Maven));
        assert_eq!(Format::from_wire("gitlfs"), Some(Format::GitLfs));
        assert_eq!(Format::from_wire("go"), None);
    }
}
