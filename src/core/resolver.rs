//! Configuration resolution
//!
//! Turns [`RawOptions`] into a validated [`BuildConfiguration`]. Direct mode
//! calls [`resolve`] with the parsed command line; wizard mode collects the
//! same options through [`crate::core::wizard`] and then goes through the
//! same validation, so both modes produce identically shaped output.

use std::path::{Path, PathBuf};

use semver::Version;

use crate::config::defaults;
use crate::core::config::{BuildConfiguration, RawOptions};
use crate::core::host::HostInfo;
use crate::core::mirror;
use crate::core::wizard::{Prompter, Wizard};
use crate::error::ConfigError;
use crate::infra::filesystem::absolutize;

/// Outcome of configuration resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A validated configuration
    Resolved(BuildConfiguration),
    /// The user cancelled the wizard
    Cancelled,
}

/// Resolve a session: direct mode when a project directory was given,
/// wizard mode otherwise
pub fn resolve_session(
    raw: RawOptions,
    host: &HostInfo,
    prompter: &mut dyn Prompter,
    default_mirror: &str,
) -> Result<Resolution, ConfigError> {
    if raw.project_dir.is_some() {
        tracing::info!("Running in direct mode");
        resolve(raw, host).map(Resolution::Resolved)
    } else {
        tracing::info!("Entering interactive mode");
        Wizard::new(host, default_mirror).run(prompter)
    }
}

/// Validate raw options into a configuration
///
/// Checks run in a fixed order and the first failure is returned; nothing
/// outside of read-only filesystem lookups happens here.
pub fn resolve(raw: RawOptions, host: &HostInfo) -> Result<BuildConfiguration, ConfigError> {
    check_protection_lock(&raw)?;

    if raw.delete_source_on_encrypt && !raw.encrypt {
        return Err(ConfigError::DeleteRequiresProtect);
    }

    let Some(project_dir) = raw.project_dir.clone() else {
        return Err(ConfigError::ProjectDirNotFound {
            path: PathBuf::new(),
        });
    };
    let project_dir = absolutize(&project_dir).map_err(|_| ConfigError::ProjectDirNotFound {
        path: project_dir.clone(),
    })?;
    if !project_dir.is_dir() {
        return Err(ConfigError::ProjectDirNotFound { path: project_dir });
    }

    let icon = match raw.icon {
        Some(icon) => Some(check_icon(&icon)?),
        None => None,
    };

    if let Some(url) = &raw.mirror {
        mirror::mirror_host(url).map_err(|reason| ConfigError::InvalidMirror {
            url: url.clone(),
            reason,
        })?;
    }

    let python_version = match raw.python_version {
        Some(version) => version.trim().to_string(),
        None => host
            .python_version()
            .map(str::to_string)
            .ok_or_else(|| ConfigError::HostRuntimeUnavailable {
                reason: if raw.encrypt {
                    "--encrypt compiles sources with the host interpreter".to_string()
                } else {
                    "pass --python-version to choose the target runtime".to_string()
                },
            })?,
    };
    check_version(&python_version)?;

    let arch = raw.arch.unwrap_or(host.arch());

    let app_folder = non_empty("app-folder", raw.app_folder, defaults::DEFAULT_APP_FOLDER)?;
    let main_script = non_empty("main-script", raw.main_script, defaults::DEFAULT_MAIN_SCRIPT)?;
    let requirements_file = non_empty(
        "requirements-file",
        raw.requirements_file,
        defaults::DEFAULT_REQUIREMENTS_FILE,
    )?;

    Ok(BuildConfiguration {
        project_dir,
        app_folder,
        main_script,
        requirements_file,
        python_version,
        arch,
        icon,
        mirror: raw.mirror,
        protect_source: raw.encrypt,
        delete_originals: raw.delete_source_on_encrypt,
        no_window: raw.no_window,
        interactive: raw.interactive,
    })
}

/// Reject an explicit target together with protection
///
/// Run first so a conflicting command line fails before any other work.
pub fn check_protection_lock(raw: &RawOptions) -> Result<(), ConfigError> {
    if raw.encrypt && (raw.python_version.is_some() || raw.arch.is_some()) {
        return Err(ConfigError::ProtectionLocked);
    }
    Ok(())
}

/// Absolute path of an existing icon file
pub fn check_icon(icon: &Path) -> Result<PathBuf, ConfigError> {
    let absolute = absolutize(icon).map_err(|_| ConfigError::IconNotFound {
        path: icon.to_path_buf(),
    })?;
    if absolute.is_file() {
        Ok(absolute)
    } else {
        Err(ConfigError::IconNotFound { path: absolute })
    }
}

/// Accept only `MAJOR.MINOR.PATCH`
pub fn check_version(version: &str) -> Result<(), ConfigError> {
    match Version::parse(version) {
        Ok(v) if v.pre.is_empty() && v.build.is_empty() => Ok(()),
        _ => Err(ConfigError::InvalidVersion {
            version: version.to_string(),
        }),
    }
}

fn non_empty(name: &str, value: Option<String>, default: &str) -> Result<String, ConfigError> {
    let value = value.unwrap_or_else(|| default.to_string());
    if value.trim().is_empty() {
        Err(ConfigError::EmptyField {
            name: name.to_string(),
        })
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Arch;
    use crate::test_utils::{generators, ScriptedPrompter};
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn host() -> HostInfo {
        HostInfo::new(
            Some("3.11.4".to_string()),
            Arch::Amd64,
            Some(PathBuf::from("C:\\Python311\\python.exe")),
        )
    }

    fn raw_for(dir: &Path) -> RawOptions {
        RawOptions {
            project_dir: Some(dir.to_path_buf()),
            ..RawOptions::default()
        }
    }

    #[test]
    fn test_direct_mode_defaults() {
        let temp = TempDir::new().unwrap();
        let config = resolve(raw_for(temp.path()), &host()).unwrap();

        assert_eq!(config.project_dir(), temp.path());
        assert_eq!(config.app_folder(), "app");
        assert_eq!(config.main_script(), "app.py");
        assert_eq!(config.requirements_file(), "requirements.txt");
        assert_eq!(config.python_version(), "3.11.4");
        assert_eq!(config.arch(), Arch::Amd64);
        assert!(config.icon().is_none());
        assert!(config.mirror().is_none());
        assert!(!config.protect_source());
        assert!(!config.interactive());
    }

    #[test]
    fn test_explicit_target_without_protection() {
        let temp = TempDir::new().unwrap();
        let raw = RawOptions {
            python_version: Some("3.8.10".to_string()),
            arch: Some(Arch::Win32),
            ..raw_for(temp.path())
        };

        let config = resolve(raw, &host()).unwrap();
        assert_eq!(config.python_version(), "3.8.10");
        assert_eq!(config.arch(), Arch::Win32);
    }

    #[test]
    fn test_protection_with_explicit_version_is_rejected() {
        let raw = RawOptions {
            python_version: Some("3.9.0".to_string()),
            encrypt: true,
            // Project dir does not exist: the lock check must fire first
            project_dir: Some(PathBuf::from("/definitely/not/here")),
            ..RawOptions::default()
        };

        assert_eq!(resolve(raw, &host()), Err(ConfigError::ProtectionLocked));
    }

    #[test]
    fn test_protection_with_explicit_arch_is_rejected() {
        let temp = TempDir::new().unwrap();
        let raw = RawOptions {
            arch: Some(Arch::Amd64),
            encrypt: true,
            ..raw_for(temp.path())
        };

        assert_eq!(resolve(raw, &host()), Err(ConfigError::ProtectionLocked));
    }

    #[test]
    fn test_protection_uses_host_target() {
        let temp = TempDir::new().unwrap();
        let raw = RawOptions {
            encrypt: true,
            delete_source_on_encrypt: true,
            ..raw_for(temp.path())
        };

        let config = resolve(raw, &host()).unwrap();
        assert!(config.protect_source());
        assert!(config.delete_originals());
        assert_eq!(config.python_version(), "3.11.4");
        assert_eq!(config.arch(), Arch::Amd64);
    }

    #[test]
    fn test_protection_requires_host_interpreter() {
        let temp = TempDir::new().unwrap();
        let raw = RawOptions {
            encrypt: true,
            ..raw_for(temp.path())
        };
        let bare_host = HostInfo::new(None, Arch::Amd64, None);

        assert!(matches!(
            resolve(raw, &bare_host),
            Err(ConfigError::HostRuntimeUnavailable { .. })
        ));
    }

    #[test]
    fn test_delete_without_protection_is_rejected() {
        let temp = TempDir::new().unwrap();
        let raw = RawOptions {
            delete_source_on_encrypt: true,
            ..raw_for(temp.path())
        };

        assert_eq!(resolve(raw, &host()), Err(ConfigError::DeleteRequiresProtect));
    }

    #[test]
    fn test_parent_components_in_project_dir_are_resolved() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("MyTool");
        std::fs::create_dir_all(project.join("sub")).unwrap();

        let config = resolve(raw_for(&project.join("sub").join("..")), &host()).unwrap();

        assert_eq!(config.project_dir(), project);
        assert_eq!(
            crate::core::launcher::artifact_path(config.project_dir()),
            project.join("MyTool.exe")
        );
    }

    #[test]
    fn test_missing_project_dir() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        assert_eq!(
            resolve(raw_for(&missing), &host()),
            Err(ConfigError::ProjectDirNotFound { path: missing })
        );
    }

    #[test]
    fn test_missing_icon() {
        let temp = TempDir::new().unwrap();
        let raw = RawOptions {
            icon: Some(temp.path().join("missing.ico")),
            ..raw_for(temp.path())
        };

        assert!(matches!(
            resolve(raw, &host()),
            Err(ConfigError::IconNotFound { .. })
        ));
    }

    #[test]
    fn test_icon_is_made_absolute() {
        let temp = TempDir::new().unwrap();
        let icon = temp.path().join("app.ico");
        std::fs::write(&icon, b"ico").unwrap();
        let raw = RawOptions {
            icon: Some(icon.clone()),
            ..raw_for(temp.path())
        };

        let config = resolve(raw, &host()).unwrap();
        assert_eq!(config.icon(), Some(icon.as_path()));
    }

    #[test]
    fn test_invalid_mirror() {
        let temp = TempDir::new().unwrap();
        let raw = RawOptions {
            mirror: Some("pypi mirror".to_string()),
            ..raw_for(temp.path())
        };

        assert!(matches!(
            resolve(raw, &host()),
            Err(ConfigError::InvalidMirror { .. })
        ));
    }

    #[test]
    fn test_invalid_version() {
        let temp = TempDir::new().unwrap();
        for bad in ["3.11", "latest", "3.11.4rc1", "3.11.4-rc1"] {
            let raw = RawOptions {
                python_version: Some(bad.to_string()),
                ..raw_for(temp.path())
            };
            assert!(
                matches!(resolve(raw, &host()), Err(ConfigError::InvalidVersion { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let temp = TempDir::new().unwrap();
        let raw = RawOptions {
            main_script: Some("  ".to_string()),
            ..raw_for(temp.path())
        };

        assert_eq!(
            resolve(raw, &host()),
            Err(ConfigError::EmptyField {
                name: "main-script".to_string()
            })
        );
    }

    #[test]
    fn test_session_with_project_dir_never_prompts() {
        let temp = TempDir::new().unwrap();
        let mut prompter = ScriptedPrompter::new(Vec::new());

        let resolution =
            resolve_session(raw_for(temp.path()), &host(), &mut prompter, "https://m/simple")
                .unwrap();

        assert!(matches!(resolution, Resolution::Resolved(_)));
        assert!(prompter.questions().is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Protection always lands on the host target
        #[test]
        fn prop_protection_locks_to_host(
            version in generators::python_version(),
            arch in generators::arch(),
            delete in any::<bool>(),
        ) {
            let temp = TempDir::new().unwrap();
            let host = HostInfo::new(Some(version.clone()), arch, None);
            let raw = RawOptions {
                encrypt: true,
                delete_source_on_encrypt: delete,
                ..raw_for(temp.path())
            };

            let config = resolve(raw, &host).unwrap();
            prop_assert_eq!(config.python_version(), version.as_str());
            prop_assert_eq!(config.arch(), arch);
        }

        /// Any explicit target with protection is rejected, never overridden
        #[test]
        fn prop_explicit_target_with_protection_rejected(
            version in proptest::option::of(generators::python_version()),
            arch in proptest::option::of(generators::arch()),
        ) {
            prop_assume!(version.is_some() || arch.is_some());
            let temp = TempDir::new().unwrap();
            let raw = RawOptions {
                encrypt: true,
                python_version: version,
                arch,
                ..raw_for(temp.path())
            };

            prop_assert_eq!(resolve(raw, &host()), Err(ConfigError::ProtectionLocked));
        }
    }
}
