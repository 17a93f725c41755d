use anyhow::{Context, Result, bail};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::Serialize;
use std::path::Path;

use super::{CompatConfig, smart_load};

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Project configuration file looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = "jarcompat.toml";

/// Layered configuration: embedded defaults, a config file, the environment,
/// then command-line overrides.
pub struct ConfigLoader {
    figment: Figment,
}

impl ConfigLoader {
    pub fn load(custom_config: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(custom_path) = custom_config {
            if !custom_path.is_file() {
                bail!("Config file not found: {}", custom_path.display());
            }
            figment = figment.merge(smart_load::auto(custom_path));
        } else {
            figment = figment.merge(Toml::file(PROJECT_CONFIG_FILE));
        }

        // Legacy converter location, then prefixed variables with `__` nesting
        figment = figment
            .merge(
                Env::raw()
                    .only(&["PATH_DEX2JAR"])
                    .map(|_| "tools.dex2jar".into()),
            )
            .merge(Env::prefixed("JARCOMPAT_").split("__"));

        Ok(Self { figment })
    }

    /// Merge values that take precedence over every other layer
    pub fn with_overrides<T: Serialize>(mut self, overrides: &T) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(overrides));
        self
    }

    /// Extract and resolve the final configuration
    pub fn extract(&self) -> Result<CompatConfig> {
        let config: CompatConfig = self
            .figment
            .extract()
            .context("Failed to parse configuration")?;
        config.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::ReportFormat;
    use figment::Jail;
    use std::collections::BTreeMap;

    #[test]
    fn test_config_loads_defaults() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load(None).unwrap().extract().unwrap();

            assert!(config.num_threads >= 1);
            assert!(!config.android_built_out_mode);
            assert_eq!(config.report_format, ReportFormat::Markdown);
            assert_eq!(config.output_sections, "missing|new|problem|compatible");
            assert!(config.cleanup_temporary);
            assert!(config.report_base.is_none());
            assert_eq!(config.tools.checker, "japi-compliance-checker");
            assert_eq!(config.tools.dex2jar, "d2j-dex2jar.sh");
            assert!(config.temp_dir.is_absolute());
            Ok(())
        });
    }

    #[test]
    fn test_project_file_and_env_layers() {
        Jail::expect_with(|jail| {
            jail.create_file(
                PROJECT_CONFIG_FILE,
                r#"
                num_threads = 3
                report_format = "csv"

                [tools]
                unzip = "/opt/bin/unzip"
                "#,
            )?;
            jail.set_env("JARCOMPAT_NUM_THREADS", "5");
            jail.set_env("PATH_DEX2JAR", "/opt/dex2jar/d2j-dex2jar.sh");

            let config = ConfigLoader::load(None).unwrap().extract().unwrap();
            assert_eq!(config.num_threads, 5);
            assert_eq!(config.report_format, ReportFormat::Csv);
            assert_eq!(config.tools.unzip, "/opt/bin/unzip");
            assert_eq!(config.tools.dex2jar, "/opt/dex2jar/d2j-dex2jar.sh");
            Ok(())
        });
    }

    #[test]
    fn test_nested_env_override() {
        Jail::expect_with(|jail| {
            jail.set_env("JARCOMPAT_TOOLS__CHECKER", "/usr/local/bin/japi-compliance-checker");
            let config = ConfigLoader::load(None).unwrap().extract().unwrap();
            assert_eq!(config.tools.checker, "/usr/local/bin/japi-compliance-checker");
            Ok(())
        });
    }

    #[test]
    fn test_env_values_that_look_like_scalars_stay_text() {
        Jail::expect_with(|jail| {
            jail.set_env("JARCOMPAT_TEMP_DIR", "2024");
            jail.set_env("JARCOMPAT_OUTPUT_DIR", "42");
            jail.set_env("JARCOMPAT_REPORT_BASE", "7");
            jail.set_env("JARCOMPAT_TOOLS__CHECKER", "true");
            jail.set_env("JARCOMPAT_TOOLS__UNZIP", "false");
            jail.set_env("PATH_DEX2JAR", "3.5");

            let config = ConfigLoader::load(None).unwrap().extract().unwrap();
            assert!(config.temp_dir.is_absolute());
            assert!(config.temp_dir.ends_with("2024"));
            assert_eq!(config.output_dir, std::path::PathBuf::from("42"));
            assert_eq!(config.report_base.as_deref(), Some("7"));
            assert_eq!(config.tools.checker, "true");
            assert_eq!(config.tools.unzip, "false");
            assert_eq!(config.tools.dex2jar, "3.5");
            Ok(())
        });
    }

    #[test]
    fn test_custom_yaml_config_and_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.yaml", "verbose: true\nnum_threads: 2\n")?;

            let mut overrides = BTreeMap::new();
            overrides.insert("num_threads", 7);

            let config = ConfigLoader::load(Some(Path::new("custom.yaml")))
                .unwrap()
                .with_overrides(&overrides)
                .extract()
                .unwrap();
            assert!(config.verbose);
            assert_eq!(config.num_threads, 7);
            Ok(())
        });
    }

    #[test]
    fn test_missing_custom_config_is_an_error() {
        Jail::expect_with(|_jail| {
            assert!(ConfigLoader::load(Some(Path::new("nope.toml"))).is_err());
            Ok(())
        });
    }
}
