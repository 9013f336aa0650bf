#![deny(missing_docs)]

//! # Generate Command
//!
//! Renders a contract into an output directory.

use std::path::PathBuf;

use tinyurl_core::config::{DateLibrary, Framework, GeneratorConfig};
use tinyurl_core::{generate_to_dir, AppResult, GenerationReport};

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Path to the OpenAPI contract (YAML or JSON).
    #[clap(long, short, default_value = "contracts/openapi.yaml")]
    pub input: PathBuf,

    /// Directory receiving the generated files.
    #[clap(long, short)]
    pub output: PathBuf,

    /// Emit trait methods without default bodies.
    #[clap(long)]
    pub interface_only: Option<bool>,

    /// Server binding: actix-web, axum or none.
    #[clap(long)]
    pub framework: Option<Framework>,

    /// Date types: chrono, time or string.
    #[clap(long)]
    pub date_library: Option<DateLibrary>,

    /// Raw generator option, e.g. `interfaceOnly=false`. Applied after the flags above.
    #[clap(long, value_parser = parse_key_val)]
    pub config_option: Vec<(String, String)>,
}

/// Helper to parse "key=value" arguments.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Generator configuration described by the arguments.
pub fn config_from_args(args: &GenerateArgs) -> AppResult<GeneratorConfig> {
    let mut config = GeneratorConfig::default();
    if let Some(interface_only) = args.interface_only {
        config.interface_only = interface_only;
    }
    if let Some(framework) = args.framework {
        config.framework = framework;
    }
    if let Some(date_library) = args.date_library {
        config.date_library = date_library;
    }
    for (key, value) in &args.config_option {
        config.apply_option(key, value)?;
    }
    Ok(config)
}

/// Executes generation.
pub fn execute(args: &GenerateArgs) -> AppResult<()> {
    let config = config_from_args(args)?;
    match generate_to_dir(&args.input, &args.output, &config)? {
        GenerationReport::Written { files } => {
            println!("generated {} files in {}", files, args.output.display())
        }
        GenerationReport::Unchanged { .. } => println!("unchanged"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const CONTRACT: &str = r#"
openapi: 3.0.3
info: {title: Health, version: 0.1.0}
paths:
  /health:
    get:
      operationId: health
      responses:
        '200':
          description: OK
          content:
            text/plain:
              schema:
                type: string
"#;

    fn args(input: PathBuf, output: PathBuf) -> GenerateArgs {
        GenerateArgs {
            input,
            output,
            interface_only: None,
            framework: None,
            date_library: None,
            config_option: Vec::new(),
        }
    }

    #[test]
    fn test_parse_key_val() {
        let valid = parse_key_val("framework=axum").unwrap();
        assert_eq!(valid, ("framework".to_string(), "axum".to_string()));

        let invalid = parse_key_val("invalid");
        assert!(invalid.is_err());
    }

    #[test]
    fn test_options_override_flags() {
        let mut args = args("a.yaml".into(), "out".into());
        args.interface_only = Some(true);
        args.framework = Some(Framework::Axum);
        args.config_option = vec![("interfaceOnly".into(), "false".into())];

        let config = config_from_args(&args).unwrap();
        assert!(!config.interface_only);
        assert_eq!(config.framework, Framework::Axum);

        args.config_option = vec![("unknown".into(), "1".into())];
        assert!(config_from_args(&args).is_err());
    }

    #[test]
    fn test_execute_writes_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("openapi.yaml");
        fs::write(&input, CONTRACT).unwrap();
        let output = dir.path().join("generated");

        execute(&args(input.clone(), output.clone())).unwrap();
        assert!(output.join("api.rs").exists());
        assert!(output.join("server.rs").exists());

        // Second run is a no-op.
        execute(&args(input, output)).unwrap();
    }

    #[test]
    fn test_execute_missing_contract() {
        let dir = tempdir().unwrap();
        let result = execute(&args(dir.path().join("missing.yaml"), dir.path().join("out")));
        assert!(result.is_err());
        assert!(!dir.path().join("out").exists());
    }
}
