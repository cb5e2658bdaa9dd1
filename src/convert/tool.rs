//! External converter tool (plutil on macOS, plistutil elsewhere)

use super::traits::Converter;
use crate::config::ToolsConfig;
use crate::error::{Error, Result};
use crate::types::TargetFormat;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Time limit for a conversion run
const CONVERT_TIMEOUT: Duration = Duration::from_secs(60);

/// Time limit for the `--help` probe
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Host platform family, which decides the tool and its argument dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    /// macOS ships `plutil`
    MacOs,
    /// Everything else, where libplist's `plistutil` may be installed
    Other,
}

impl HostPlatform {
    /// Platform of the running process
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an `std::env::consts::OS` value to a platform family
    pub fn from_os(os: &str) -> Self {
        if os == "macos" {
            HostPlatform::MacOs
        } else {
            HostPlatform::Other
        }
    }

    /// Name reported by `/capabilities`
    pub fn as_str(&self) -> &'static str {
        match self {
            HostPlatform::MacOs => "macos",
            HostPlatform::Other => "other",
        }
    }
}

/// Supported converter tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// `plutil -convert <fmt> <in> -o <out>`
    Plutil,
    /// `plistutil -i <in> -o <out> [-f <fmt>]`
    Plistutil,
}

impl ToolKind {
    /// Tool used on `host`
    pub fn for_host(host: HostPlatform) -> Self {
        match host {
            HostPlatform::MacOs => ToolKind::Plutil,
            HostPlatform::Other => ToolKind::Plistutil,
        }
    }

    /// Executable name searched for in PATH
    pub fn binary_name(&self) -> &'static str {
        match self {
            ToolKind::Plutil => "plutil",
            ToolKind::Plistutil => "plistutil",
        }
    }
}

/// Output-format flags a `plistutil` build advertises in its help text
///
/// Builds differ: some have no format flag at all, some only know xml and
/// binary, newer ones also emit JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatFlags {
    /// No format flag; the tool picks the output format itself
    Unsupported,
    /// `-f <fmt>` is accepted
    Supported {
        /// Whether `json` is one of the accepted formats
        json: bool,
    },
}

/// Work out the format-flag vocabulary from `plistutil --help` output
pub fn parse_format_flags(help: &str) -> FormatFlags {
    let help = help.to_lowercase();
    let has_flag = ["-f xml", "--format=xml", "-f, --format", "--format format"]
        .iter()
        .any(|pattern| help.contains(pattern));

    if has_flag {
        FormatFlags::Supported {
            json: help.contains("json"),
        }
    } else {
        FormatFlags::Unsupported
    }
}

/// Command-line arguments for one conversion
///
/// For `plistutil` without JSON support, a JSON request asks for the binary
/// format; the caller sniffs and corrects the output afterwards.
pub fn build_args(
    kind: ToolKind,
    flags: FormatFlags,
    input: &Path,
    output: &Path,
    format: TargetFormat,
) -> Vec<OsString> {
    match kind {
        ToolKind::Plutil => {
            let target = match format {
                TargetFormat::Json => "json",
                TargetFormat::Xml => "xml1",
            };
            vec![
                "-convert".into(),
                target.into(),
                input.into(),
                "-o".into(),
                output.into(),
            ]
        }
        ToolKind::Plistutil => {
            let mut args: Vec<OsString> =
                vec!["-i".into(), input.into(), "-o".into(), output.into()];
            if let FormatFlags::Supported { json } = flags {
                let target = match format {
                    TargetFormat::Xml => "xml",
                    TargetFormat::Json if json => "json",
                    TargetFormat::Json => "bin",
                };
                args.push("-f".into());
                args.push(target.into());
            }
            args
        }
    }
}

/// Converter that shells out to `plutil` or `plistutil`
///
/// # Examples
///
/// ```no_run
/// use shortcut_extract::convert::{ExternalToolConverter, HostPlatform};
///
/// // Auto-discover the tool for this host from PATH
/// match ExternalToolConverter::from_path(HostPlatform::detect()) {
///     Some(tool) => println!("using {}", tool.binary().display()),
///     None => println!("no external converter; in-process decoder only"),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ExternalToolConverter {
    kind: ToolKind,
    binary_path: PathBuf,
}

impl ExternalToolConverter {
    /// Create a converter with an explicit binary path
    pub fn new(kind: ToolKind, binary_path: PathBuf) -> Self {
        Self { kind, binary_path }
    }

    /// Find the tool for `host` in PATH
    ///
    /// Returns `None` if the binary is not installed.
    pub fn from_path(host: HostPlatform) -> Option<Self> {
        let kind = ToolKind::for_host(host);
        which::which(kind.binary_name())
            .ok()
            .map(|path| Self::new(kind, path))
    }

    /// Resolve the converter for `host` from configuration
    ///
    /// An explicit path wins; otherwise PATH is searched when allowed.
    pub fn discover(tools: &ToolsConfig, host: HostPlatform) -> Option<Self> {
        if !tools.external_tool_enabled {
            return None;
        }

        let kind = ToolKind::for_host(host);
        let explicit = match kind {
            ToolKind::Plutil => tools.plutil_path.clone(),
            ToolKind::Plistutil => tools.plistutil_path.clone(),
        };

        match explicit {
            Some(path) => Some(Self::new(kind, path)),
            None if tools.search_path => Self::from_path(host),
            None => None,
        }
    }

    /// Which tool this is
    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    /// Path of the tool binary
    pub fn binary(&self) -> &Path {
        &self.binary_path
    }

    /// Ask `plistutil --help` which format flags it understands
    ///
    /// A probe that cannot run falls back to [`FormatFlags::Unsupported`].
    pub async fn probe_format_flags(&self) -> FormatFlags {
        let probe = Command::new(&self.binary_path)
            .arg("--help")
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(PROBE_TIMEOUT, probe).await {
            Ok(Ok(output)) => {
                let mut help = String::from_utf8_lossy(&output.stdout).into_owned();
                help.push_str(&String::from_utf8_lossy(&output.stderr));
                let flags = parse_format_flags(&help);
                debug!(tool = self.kind.binary_name(), ?flags, "probed format flags");
                flags
            }
            Ok(Err(e)) => {
                warn!(tool = self.kind.binary_name(), error = %e, "failed to probe format flags");
                FormatFlags::Unsupported
            }
            Err(_) => {
                warn!(tool = self.kind.binary_name(), "format flag probe timed out");
                FormatFlags::Unsupported
            }
        }
    }
}

#[async_trait]
impl Converter for ExternalToolConverter {
    async fn convert(&self, input: &Path, output: &Path, format: TargetFormat) -> Result<()> {
        let name = self.kind.binary_name();
        let flags = match self.kind {
            ToolKind::Plutil => FormatFlags::Supported { json: true },
            ToolKind::Plistutil => self.probe_format_flags().await,
        };
        let args = build_args(self.kind, flags, input, output, format);

        info!(
            tool = name,
            binary = %self.binary_path.display(),
            args = ?args,
            "running external converter"
        );

        let run = Command::new(&self.binary_path)
            .args(&args)
            .kill_on_drop(true)
            .output();
        let result = tokio::time::timeout(CONVERT_TIMEOUT, run)
            .await
            .map_err(|_| {
                Error::ExternalTool(format!(
                    "{} timed out after {} seconds",
                    name,
                    CONVERT_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| Error::ExternalTool(format!("Failed to execute {}: {}", name, e)))?;

        let stdout = String::from_utf8_lossy(&result.stdout);
        let stderr = String::from_utf8_lossy(&result.stderr);
        if !stdout.trim().is_empty() {
            debug!(tool = name, stdout = %stdout.trim(), "converter stdout");
        }
        if !stderr.trim().is_empty() {
            warn!(tool = name, stderr = %stderr.trim(), "converter stderr");
        }

        if !result.status.success() {
            return Err(Error::ExternalTool(format!(
                "{} exited with {}: {}",
                name,
                result.status,
                stderr.trim()
            )));
        }

        Ok(())
    }

    fn needs_output_check(&self, format: TargetFormat) -> bool {
        self.kind == ToolKind::Plistutil && format == TargetFormat::Json
    }

    fn binary_path(&self) -> Option<&Path> {
        Some(&self.binary_path)
    }

    fn name(&self) -> &'static str {
        self.kind.binary_name()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.into_string().unwrap())
            .collect()
    }

    #[test]
    fn host_platform_selects_tool() {
        assert_eq!(HostPlatform::from_os("macos"), HostPlatform::MacOs);
        assert_eq!(HostPlatform::from_os("linux"), HostPlatform::Other);
        assert_eq!(HostPlatform::from_os("windows"), HostPlatform::Other);

        assert_eq!(ToolKind::for_host(HostPlatform::MacOs), ToolKind::Plutil);
        assert_eq!(ToolKind::for_host(HostPlatform::Other), ToolKind::Plistutil);
        assert_eq!(HostPlatform::MacOs.as_str(), "macos");
    }

    #[test]
    fn parse_flags_from_legacy_help() {
        let help = "Usage: plistutil -i|--infile FILE [-o|--outfile FILE] [-f xml|bin]\n";
        assert_eq!(parse_format_flags(help), FormatFlags::Supported { json: false });

        let help = "  --format=xml   force XML output\n  --format=bin\n";
        assert_eq!(parse_format_flags(help), FormatFlags::Supported { json: false });
    }

    #[test]
    fn parse_flags_from_modern_help() {
        let help = "\
Usage: plistutil [OPTIONS] [-i FILE] [-o FILE]
  -f, --format FORMAT  Force output format, regardless of input type
                       FORMAT is one of xml, bin, json, or openstep
";
        assert_eq!(parse_format_flags(help), FormatFlags::Supported { json: true });
    }

    #[test]
    fn parse_flags_without_format_option() {
        let help = "Usage: plistutil -i|--infile in_file.plist -o|--outfile out_file.plist [--debug]";
        assert_eq!(parse_format_flags(help), FormatFlags::Unsupported);
        assert_eq!(parse_format_flags(""), FormatFlags::Unsupported);
    }

    #[test]
    fn plutil_args() {
        let input = Path::new("/tmp/payload.plist");
        let output = Path::new("/tmp/out.json");

        let json = build_args(
            ToolKind::Plutil,
            FormatFlags::Unsupported,
            input,
            output,
            TargetFormat::Json,
        );
        assert_eq!(
            strings(json),
            ["-convert", "json", "/tmp/payload.plist", "-o", "/tmp/out.json"]
        );

        let xml = build_args(
            ToolKind::Plutil,
            FormatFlags::Unsupported,
            input,
            output,
            TargetFormat::Xml,
        );
        assert_eq!(strings(xml)[1], "xml1");
    }

    #[test]
    fn plistutil_args_follow_probed_vocabulary() {
        let input = Path::new("in.plist");
        let output = Path::new("out");

        let none = build_args(
            ToolKind::Plistutil,
            FormatFlags::Unsupported,
            input,
            output,
            TargetFormat::Json,
        );
        assert_eq!(strings(none), ["-i", "in.plist", "-o", "out"]);

        let legacy_json = build_args(
            ToolKind::Plistutil,
            FormatFlags::Supported { json: false },
            input,
            output,
            TargetFormat::Json,
        );
        assert_eq!(strings(legacy_json), ["-i", "in.plist", "-o", "out", "-f", "bin"]);

        let legacy_xml = build_args(
            ToolKind::Plistutil,
            FormatFlags::Supported { json: false },
            input,
            output,
            TargetFormat::Xml,
        );
        assert_eq!(strings(legacy_xml)[5], "xml");

        let modern_json = build_args(
            ToolKind::Plistutil,
            FormatFlags::Supported { json: true },
            input,
            output,
            TargetFormat::Json,
        );
        assert_eq!(strings(modern_json)[5], "json");
    }

    #[test]
    fn discover_prefers_explicit_path() {
        let tools = ToolsConfig {
            plistutil_path: Some(PathBuf::from("/opt/libplist/bin/plistutil")),
            plutil_path: Some(PathBuf::from("/usr/bin/plutil")),
            ..ToolsConfig::default()
        };

        let linux = ExternalToolConverter::discover(&tools, HostPlatform::Other).unwrap();
        assert_eq!(linux.kind(), ToolKind::Plistutil);
        assert_eq!(linux.binary(), Path::new("/opt/libplist/bin/plistutil"));

        let mac = ExternalToolConverter::discover(&tools, HostPlatform::MacOs).unwrap();
        assert_eq!(mac.kind(), ToolKind::Plutil);
        assert_eq!(mac.binary(), Path::new("/usr/bin/plutil"));
    }

    #[test]
    fn discover_respects_disabled_tool_and_path_search() {
        let disabled = ToolsConfig {
            external_tool_enabled: false,
            plistutil_path: Some(PathBuf::from("/usr/bin/plistutil")),
            ..ToolsConfig::default()
        };
        assert!(ExternalToolConverter::discover(&disabled, HostPlatform::Other).is_none());

        let no_search = ToolsConfig {
            search_path: false,
            ..ToolsConfig::default()
        };
        assert!(ExternalToolConverter::discover(&no_search, HostPlatform::Other).is_none());
    }

    #[test]
    fn from_path_consistency_with_which_crate() {
        let which_result = which::which("plistutil");
        let from_path_result = ExternalToolConverter::from_path(HostPlatform::Other);

        assert_eq!(
            which_result.is_ok(),
            from_path_result.is_some(),
            "from_path() should return Some if and only if which::which() succeeds"
        );
    }

    #[test]
    fn only_plistutil_json_needs_output_check() {
        let plistutil = ExternalToolConverter::new(ToolKind::Plistutil, PathBuf::from("plistutil"));
        let plutil = ExternalToolConverter::new(ToolKind::Plutil, PathBuf::from("plutil"));

        assert!(plistutil.needs_output_check(TargetFormat::Json));
        assert!(!plistutil.needs_output_check(TargetFormat::Xml));
        assert!(!plutil.needs_output_check(TargetFormat::Json));
        assert_eq!(plistutil.name(), "plistutil");
        assert_eq!(plutil.binary_path(), Some(Path::new("plutil")));
    }

    #[tokio::test]
    async fn convert_with_invalid_binary_path_is_external_tool_error() {
        let tool = ExternalToolConverter::new(
            ToolKind::Plutil,
            PathBuf::from("/nonexistent/path/to/plutil"),
        );

        let result = tool
            .convert(Path::new("in.plist"), Path::new("out.json"), TargetFormat::Json)
            .await;

        match result {
            Err(Error::ExternalTool(msg)) => assert!(msg.contains("Failed to execute plutil")),
            other => panic!("Expected ExternalTool error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn probe_with_invalid_binary_path_is_unsupported() {
        let tool = ExternalToolConverter::new(
            ToolKind::Plistutil,
            PathBuf::from("/nonexistent/path/to/plistutil"),
        );
        assert_eq!(tool.probe_format_flags().await, FormatFlags::Unsupported);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_external_tool_error() {
        use crate::convert::test_support::fake_tools;

        let tool = ExternalToolConverter::new(ToolKind::Plistutil, fake_tools().failing.clone());
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.json");

        let err = tool
            .convert(Path::new("in.plist"), &output, TargetFormat::Json)
            .await
            .unwrap_err();

        match err {
            Error::ExternalTool(msg) => {
                assert!(msg.contains("plistutil exited with"));
                assert!(msg.contains("could not parse input"));
            }
            other => panic!("Expected ExternalTool error, got: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn probe_reads_fake_modern_help() {
        use crate::convert::test_support::fake_tools;

        let tool =
            ExternalToolConverter::new(ToolKind::Plistutil, fake_tools().xml_emitter.clone());
        assert_eq!(
            tool.probe_format_flags().await,
            FormatFlags::Supported { json: true }
        );
    }

    // Integration tests that require a real converter in PATH
    // Run with: cargo test --lib convert::tool -- --ignored

    #[tokio::test]
    #[ignore] // Requires plutil or plistutil in PATH
    async fn integration_test_real_tool_converts_binary_plist() {
        use crate::convert::test_support::demo_workflow;

        let tool = match ExternalToolConverter::from_path(HostPlatform::detect()) {
            Some(t) => t,
            None => {
                println!("Skipping test: no converter found in PATH");
                return;
            }
        };

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.plist");
        let output = dir.path().join("out.xml");
        std::fs::write(&input, demo_workflow()).unwrap();

        tool.convert(&input, &output, TargetFormat::Xml).await.unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.contains("WFWorkflowName"));
    }
}
