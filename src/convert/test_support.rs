//! Shared fixtures for converter tests

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

/// Encode a value as a binary property list
pub(crate) fn binary_plist(value: plist::Value) -> Vec<u8> {
    let mut buf = Vec::new();
    value.to_writer_binary(&mut buf).unwrap();
    buf
}

/// Minimal shortcut payload: `{"WFWorkflowName": "Demo"}` as a binary plist
pub(crate) fn demo_workflow() -> Vec<u8> {
    let mut dict = plist::Dictionary::new();
    dict.insert("WFWorkflowName".to_string(), plist::Value::from("Demo"));
    binary_plist(plist::Value::Dictionary(dict))
}

#[cfg(unix)]
pub(crate) use fake::fake_tools;

#[cfg(unix)]
mod fake {
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::sync::OnceLock;
    use tempfile::TempDir;

    /// Shell scripts standing in for `plistutil`
    ///
    /// All scripts are written once, before any of them runs. Writing an
    /// executable while another test thread forks can make exec fail with
    /// ETXTBSY.
    pub(crate) struct FakeTools {
        _dir: TempDir,
        /// Writes a fixed JSON document
        pub json_emitter: PathBuf,
        /// Writes an XML plist no matter which format was asked for
        pub xml_emitter: PathBuf,
        /// Copies the binary input unchanged
        pub binary_copier: PathBuf,
        /// Exits 0 and leaves the output empty
        pub empty_emitter: PathBuf,
        /// Exits 1 with a message on stderr
        pub failing: PathBuf,
    }

    const HELP: &str = r#"if [ "$1" = "--help" ]; then
  echo "Usage: plistutil [OPTIONS] [-i FILE] [-o FILE]"
  echo "  -f, --format FORMAT  Force output format: xml, bin, json"
  exit 0
fi
in=""
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -i) in="$2"; shift 2 ;;
    -o) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
"#;

    const XML_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>WFWorkflowName</key>
	<string>Demo</string>
</dict>
</plist>
"#;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{HELP}{body}")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    /// Fake tools shared by every test in the process
    pub(crate) fn fake_tools() -> &'static FakeTools {
        static TOOLS: OnceLock<FakeTools> = OnceLock::new();
        TOOLS.get_or_init(|| {
            let dir = tempfile::tempdir().unwrap();
            let json_emitter = write_script(
                dir.path(),
                "json-emitter",
                "printf '{\\n  \"WFWorkflowName\": \"From Tool\"\\n}' > \"$out\"\n",
            );
            let xml_emitter = write_script(
                dir.path(),
                "xml-emitter",
                &format!("cat > \"$out\" <<'PLIST'\n{XML_DOC}PLIST\n"),
            );
            let binary_copier = write_script(dir.path(), "binary-copier", "cp \"$in\" \"$out\"\n");
            let empty_emitter = write_script(dir.path(), "empty-emitter", ": > \"$out\"\n");
            let failing = write_script(
                dir.path(),
                "failing",
                "echo \"could not parse input\" >&2\nexit 1\n",
            );

            FakeTools {
                _dir: dir,
                json_emitter,
                xml_emitter,
                binary_copier,
                empty_emitter,
                failing,
            }
        })
    }
}
