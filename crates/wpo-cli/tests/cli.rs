//! Tests for the `wpo` binary.

use pretty_assertions::assert_eq;
use std::io::Write;
use std::process::{Command, Output, Stdio};

fn wpo(args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_wpo"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    {
        let mut pipe = child.stdin.take().unwrap();
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes()).unwrap();
        }
    }
    child.wait_with_output().unwrap()
}

fn seeded_root() -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(root.path().join("js")).unwrap();
    std::fs::create_dir_all(root.path().join("style")).unwrap();
    std::fs::write(root.path().join("js/a.js"), "var a = 1; // a\n").unwrap();
    std::fs::write(root.path().join("js/b.js"), "var b = a;\n").unwrap();
    std::fs::write(root.path().join("style/a.css"), ".a {\n  color: red;\n}\n").unwrap();
    root
}

#[test]
fn test_minify_script_from_stdin() {
    let out = wpo(&["minify", "--kind", "js"], Some("var x = 1; /* c */ var y = 2;\n"));
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "var x =1;var y =2;");
}

#[test]
fn test_minify_style_file() {
    let root = seeded_root();
    let input = root.path().join("style/a.css");
    let out = wpo(&["minify", "-k", "css", input.to_str().unwrap()], None);
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), ".a{color:red}");
}

#[test]
fn test_unknown_kind_rejected() {
    let out = wpo(&["minify", "--kind", "html"], Some(""));
    assert!(!out.status.success());
    assert!(String::from_utf8(out.stderr).unwrap().contains("unknown resource kind"));
}

#[test]
fn test_merge_prints_artifact_path() {
    let root = seeded_root();
    let out = wpo(
        &[
            "merge",
            "--root",
            root.path().to_str().unwrap(),
            "--kind",
            "script",
            "/js/a.js",
            "/js/b.js",
        ],
        None,
    );
    assert!(out.status.success());

    let path = String::from_utf8(out.stdout).unwrap().trim().to_string();
    assert!(path.starts_with("/js/Opt_static_"));
    let artifact = std::fs::read_to_string(root.path().join(path.trim_start_matches('/'))).unwrap();
    assert_eq!(artifact, "var a =1;var b =a;");
}

#[test]
fn test_merge_json_report() {
    let root = seeded_root();
    let out = wpo(
        &[
            "merge",
            "--root",
            root.path().to_str().unwrap(),
            "--kind",
            "script",
            "--json",
            "/js/a.js",
            "/js/missing.js",
        ],
        None,
    );
    assert!(out.status.success());

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["artifact"]["merged"], serde_json::json!(["/js/a.js"]));
    assert_eq!(report["artifact"]["skipped"], serde_json::json!(["/js/missing.js"]));
    assert_eq!(report["steps"]["applied"], serde_json::json!(["minify"]));
}

#[test]
fn test_optimize_page() {
    let root = seeded_root();
    let page = root.path().join("index.html");
    std::fs::write(
        &page,
        r#"<link rel="stylesheet" href="/style/a.css">
<script src="/js/a.js"></script>
<script src="/js/b.js"></script>"#,
    )
    .unwrap();

    let out = wpo(
        &[
            "optimize",
            "--root",
            root.path().to_str().unwrap(),
            page.to_str().unwrap(),
        ],
        None,
    );
    assert!(out.status.success());

    let html = String::from_utf8(out.stdout).unwrap();
    assert!(html.contains(r#"<link type="text/css" rel="stylesheet" href="/style/Opt_static_"#));
    assert!(html.contains(r#"<script type="text/javascript" src="/js/Opt_static_"#));
    assert!(!html.contains("/js/a.js"));
}

#[test]
fn test_merge_with_missing_root_fails() {
    let out = wpo(
        &["merge", "--root", "/definitely/not/here", "--kind", "js", "/a.js"],
        None,
    );
    assert!(!out.status.success());
    assert!(String::from_utf8(out.stderr).unwrap().contains("not a directory"));
}
