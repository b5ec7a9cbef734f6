use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn project_root() -> PathBuf {
    let crate_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    crate_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("crate dir has workspace root")
        .to_path_buf()
}

fn reefer(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_reefer"))
        .env("REEFER_CONFIG", config)
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run reefer")
}

fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("reefer.toml");
    fs::write(&path, body).unwrap();
    path
}

fn bundled_assets_config(dir: &Path, fragment: &Path) -> PathBuf {
    let root = project_root();
    write_config(
        dir,
        &format!(
            "image = {:?}\nvertex_shader = {:?}\nfragment_shader = {:?}\n",
            root.join("assets/images/coming-soon.png").display().to_string(),
            root.join("assets/scripts/reefer.vert").display().to_string(),
            fragment.display().to_string(),
        ),
    )
}

#[test]
fn layout_reports_desktop_canvas() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");

    let output = reefer(
        &config,
        &["layout", "--image-size", "800x400", "--viewport-width", "1200"],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Device:            desktop"), "{stdout}");
    assert!(stdout.contains("Canvas:            500x250"), "{stdout}");
    assert!(stdout.contains("uMouse:            0, 0"), "{stdout}");
}

#[test]
fn layout_reports_mobile_canvas_for_narrow_or_touch_viewports() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");

    let narrow = reefer(
        &config,
        &["layout", "--image-size", "800x400", "--viewport-width", "600"],
    );
    assert!(narrow.status.success());
    let stdout = String::from_utf8_lossy(&narrow.stdout);
    assert!(stdout.contains("Device:            mobile"), "{stdout}");
    assert!(stdout.contains("Canvas:            300x150"), "{stdout}");

    let touch = reefer(
        &config,
        &[
            "layout",
            "--image-size",
            "800x400",
            "--viewport-width",
            "1920",
            "--touch",
        ],
    );
    assert!(touch.status.success());
    let stdout = String::from_utf8_lossy(&touch.stdout);
    assert!(stdout.contains("Canvas:            300x150"), "{stdout}");
}

#[test]
fn layout_uses_configured_widths() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        dir.path(),
        "[layout]\ndesktop_width = 640\nviewport_width = 1400\n",
    );

    let output = reefer(&config, &["layout", "--image-size", "800x400"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Canvas:            640x320"), "{stdout}");
}

#[test]
fn config_where_reports_environment_override() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("missing.toml");

    let output = reefer(&config, &["config", "where"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&config.display().to_string()), "{stdout}");
    assert!(stdout.contains("$REEFER_CONFIG"), "{stdout}");
    assert!(stdout.contains("missing"), "{stdout}");
}

#[test]
fn named_config_must_exist() {
    let dir = TempDir::new().unwrap();
    let output = reefer(&dir.path().join("absent.toml"), &["config", "show"]);
    assert!(!output.status.success());
}

#[test]
fn check_accepts_bundled_program() {
    let dir = TempDir::new().unwrap();
    let fragment = project_root().join("assets/scripts/reefer.frag");
    let config = bundled_assets_config(dir.path(), &fragment);

    let output = reefer(&config, &["check"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "{stderr}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(800x400)"), "{stdout}");
    assert!(stdout.contains("Shader program compiled."), "{stdout}");
}

#[test]
fn check_rejects_unknown_uniform() {
    let dir = TempDir::new().unwrap();
    let fragment = dir.path().join("broken.frag");
    fs::write(
        &fragment,
        "precision mediump float;\nuniform float uBrightness;\nvoid main() { gl_FragColor = vec4(uBrightness); }\n",
    )
    .unwrap();
    let config = bundled_assets_config(dir.path(), &fragment);

    let output = reefer(&config, &["check"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("uBrightness"), "{stderr}");
}
