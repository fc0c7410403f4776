/*!
 * End-to-end tests for manifest generation
 */

use std::fs;
use std::io;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use tempfile::{tempdir, TempDir};

use crate::builder::ManifestBuilder;
use crate::config::ScanOptions;
use crate::watch::WatchLoop;

const NO_OPTIONS: &str = "\
export const MANIFEST = {
  helpers: 'src/helpers.ts',
  index: 'src/index.ts',
  types: 'src/types.ts',
  'helpers.test': 'src/helpers.test.ts',

  // #region cli
    'cli.cli': 'src/cli/cli.ts',
    'cli.constants': 'src/cli/constants.ts',
    'cli.fixtures': 'src/cli/fixtures.ts',
    'cli.index': 'src/cli/index.ts',
    'cli.cli.test': 'src/cli/cli.test.ts',
  // #endregion
};
";

const EXCLUDE_TESTS: &str = "\
export const MANIFEST = {
  helpers: 'src/helpers.ts',
  index: 'src/index.ts',
  types: 'src/types.ts',

  // #region cli
    'cli.cli': 'src/cli/cli.ts',
    'cli.constants': 'src/cli/constants.ts',
    'cli.fixtures': 'src/cli/fixtures.ts',
    'cli.index': 'src/cli/index.ts',
  // #endregion
};
";

// Helper function to create the project layout used by most tests
fn setup_project() -> io::Result<TempDir> {
    let temp_dir = tempdir()?;
    let src = temp_dir.path().join("src");
    fs::create_dir_all(src.join("cli"))?;

    for file in ["index.ts", "helpers.ts", "helpers.test.ts", "types.ts"] {
        fs::write(src.join(file), "export {};\n")?;
    }
    for file in ["cli.ts", "cli.test.ts", "constants.ts", "fixtures.ts", "index.ts"] {
        fs::write(src.join("cli").join(file), "export {};\n")?;
    }

    Ok(temp_dir)
}

fn options(root: &Path) -> ScanOptions {
    ScanOptions::new(root.join("src"), root)
}

fn with_tests(root: &Path) -> ScanOptions {
    ScanOptions {
        exclude_tests: false,
        ..options(root)
    }
}

fn build_and_read(options: ScanOptions) -> io::Result<String> {
    let manifest_path = options.manifest_path();
    ManifestBuilder::new(options).build()?;
    fs::read_to_string(manifest_path)
}

// Wait until `check` holds for the manifest content, or time out
fn wait_for(path: &Path, check: impl Fn(&str) -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if let Ok(content) = fs::read_to_string(path) {
            if check(&content) {
                return true;
            }
        }
        thread::sleep(Duration::from_millis(50));
    }
    false
}

#[test]
fn test_default_options_skip_test_files() -> io::Result<()> {
    let project = setup_project()?;
    let content = build_and_read(options(project.path()))?;
    assert_eq!(content, EXCLUDE_TESTS);
    Ok(())
}

#[test]
fn test_including_test_files() -> io::Result<()> {
    let project = setup_project()?;
    let content = build_and_read(with_tests(project.path()))?;
    assert_eq!(content, NO_OPTIONS);
    Ok(())
}

#[test]
fn test_generation_is_deterministic() -> io::Result<()> {
    let project = setup_project()?;
    let first = build_and_read(with_tests(project.path()))?;
    // The second run also sees the manifest written by the first one
    let second = build_and_read(with_tests(project.path()))?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_as_const() -> io::Result<()> {
    let project = setup_project()?;
    let content = build_and_read(ScanOptions {
        as_const: true,
        ..with_tests(project.path())
    })?;

    assert_eq!(content, NO_OPTIONS.replace("\n};\n", "\n} as const;\n"));
    Ok(())
}

#[test]
fn test_exclude_single_file() -> io::Result<()> {
    let project = setup_project()?;
    let content = build_and_read(ScanOptions {
        exclude_patterns: vec!["cli/cli.ts".to_string()],
        ..with_tests(project.path())
    })?;

    assert!(!content.contains("'cli.cli': 'src/cli/cli.ts'"));
    assert!(content.contains("'cli.cli.test': 'src/cli/cli.test.ts'"));
    assert!(content.contains("'cli.constants': 'src/cli/constants.ts'"));
    Ok(())
}

#[test]
fn test_exclude_pattern_is_a_substring_match() -> io::Result<()> {
    let project = setup_project()?;
    let content = build_and_read(ScanOptions {
        exclude_patterns: vec!["helpers".to_string()],
        ..options(project.path())
    })?;

    assert!(!content.contains("helpers"));
    assert!(content.contains("  index: 'src/index.ts',\n"));
    assert!(content.contains("  types: 'src/types.ts',\n"));
    Ok(())
}

#[test]
fn test_extra_extension_gets_a_marker() -> io::Result<()> {
    let project = setup_project()?;
    fs::write(project.path().join("src/globals.css"), "body {}\n")?;

    let content = build_and_read(with_tests(project.path()).with_extensions(&["css"])?)?;

    let expected = NO_OPTIONS.replace(
        "export const MANIFEST = {\n",
        "export const MANIFEST = {\n  'globals:css': 'src/globals.css',\n",
    );
    assert_eq!(content, expected);
    Ok(())
}

#[test]
fn test_nested_regions() -> io::Result<()> {
    let project = setup_project()?;
    let cli = project.path().join("src/cli");
    fs::create_dir_all(cli.join("bac"))?;
    fs::create_dir_all(cli.join("bac2"))?;
    fs::write(cli.join("bac/manifext.txt"), "")?;
    fs::write(cli.join("bac2/other.txt"), "")?;

    let content = build_and_read(with_tests(project.path()).with_extensions(&["txt"])?)?;

    let expected = NO_OPTIONS.replace(
        "    'cli.cli.test': 'src/cli/cli.test.ts',\n  // #endregion\n",
        "    'cli.cli.test': 'src/cli/cli.test.ts',

    // #region bac
      'cli.bac.manifext:txt': 'src/cli/bac/manifext.txt',
    // #endregion

    // #region bac2
      'cli.bac2.other:txt': 'src/cli/bac2/other.txt',
    // #endregion
  // #endregion
",
    );
    assert_eq!(content, expected);
    Ok(())
}

#[test]
fn test_nested_base_dir() -> io::Result<()> {
    let project = setup_project()?;
    let base = project.path().join("src/cli");
    let content = build_and_read(ScanOptions {
        exclude_tests: false,
        ..ScanOptions::new(&base, project.path())
    })?;

    let expected = "\
export const MANIFEST = {
  cli: 'src/cli/cli.ts',
  constants: 'src/cli/constants.ts',
  fixtures: 'src/cli/fixtures.ts',
  index: 'src/cli/index.ts',
  'cli.test': 'src/cli/cli.test.ts',
};
";
    assert_eq!(content, expected);
    assert!(base.join(".manifest.ts").exists());
    Ok(())
}

#[test]
fn test_rebuild_is_a_full_rewrite() -> io::Result<()> {
    let project = setup_project()?;
    let first = build_and_read(options(project.path()))?;
    assert!(first.contains("types"));

    fs::remove_file(project.path().join("src/types.ts"))?;
    let second = build_and_read(options(project.path()))?;
    assert!(!second.contains("types"));
    assert!(second.len() < first.len());
    Ok(())
}

#[test]
fn test_watch_mode_follows_changes() -> io::Result<()> {
    let project = setup_project()?;
    let options = options(project.path());
    let manifest = options.manifest_path();
    let src = options.base_dir.clone();

    let session = WatchLoop::new(options)
        .with_timing(Duration::from_millis(100), Duration::from_millis(20))
        .start()?;
    let shutdown = session.shutdown_handle();
    let runner = thread::spawn(move || session.run());

    // The initial build happens before start returns
    assert!(manifest.exists());

    fs::write(src.join("test-helper-file.ts"), "export const foo = 1;\n")?;
    assert!(wait_for(&manifest, |c| c.contains("'src/test-helper-file.ts'")));

    fs::write(src.join("test-helper-file2.ts"), "export const bar = 2;\n")?;
    assert!(wait_for(&manifest, |c| c.contains("'src/test-helper-file2.ts'")));

    fs::remove_file(src.join("test-helper-file2.ts"))?;
    assert!(wait_for(&manifest, |c| {
        c.contains("'src/test-helper-file.ts'") && !c.contains("test-helper-file2")
    }));

    shutdown.shutdown();
    let summary = runner.join().expect("watch thread panicked");
    assert!(summary.rebuilds >= 3);
    assert_eq!(summary.failures, 0);
    Ok(())
}
