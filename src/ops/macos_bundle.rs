//! macOS application bundle packaging, with optional signing and an
//! installer package.

use std::path::{Path, PathBuf};

use crate::builder::context::BuildContext;
use crate::builder::invoker::CommandSpec;
use crate::builder::plist::BundleInfo;
use crate::core::errors::{BuildError, BuildResult};
use crate::core::manifest::MacosBundleSettings;
use crate::ops::package::{Artifact, ArtifactKind};
use crate::util::fs::{clean_directory, copy_file, ensure_dir, write_string};

/// Lay out `<output>/<file-name>.app`, pack the image into it, then sign it
/// and build a `.pkg` when identities are configured.
pub fn create_app_bundle(ctx: &BuildContext<'_>) -> BuildResult<Artifact> {
    let project = ctx.project;
    let settings = project.macos_bundle().ok_or_else(|| {
        BuildError::validation("macOS application bundle packaging needs bundle metadata")
    })?;

    let file_name = settings.file_name.as_deref().unwrap_or(project.name());
    let bundle_dir = project.output_dir().join(format!("{}.app", file_name));
    let contents = bundle_dir.join("Contents");
    let macos_dir = contents.join("MacOS");
    let resources_dir = contents.join("Resources");

    clean_directory(&bundle_dir)?;
    ensure_dir(&macos_dir)?;
    ensure_dir(&resources_dir)?;

    let info = bundle_info(ctx, settings);
    write_string(&contents.join("Info.plist"), &info.to_plist())?;

    let generator = ctx.packager_args();
    let set = generator.option_set(generator.common_options(&macos_dir), ".OSXBundle");
    ctx.pack(set, &[])?;

    if let (Some(icon), Some(icon_file)) = (&settings.icon, &info.icon_file) {
        copy_file(&project.root().join(icon), &resources_dir.join(icon_file))?;
    }

    let pkg = sign_and_build_installer(ctx, settings, &bundle_dir)?;

    ctx.reporter.info("build.success", &[]);
    match pkg {
        Some(pkg) => {
            ctx.reporter.info("build.get-pkg", &[&pkg.display()]);
            Ok(Artifact::new(ArtifactKind::InstallerPackage, pkg))
        }
        None => {
            ctx.reporter
                .info("build.get-bundle", &[&bundle_dir.display()]);
            Ok(Artifact::new(ArtifactKind::AppBundle, bundle_dir))
        }
    }
}

fn bundle_info(ctx: &BuildContext<'_>, settings: &MacosBundleSettings) -> BundleInfo {
    let project = ctx.project;
    let version = settings
        .version
        .clone()
        .unwrap_or_else(|| project.version().to_string());
    BundleInfo {
        executable: project
            .executable_path(ctx.toolchain.target_os())
            .to_string_lossy()
            .into_owned(),
        name: settings
            .bundle_name
            .clone()
            .unwrap_or_else(|| project.name().to_string()),
        identifier: settings.identifier.clone(),
        short_version: settings.short_version.clone().unwrap_or_else(|| version.clone()),
        version,
        icon_file: settings
            .icon
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned()),
        high_resolution_capable: settings.high_resolution_capable,
    }
}

/// Sign the bundle and wrap it into `<output>/<artifact-name>.pkg`.
///
/// Returns the package path when one was built. A missing identity is a
/// warning, a failing tool is a packaging error.
fn sign_and_build_installer(
    ctx: &BuildContext<'_>,
    settings: &MacosBundleSettings,
    bundle_dir: &Path,
) -> BuildResult<Option<PathBuf>> {
    let project = ctx.project;
    let output_dir = project.output_dir();

    let Some(developer_id) = &settings.developer_id else {
        ctx.reporter.warn("macos.no-developer-id", &[]);
        return Ok(None);
    };

    ctx.reporter.info("macos.signing", &[]);
    let codesign = CommandSpec::new("codesign")
        .args(["--verbose", "--force", "--deep", "--sign"])
        .arg(developer_id)
        .arg(bundle_dir.to_string_lossy());
    ctx.run_checked(&codesign, &output_dir, "macos.codesign.failure")?;

    let Some(publisher_id) = &settings.publisher_id else {
        ctx.reporter.warn("macos.no-publisher-id", &[]);
        return Ok(None);
    };

    ctx.reporter.info("macos.creating-installer", &[]);
    let pkg = output_dir.join(format!("{}.pkg", project.artifact_name()));
    let productbuild = CommandSpec::new("productbuild")
        .arg("--sign")
        .arg(publisher_id)
        .arg("--component")
        .arg(bundle_dir.to_string_lossy())
        .arg(&settings.install_path)
        .arg(pkg.to_string_lossy());
    ctx.run_checked(&productbuild, &output_dir, "macos.productbuild.failure")?;

    Ok(Some(pkg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app::TargetOs;
    use crate::test_support::{fake_packager, plain_project, toolchain, CommandPattern, MockInvoker};
    use crate::util::messages::{Level, MemoryLog, Messages, Reporter};
    use tempfile::TempDir;

    fn bundle_section(extra: &str) -> String {
        format!(
            r#"
[packaging]
kind = "macos-app-bundle"

[macos-bundle]
identifier = "com.example.hello"
{}
"#,
            extra
        )
    }

    fn run(
        tmp: &TempDir,
        extra: &str,
        invoker: &MockInvoker,
        log: &MemoryLog,
    ) -> BuildResult<Artifact> {
        let project = plain_project(tmp.path(), &bundle_section(extra));
        let tc = toolchain(12, 0, TargetOs::Macos);
        let reporter = Reporter::new(Messages::default(), log);
        let ctx = BuildContext::new(&project, &tc, invoker, &reporter);
        create_app_bundle(&ctx)
    }

    fn packaging_invoker() -> MockInvoker {
        let mut invoker = MockInvoker::new();
        invoker.expect_pattern(fake_packager());
        invoker
    }

    #[test]
    fn test_unsigned_bundle() {
        let tmp = TempDir::new().unwrap();
        let invoker = packaging_invoker();
        let log = MemoryLog::new();

        let artifact = run(&tmp, "", &invoker, &log).unwrap();

        let bundle = tmp.path().join("target/aot/hello.app");
        assert_eq!(artifact, Artifact::new(ArtifactKind::AppBundle, &bundle));
        assert!(bundle.join("Contents/Info.plist").is_file());
        assert!(bundle.join("Contents/Resources").is_dir());
        assert!(bundle.join("Contents/MacOS/hello").is_file());
        assert!(log.contains(Level::Warn, "No developer identity"));
        assert!(invoker.calls_to("codesign").is_empty());
    }

    #[test]
    fn test_signed_without_publisher() {
        let tmp = TempDir::new().unwrap();
        let invoker = packaging_invoker();
        let log = MemoryLog::new();

        let artifact = run(&tmp, "developer-id = \"Dev ID\"", &invoker, &log).unwrap();

        assert_eq!(artifact.kind, ArtifactKind::AppBundle);
        let codesign = invoker.calls_to("codesign");
        assert_eq!(codesign.len(), 1);
        assert_eq!(
            &codesign[0].args[..5],
            &["--verbose", "--force", "--deep", "--sign", "Dev ID"]
        );
        assert!(log.contains(Level::Warn, "No publisher identity"));
        assert!(invoker.calls_to("productbuild").is_empty());
    }

    #[test]
    fn test_signed_with_installer_package() {
        let tmp = TempDir::new().unwrap();
        let invoker = packaging_invoker();
        let log = MemoryLog::new();

        let artifact = run(
            &tmp,
            "developer-id = \"Dev ID\"\npublisher-id = \"Pub ID\"",
            &invoker,
            &log,
        )
        .unwrap();

        let pkg = tmp.path().join("target/aot/hello.pkg");
        assert_eq!(artifact, Artifact::new(ArtifactKind::InstallerPackage, &pkg));
        let productbuild = invoker.calls_to("productbuild");
        assert_eq!(productbuild.len(), 1);
        assert_eq!(productbuild[0].args[..2], ["--sign", "Pub ID"]);
        assert!(productbuild[0].args.contains(&"/Applications".to_string()));
        assert_eq!(productbuild[0].args.last(), Some(&pkg.to_string_lossy().into_owned()));
        assert!(log.at(Level::Warn).is_empty());
    }

    #[test]
    fn test_codesign_failure_stops_packaging() {
        let tmp = TempDir::new().unwrap();
        let mut invoker = packaging_invoker();
        invoker.expect(CommandPattern::StartsWith("codesign".into()), 1);
        let log = MemoryLog::new();

        let err = run(
            &tmp,
            "developer-id = \"Dev ID\"\npublisher-id = \"Pub ID\"",
            &invoker,
            &log,
        )
        .unwrap_err();

        assert!(matches!(err, BuildError::Packaging { .. }));
        assert!(err.to_string().contains("sign"));
        assert!(invoker.calls_to("productbuild").is_empty());
    }

    #[test]
    fn test_icon_is_copied_into_resources() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("hello.icns"), "icon").unwrap();
        let invoker = packaging_invoker();
        let log = MemoryLog::new();

        run(&tmp, "icon = \"hello.icns\"", &invoker, &log).unwrap();

        let contents = tmp.path().join("target/aot/hello.app/Contents");
        assert!(contents.join("Resources/hello.icns").is_file());
        let plist = std::fs::read_to_string(contents.join("Info.plist")).unwrap();
        assert!(plist.contains("hello.icns"));
    }
}
