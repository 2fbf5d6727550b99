//! The standard provisioning plan, assembled per platform from small step
//! builders. Building a plan runs nothing; every command is deferred to the
//! step closures.

use crate::config::{Config, SystemPackage};
use crate::error::{ProvisionError, Result};
use crate::interpreter;
use crate::manifest::Manifest;
use crate::package_manager::{classify_failure, PackageManager};
use crate::paths;
use crate::platform::Platform;
use crate::runner::{display_command, probe, CommandRunner};
use crate::step::ProvisioningStep;
use crate::version::InterpreterVersion;
use std::path::{Path, PathBuf};

pub const INTERPRETER_STEP: &str = "check python interpreter";
pub const VENV_STEP: &str = "create virtual environment";
pub const MANIFEST_STEP: &str = "write dependency manifest";
pub const INSTALL_STEP: &str = "install dependencies";
pub const SMOKE_TEST_STEP: &str = "smoke test imports";

#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    /// Leave OS-level packages alone (containers that ship them already).
    pub skip_system_packages: bool,
}

/// Everything a step closure needs. Cheap to copy into each closure.
#[derive(Clone, Copy)]
pub struct PlanContext<'a> {
    pub root: &'a Path,
    pub config: &'a Config,
    pub platform: Platform,
    pub runner: &'a dyn CommandRunner,
}

impl<'a> PlanContext<'a> {
    pub fn venv_dir(&self) -> PathBuf {
        self.config.venv_path(self.root)
    }

    pub fn venv_python(&self) -> PathBuf {
        paths::venv_python(&self.venv_dir(), self.platform)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.config.manifest_path(self.root)
    }

    fn manager(&self) -> Result<PackageManager> {
        PackageManager::for_platform(self.platform).ok_or_else(|| {
            ProvisionError::PlatformUnsupported {
                platform: self.platform.to_string(),
            }
        })
    }

    fn suitable_interpreter(&self, minimum: &InterpreterVersion) -> Option<interpreter::Interpreter> {
        interpreter::find_suitable(
            self.runner,
            self.config.python_candidates(self.platform),
            minimum,
        )
    }
}

/// Steps in execution order: system packages, interpreter, virtual
/// environment, manifest, dependency install, smoke test.
pub fn standard_plan<'a>(
    ctx: PlanContext<'a>,
    options: PlanOptions,
) -> Result<Vec<ProvisioningStep<'a>>> {
    let minimum = ctx.config.min_python_version()?;
    let mut steps = Vec::new();

    if options.skip_system_packages {
        tracing::info!("skipping system packages");
    } else {
        for pkg in ctx.config.system_packages_for(ctx.platform) {
            steps.push(system_package_step(ctx, pkg));
        }
    }

    steps.push(interpreter_step(ctx, minimum));
    steps.push(venv_step(ctx, minimum));
    steps.push(manifest_step(ctx));
    steps.push(install_step(ctx));
    steps.push(smoke_test_step(ctx));
    Ok(steps)
}

pub fn system_package_step<'a>(ctx: PlanContext<'a>, pkg: &'a SystemPackage) -> ProvisioningStep<'a> {
    let present = move || probe(ctx.runner, &pkg.tool, &pkg.version_arg).is_some();
    ProvisioningStep::new(format!("install system package {}", pkg.name), move || {
        ctx.manager()?.install(ctx.runner, &[pkg.name.as_str()])?;
        Ok(None)
    })
    .skip_if(move || Ok(present()))
    .verify(
        move || Ok(present()),
        move || ProvisionError::ToolNotFound {
            tool: pkg.tool.clone(),
        },
    )
}

pub fn interpreter_step(ctx: PlanContext<'_>, minimum: InterpreterVersion) -> ProvisioningStep<'_> {
    let too_old = move || {
        let found = interpreter::discover(ctx.runner, ctx.config.python_candidates(ctx.platform))
            .into_iter()
            .map(|i| i.version)
            .max();
        ProvisionError::InterpreterTooOld {
            found: found.map_or_else(|| "none".to_string(), |v| v.to_string()),
            required: minimum.to_string(),
        }
    };

    ProvisioningStep::new(INTERPRETER_STEP, move || {
        let found = interpreter::discover(ctx.runner, ctx.config.python_candidates(ctx.platform));
        if !found.is_empty() {
            // An interpreter exists but is too old. Replacing a system
            // interpreter is left to the user.
            return Err(too_old());
        }
        let packages: Vec<&str> = ctx
            .config
            .python_packages_for(ctx.platform)
            .iter()
            .map(String::as_str)
            .collect();
        ctx.manager()?.install(ctx.runner, &packages)?;
        Ok(None)
    })
    .skip_if(move || Ok(ctx.suitable_interpreter(&minimum).is_some()))
    .verify(move || Ok(ctx.suitable_interpreter(&minimum).is_some()), too_old)
}

pub fn venv_step(ctx: PlanContext<'_>, minimum: InterpreterVersion) -> ProvisioningStep<'_> {
    ProvisioningStep::new(VENV_STEP, move || {
        let python = ctx
            .suitable_interpreter(&minimum)
            .ok_or_else(|| ProvisionError::InterpreterTooOld {
                found: "none".to_string(),
                required: minimum.to_string(),
            })?;
        let venv = ctx.venv_dir();
        let venv_arg = venv.to_string_lossy();
        let args = ["-m", "venv", &*venv_arg];
        let command = display_command(&python.program, &args);
        match ctx.runner.run(&python.program, &args) {
            Ok(out) if out.success => Ok(Some(format!(
                "{} with {} {}",
                venv.display(),
                python.program,
                python.version
            ))),
            Ok(out) => Err(classify_failure(&command, &out)),
            Err(e) => Err(ProvisionError::NetworkOrPackageManagerFailure {
                command,
                detail: e.to_string(),
            }),
        }
    })
    .skip_if(move || Ok(venv_is_usable(ctx)))
    .verify(
        move || Ok(venv_is_usable(ctx)),
        move || ProvisionError::ToolNotFound {
            tool: ctx.venv_python().display().to_string(),
        },
    )
}

/// A venv counts only if its interpreter runs and has pip. A failed
/// `-m venv` (no ensurepip on Debian) leaves a bare interpreter behind.
fn venv_is_usable(ctx: PlanContext<'_>) -> bool {
    let python = ctx.venv_python();
    if !python.exists() {
        return false;
    }
    let python = python.to_string_lossy();
    probe(ctx.runner, &python, "--version").is_some()
        && ctx
            .runner
            .run(&python, &["-m", "pip", "--version"])
            .map(|out| out.success)
            .unwrap_or(false)
}

pub fn manifest_step(ctx: PlanContext<'_>) -> ProvisioningStep<'_> {
    ProvisioningStep::new(MANIFEST_STEP, move || {
        let path = ctx.manifest_path();
        Manifest::ensure(&path)?;
        let count = Manifest::load(&path)?.requirements.len();
        Ok(Some(format!("{count} pinned packages in {}", path.display())))
    })
    .skip_if(move || Ok(ctx.manifest_path().exists()))
    .verify(
        move || Ok(!Manifest::load(&ctx.manifest_path())?.is_empty()),
        move || {
            ProvisionError::ManifestInstallFailure(format!(
                "{} lists no dependencies",
                ctx.manifest_path().display()
            ))
        },
    )
}

/// Pins from the manifest that `pip freeze` in the venv does not report.
/// Before the venv or manifest exist every pin counts as missing.
fn missing_requirements(ctx: PlanContext<'_>) -> Result<Vec<String>> {
    let manifest_path = ctx.manifest_path();
    let python = ctx.venv_python();
    if !manifest_path.exists() {
        return Ok(vec![manifest_path.display().to_string()]);
    }
    let manifest = Manifest::load(&manifest_path)?;
    if !python.exists() {
        return Ok(manifest.requirements.iter().map(|r| r.to_string()).collect());
    }
    let python = python.to_string_lossy();
    let args = ["-m", "pip", "freeze"];
    let freeze = match ctx.runner.run(&python, &args) {
        Ok(out) if out.success => out.stdout,
        Ok(out) => {
            let last = out.text().lines().last().unwrap_or("").to_string();
            return Err(ProvisionError::ManifestInstallFailure(format!(
                "{} exited with {:?}: {last}",
                display_command(&python, &args),
                out.code
            )));
        }
        Err(e) => {
            return Err(ProvisionError::ManifestInstallFailure(format!(
                "could not run {}: {e}",
                display_command(&python, &args)
            )))
        }
    };
    Ok(manifest
        .missing_from(&freeze)
        .into_iter()
        .map(|r| r.to_string())
        .collect())
}

pub fn install_step(ctx: PlanContext<'_>) -> ProvisioningStep<'_> {
    ProvisioningStep::new(INSTALL_STEP, move || {
        let python = ctx.venv_python();
        let python = python.to_string_lossy();
        let manifest = ctx.manifest_path();
        let manifest_arg = manifest.to_string_lossy();
        let args = ["-m", "pip", "install", "-r", &*manifest_arg];
        match ctx.runner.run(&python, &args) {
            Ok(out) if out.success => Ok(Some(format!("installed from {}", manifest.display()))),
            Ok(out) => {
                let last = out.text().lines().last().unwrap_or("").to_string();
                Err(ProvisionError::ManifestInstallFailure(format!(
                    "pip exited with {:?}: {last}",
                    out.code
                )))
            }
            Err(e) => Err(ProvisionError::ManifestInstallFailure(format!(
                "could not run {}: {e}",
                display_command(&python, &args)
            ))),
        }
    })
    .skip_if(move || Ok(missing_requirements(ctx)?.is_empty()))
    .verify(
        move || Ok(missing_requirements(ctx)?.is_empty()),
        move || match missing_requirements(ctx) {
            Ok(missing) => ProvisionError::ManifestInstallFailure(format!(
                "not installed at the pinned version: {}",
                missing.join(", ")
            )),
            Err(e) => e,
        },
    )
}

/// Import every manifest entry in its own interpreter so a failure names
/// exactly one package. Always runs.
pub fn smoke_test_step(ctx: PlanContext<'_>) -> ProvisioningStep<'_> {
    ProvisioningStep::new(SMOKE_TEST_STEP, move || {
        let manifest = Manifest::load(&ctx.manifest_path())?;
        let python = ctx.venv_python();
        let python = python.to_string_lossy();
        let mut versions = Vec::with_capacity(manifest.requirements.len());
        for req in &manifest.requirements {
            let module = ctx.config.import_name(&req.name);
            let code = import_probe(&module);
            let failure = |detail: String| ProvisionError::ImportVerificationFailure {
                package: req.name.clone(),
                detail,
            };
            match ctx.runner.run(&python, &["-c", code.as_str()]) {
                Ok(out) if out.success => {
                    let version = out.stdout.trim().to_string();
                    tracing::info!(package = %req.name, module = %module, version = %version, "imported");
                    versions.push(format!("{module} {version}"));
                }
                Ok(out) => {
                    let last = out.text().lines().last().unwrap_or("").to_string();
                    return Err(failure(format!("import {module}: {last}")));
                }
                Err(e) => return Err(failure(format!("import {module}: {e}"))),
            }
        }
        Ok(Some(versions.join(", ")))
    })
}

pub fn import_probe(module: &str) -> String {
    format!("import {module}; print(getattr({module}, '__version__', 'unknown'))")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
