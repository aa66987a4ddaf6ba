//! Windows service install scripts.
//!
//! The service control helper (`isrv.exe`) reads its arguments from a
//! response file; `install.bat` and `uninstall.bat` wrap it.

use crate::builder::toolchain::SERVICE_HELPER;
use crate::core::app::{ServiceStartType, WindowsService};

/// Line ending of every generated script.
pub const SCRIPT_LINE_ENDING: &str = "\r\n";

/// Generates the service helper arguments and scripts for one service.
#[derive(Debug)]
pub struct ServiceScripts<'a> {
    service: &'a WindowsService,

    /// File name of the service executable
    exe_name: String,
}

impl<'a> ServiceScripts<'a> {
    pub fn new(service: &'a WindowsService, exe_name: impl Into<String>) -> Self {
        ServiceScripts {
            service,
            exe_name: exe_name.into(),
        }
    }

    /// Arguments for the helper's `-install` mode, one per line.
    pub fn isrv_args(&self) -> Vec<String> {
        let service = self.service;
        let mut lines = vec![
            format!("-install {}", self.exe_name),
            format!(
                "-displayname {}",
                quoted(service.display_name.as_deref().unwrap_or(&service.name))
            ),
        ];
        if let Some(description) = &service.description {
            lines.push(format!("-description {}", quoted(description)));
        }

        lines.push(
            match service.start_type {
                ServiceStartType::Automatic => "-auto",
                ServiceStartType::Manual => "-manual",
                ServiceStartType::Disabled => "-disabled",
            }
            .to_string(),
        );

        for dependency in &service.dependencies {
            lines.push(format!("-dependence {}", quoted(dependency)));
        }

        if !service.arguments.is_empty() {
            lines.push("-args".to_string());
            lines.extend(service.arguments.iter().cloned());
        }
        lines
    }

    /// `install.bat`, installing the service from `rsp_file`.
    pub fn install_bat(&self, rsp_file: &str) -> Vec<String> {
        let name = &self.service.name;
        let mut lines = vec![
            "@echo off".to_string(),
            "pushd \"%~dp0\"".to_string(),
            format!("{} -r {}", SERVICE_HELPER, rsp_file),
            "if errorlevel 1 goto failed".to_string(),
        ];
        if self.service.start_after_install {
            lines.push(format!("net start {}", quoted(name)));
        }
        lines.extend([
            "popd".to_string(),
            "exit /b 0".to_string(),
            ":failed".to_string(),
            "popd".to_string(),
            format!("echo Failed to install the {} service", name),
            "exit /b 1".to_string(),
        ]);
        lines
    }

    /// `uninstall.bat`.
    pub fn uninstall_bat(&self) -> Vec<String> {
        vec![
            "@echo off".to_string(),
            "pushd \"%~dp0\"".to_string(),
            format!("{} -u {}", SERVICE_HELPER, quoted(&self.service.name)),
            "popd".to_string(),
        ]
    }
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value)
}
