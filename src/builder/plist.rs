//! `Info.plist` for macOS application bundles.

/// Metadata written into `Contents/Info.plist`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleInfo {
    /// `CFBundleExecutable`, the executable relative to `Contents/MacOS`
    pub executable: String,
    pub name: String,
    pub identifier: String,
    pub version: String,
    pub short_version: String,
    /// Icon file name in `Contents/Resources`
    pub icon_file: Option<String>,
    pub high_resolution_capable: bool,
}

impl BundleInfo {
    /// Render the property list.
    pub fn to_plist(&self) -> String {
        let mut out = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <!DOCTYPE plist PUBLIC \"-//Apple Computer//DTD PLIST 1.0//EN\" \
             \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n\
             <plist version=\"1.0\">\n\
             <dict>\n",
        );

        let mut entry = |key: &str, value: &str| {
            out.push_str(&format!(
                "  <key>{}</key>\n  <string>{}</string>\n",
                key,
                escape_xml(value)
            ));
        };
        entry("CFBundlePackageType", "APPL");
        entry("CFBundleExecutable", &self.executable);
        entry("CFBundleName", &self.name);
        entry("CFBundleIdentifier", &self.identifier);
        entry("CFBundleVersionString", &self.version);
        entry("CFBundleShortVersionString", &self.short_version);
        if let Some(icon) = &self.icon_file {
            entry("CFBundleIconFile", icon);
        }

        if self.high_resolution_capable {
            out.push_str("  <key>NSHighResolutionCapable</key>\n  <true/>\n");
        }
        out.push_str("</dict>\n</plist>\n");
        out
    }
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
