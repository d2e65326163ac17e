use std::path::{Path, PathBuf};

use crate::foundation::error::{RetypeError, RetypeResult};

/// Environment variable naming a font file, consulted before the well-known locations.
pub const FONT_ENV_VAR: &str = "RETYPE_FONT";

/// Monospace fonts commonly installed on Linux, macOS and Windows.
pub const KNOWN_MONOSPACE_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu-sans-mono-fonts/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/liberation2/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
    "/usr/share/fonts/TTF/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/ubuntu/UbuntuMono-R.ttf",
    "/usr/share/fonts/noto/NotoSansMono-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSansMono-Regular.ttf",
    "/System/Library/Fonts/Menlo.ttc",
    "/System/Library/Fonts/Monaco.ttf",
    "/Library/Fonts/Courier New.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
    "C:\\Windows\\Fonts\\cour.ttf",
];

/// First existing font among `$RETYPE_FONT` and [`KNOWN_MONOSPACE_FONTS`].
pub fn discover_font() -> Option<PathBuf> {
    std::env::var_os(FONT_ENV_VAR)
        .map(PathBuf::from)
        .into_iter()
        .chain(KNOWN_MONOSPACE_FONTS.iter().map(PathBuf::from))
        .find(|p| p.is_file())
}

/// DejaVu Sans Mono, used when no font is given or found on the system.
pub const EMBEDDED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansMono.ttf");

/// Read font bytes from `path`, else from [`discover_font`], else [`EMBEDDED_FONT`].
///
/// The returned path is `None` when the embedded font is used.
pub fn load_font(path: Option<&Path>) -> RetypeResult<(Option<PathBuf>, Vec<u8>)> {
    let Some(path) = path.map(Path::to_path_buf).or_else(discover_font) else {
        tracing::debug!("no system monospace font found, using the embedded one");
        return Ok((None, EMBEDDED_FONT.to_vec()));
    };
    let bytes = std::fs::read(&path).map_err(|e| {
        RetypeError::config(format!("failed to read font '{}': {e}", path.display()))
    })?;
    if bytes.is_empty() {
        return Err(RetypeError::config(format!(
            "font file '{}' is empty",
            path.display()
        )));
    }
    Ok((Some(path), bytes))
}

#[cfg(test)]
#[path = "../../tests/unit/render/font.rs"]
mod tests;
