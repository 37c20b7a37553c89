use egui::Color32;

/// Parses `#rgb` or `#rrggbb`.
pub fn parse_hex_color(value: &str) -> Option<Color32> {
    let digits = value.trim().strip_prefix('#')?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match digits.len() {
        3 => {
            let mut parts = digits.chars().map(|c| channel(&format!("{c}{c}")));
            Some(Color32::from_rgb(parts.next()??, parts.next()??, parts.next()??))
        }
        6 => Some(Color32::from_rgb(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        )),
        _ => None,
    }
}

pub fn open_in_browser(url: &str) -> Result<(), String> {
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        match try_launch_new_tab(url) {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => {
                return open::that(url)
                    .map(|_| ())
                    .map_err(|e| format!("{err}; fallback failed: {e}"));
            }
            Err(_) => {}
        }
    }

    open::that(url).map(|_| ()).map_err(|err| err.to_string())
}

// Channel links open in a new tab of an already running browser when one of
// these is installed; otherwise the platform opener decides.
#[cfg(all(unix, not(target_os = "macos")))]
fn try_launch_new_tab(url: &str) -> std::io::Result<()> {
    use std::io::ErrorKind;
    use std::process::Command;

    const CANDIDATES: [&str; 4] = ["firefox", "google-chrome", "chromium", "brave-browser"];

    for cmd in CANDIDATES {
        match Command::new(cmd).arg("--new-tab").arg(url).spawn() {
            Ok(_) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => continue,
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        ErrorKind::NotFound,
        "no supported browser command found",
    ))
}
