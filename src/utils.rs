//! Utility functions

use crate::constants::APP_NAME;
use std::path::PathBuf;

/// Get the app data directory path (settings, logs)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Format bytes into human-readable string (B, KB, MB)
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Turn catalog text into one file name: path separators, `..`, characters
/// Windows rejects and control characters become `_`
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.replace("..", "_");
    let cleaned = cleaned.trim_matches(|c| c == ' ' || c == '.');
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Decode encoded image bytes (jpeg/png/webp) into an egui image, shrinking it
/// to fit `max_side` when given
pub fn decode_image(bytes: &[u8], max_side: Option<u32>) -> Option<egui::ColorImage> {
    let mut img = image::load_from_memory(bytes).ok()?;
    if let Some(max) = max_side {
        if img.width() > max || img.height() > max {
            img = img.thumbnail(max, max);
        }
    }
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Some(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_are_human_readable() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024 + 512 * 1024), "3.5 MB");
    }

    #[test]
    fn file_names_lose_path_syntax() {
        assert_eq!(sanitize_file_name("Chery_CS35/EV_All.zip"), "Chery_CS35_EV_All.zip");
        assert_eq!(sanitize_file_name("Chery_x/../../escaped_All.zip"), "Chery_x_____escaped_All.zip");
        assert_eq!(sanitize_file_name("a\\b:c*d?\"e<f>g|h\ti.zip"), "a_b_c_d__e_f_g_h_i.zip");
        assert_eq!(sanitize_file_name("BYD_Atto 3_All.zip"), "BYD_Atto 3_All.zip");
        assert_eq!(sanitize_file_name(".."), "_");
        assert_eq!(sanitize_file_name(" . "), "_");
    }

    #[test]
    fn decodes_png_and_rejects_garbage() {
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 255]));
        let mut png = std::io::Cursor::new(Vec::new());
        img.write_to(&mut png, image::ImageFormat::Png).unwrap();

        let decoded = decode_image(png.get_ref(), None).unwrap();
        assert_eq!(decoded.size, [3, 2]);
        assert!(decode_image(b"not an image", None).is_none());
    }

    #[test]
    fn large_images_are_shrunk_keeping_aspect() {
        let img = image::RgbaImage::from_pixel(400, 200, image::Rgba([0, 0, 255, 255]));
        let mut png = std::io::Cursor::new(Vec::new());
        img.write_to(&mut png, image::ImageFormat::Png).unwrap();

        let decoded = decode_image(png.get_ref(), Some(100)).unwrap();
        assert_eq!(decoded.size, [100, 50]);
    }
}
