use crate::Result;
use image::RgbaImage;
use std::path::Path;

/// Converts premultiplied-alpha pixels back to straight alpha.
///
/// Fully transparent pixels are left alone; alpha itself never changes.
pub fn unpremultiply_rgba(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            continue;
        }
        let alpha = f64::from(a) / 255.0;
        let straight = |c: u8| (f64::from(c) / alpha).min(255.0).floor() as u8;
        pixel.0 = [straight(r), straight(g), straight(b), a];
    }
}

/// Reads an image, un-premultiplies it and writes it to `output` (format from the extension).
pub fn unpremultiply_file(input: &Path, output: &Path) -> Result<()> {
    let mut image = image::open(input)?.into_rgba8();
    unpremultiply_rgba(&mut image);
    image.save(output)?;
    log::info!(
        "un-premultiplied {}x{} image '{}' -> '{}'",
        image.width(),
        image.height(),
        input.display(),
        output.display()
    );
    Ok(())
}
