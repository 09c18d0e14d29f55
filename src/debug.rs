use std::path::Path;

use crate::drawing::*;

use super::*;

/// Renders the scene and saves the result to the specified path.
///
/// The image format follows the file extension.
///
/// # Errors
/// Returns [`CollageError`] if the canvas is empty or saving fails.
pub fn save_scene_preview(
    scene: &Scene,
    output_path: impl AsRef<Path>,
    config: &PreviewConfig,
) -> Result<(), CollageError> {
    let output_path = output_path.as_ref();
    let preview = render_scene(scene, config)?;
    tracing::debug!(
        "Saving {}x{} preview to {}",
        preview.width(),
        preview.height(),
        output_path.display()
    );
    preview
        .save(output_path)
        .map_err(|e| CollageError::ImageConversionError(e.to_string()))
}
