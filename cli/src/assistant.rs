use tracing::warn;

use pantry_core::service::TextGenerator;

/// Ask the generator about `message`. Failures are logged and swallowed so the
/// matched recipes still reach the caller.
pub async fn enrich(generator: Option<&dyn TextGenerator>, message: &str) -> Option<String> {
    let generator = generator?;
    match generator.generate(message).await {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => None,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "text generation failed");
            None
        }
    }
}
