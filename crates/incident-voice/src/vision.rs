//! Image analysis capability. Not used by the interview itself; exposed so intake front ends can
//! attach a description of an uploaded photo through the same injected-engine seam.

use crate::error::{VoiceError, VoiceResult};
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_SIMULATED_ANALYSIS: &str = "Image shows server error screen with HTTP 500 internal server error. Database connection appears to be failing based on the error message displayed on monitor.";

#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Describe the contents of an encoded image.
    async fn analyze_image(&self, image: &[u8]) -> VoiceResult<String>;
}

/// Timed vision simulation returning a canned description.
#[derive(Debug, Clone)]
pub struct SimulatedVision {
    pub analysis_delay: Duration,
    pub analysis: String,
}

impl Default for SimulatedVision {
    fn default() -> Self {
        Self {
            analysis_delay: Duration::from_millis(2000),
            analysis: DEFAULT_SIMULATED_ANALYSIS.to_string(),
        }
    }
}

#[async_trait]
impl VisionBackend for SimulatedVision {
    async fn analyze_image(&self, image: &[u8]) -> VoiceResult<String> {
        if image.is_empty() {
            return Err(VoiceError::Vision("empty image".to_string()));
        }
        tokio::time::sleep(self.analysis_delay).await;
        Ok(self.analysis.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn analysis_is_canned_text() {
        let vision = SimulatedVision::default();
        let text = vision.analyze_image(&[0x89, b'P', b'N', b'G']).await.unwrap();
        assert!(text.contains("HTTP 500"));
    }

    #[tokio::test]
    async fn empty_image_is_rejected() {
        let vision = SimulatedVision::default();
        assert!(matches!(
            vision.analyze_image(&[]).await,
            Err(VoiceError::Vision(_))
        ));
    }
}
